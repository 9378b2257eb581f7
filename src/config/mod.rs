//! Configuration module

mod site;

pub use site::CommentsConfig;
pub use site::EditNoticeConfig;
pub use site::ListingConfig;
pub use site::NavigationConfig;
pub use site::NextOrdering;
pub use site::PrebuildConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::SourceConfig;
pub use site::SourceKind;
pub use site::ACCESS_TOKEN_ENV;
