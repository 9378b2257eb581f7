//! Helper functions shared by the templates and the page builders

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
