//! Content module - posts projected from CMS documents and the metadata
//! derived from them

mod edit;
mod post;
mod reading;
mod richtext;

pub use edit::{EditDetector, EditNotice};
pub use post::{parse_timestamp, post_path, Banner, ContentSection, Post, PostData, RichTextFragment};
pub use reading::{ReadingMetrics, WORDS_PER_MINUTE};
pub use richtext::render_rich_text;

#[cfg(test)]
pub(crate) use post::tests::raw_post;
