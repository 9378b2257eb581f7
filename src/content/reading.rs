//! Word count and reading-time estimate

use serde::Serialize;

use super::Post;

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingMetrics {
    pub word_count: usize,
    pub minutes: usize,
}

impl ReadingMetrics {
    /// Count the words of every heading and body fragment of a post
    pub fn estimate(post: &Post) -> Self {
        let word_count = post
            .data
            .content
            .iter()
            .map(|section| {
                count_words(&section.heading)
                    + section
                        .body
                        .iter()
                        .map(|fragment| count_words(fragment.text()))
                        .sum::<usize>()
            })
            .sum();

        Self::from_word_count(word_count)
    }

    pub fn from_word_count(word_count: usize) -> Self {
        Self {
            word_count,
            minutes: word_count.div_ceil(WORDS_PER_MINUTE),
        }
    }
}

/// Whitespace-delimited, non-empty tokens
fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
