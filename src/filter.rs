use serde::Deserialize;

use crate::comment::{Comment, ParsedComment, RawComment};

/// Keep only parsed comments that carry a prompt or a suggestion.
/// Order is preserved; raw comments are always dropped.
pub fn filter_actionable(items: Vec<Comment>) -> Vec<ParsedComment> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Comment::Parsed(parsed) if parsed.is_actionable() => Some(parsed),
            _ => None,
        })
        .collect()
}

/// Borrowing form of [`filter_actionable`].
pub fn actionable(items: &[Comment]) -> Vec<&ParsedComment> {
    items
        .iter()
        .filter_map(Comment::as_parsed)
        .filter(|parsed| parsed.is_actionable())
        .collect()
}

/// Which settled review threads to keep. Everything is excluded by default;
/// a missing flag counts as unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ThreadFilter {
    #[serde(default)]
    pub include_resolved: bool,
    #[serde(default)]
    pub include_outdated: bool,
    #[serde(default)]
    pub include_minimized: bool,
}

impl ThreadFilter {
    /// A filter that keeps every thread.
    pub fn all() -> Self {
        Self {
            include_resolved: true,
            include_outdated: true,
            include_minimized: true,
        }
    }

    pub fn keeps(&self, comment: &RawComment) -> bool {
        let set = |flag: Option<bool>| flag.unwrap_or(false);
        (self.include_resolved || !set(comment.is_resolved))
            && (self.include_outdated || !set(comment.is_outdated))
            && (self.include_minimized || !set(comment.is_minimized))
    }

    pub fn apply(&self, items: Vec<Comment>) -> Vec<Comment> {
        items.into_iter().filter(|c| self.keeps(c.raw())).collect()
    }
}
