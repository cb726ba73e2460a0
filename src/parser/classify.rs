use crate::comment::{BotIdentity, RawComment};

/// Logins under which CodeRabbit posts. GraphQL reports app authors by their
/// bare handle, REST appends `[bot]`; both are the same identity.
pub const CODERABBIT_LOGINS: [&str; 2] = ["coderabbitai", "coderabbitai[bot]"];

/// Attribute a comment to a known review bot by exact author login.
/// A missing author never classifies.
pub fn classify(comment: &RawComment) -> Option<BotIdentity> {
    let author = comment.author.as_deref()?;
    CODERABBIT_LOGINS
        .contains(&author)
        .then_some(BotIdentity::CodeRabbit)
}

pub fn is_coderabbit(comment: &RawComment) -> bool {
    classify(comment).is_some()
}
