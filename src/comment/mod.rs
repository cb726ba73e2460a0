pub mod types;

pub use types::{BotIdentity, Comment, ParsedComment, RawComment};
