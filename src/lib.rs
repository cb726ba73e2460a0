//! Turn CodeRabbit pull request review comments into structured records.
//!
//! Raw comments come from a [`source::CommentSource`]. [`parse_one`] and
//! [`parse_many`] attribute each one to the review bot and extract the
//! fields of its Markdown body. [`filter_actionable`] then keeps the ones
//! an automated agent can act on, and [`fix::apply_fix`] writes a comment's
//! suggested code back into a working tree.

pub mod comment;
pub mod config;
pub mod filter;
pub mod fix;
pub mod github;
pub mod parser;
pub mod report;
pub mod source;
pub mod store;

pub use comment::{BotIdentity, Comment, ParsedComment, RawComment};
pub use filter::{actionable, filter_actionable, ThreadFilter};
pub use parser::{parse_batch, parse_many, parse_one, try_parse_one, BatchOutcome, ParseError};
