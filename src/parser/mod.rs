pub mod classify;
pub mod extract;

pub use classify::{classify, is_coderabbit, CODERABBIT_LOGINS};
pub use extract::{extract_fields, ExtractedFields};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::comment::{BotIdentity, Comment, ParsedComment, RawComment};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("comment {id} has no body to parse")]
    MissingBody { id: u64 },
}

/// A comment that could not be parsed, by position in the input batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub index: usize,
    pub comment_id: u64,
    pub error: ParseError,
}

/// Result of parsing a batch: one output per input, in order, plus the
/// failures that were isolated along the way.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub comments: Vec<Comment>,
    pub failures: Vec<ParseFailure>,
}

impl BatchOutcome {
    pub fn parsed_count(&self) -> usize {
        self.comments.iter().filter(|c| c.is_parsed()).count()
    }
}

/// Parse a single comment, surfacing a missing body as an error.
///
/// Comments not written by a recognised bot come back unchanged as
/// [`Comment::Raw`].
pub fn try_parse_one(raw: RawComment) -> Result<Comment, ParseError> {
    parse_or_return(raw).map_err(|(_, error)| error)
}

/// Parse a single comment. Never fails: a comment that cannot be parsed is
/// passed through unchanged.
pub fn parse_one(raw: RawComment) -> Comment {
    parse_or_return(raw).unwrap_or_else(|(raw, error)| {
        warn!(id = raw.id, error = %error, "passing comment through unparsed");
        Comment::Raw(raw)
    })
}

/// Element-wise [`parse_one`]; output has the same length and order as input.
pub fn parse_many(raws: Vec<RawComment>) -> Vec<Comment> {
    raws.into_iter().map(parse_one).collect()
}

/// Like [`parse_many`], but also records which items failed and why.
#[instrument(skip_all, fields(total = raws.len()))]
pub fn parse_batch(raws: Vec<RawComment>) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        comments: Vec::with_capacity(raws.len()),
        failures: Vec::new(),
    };

    for (index, raw) in raws.into_iter().enumerate() {
        match parse_or_return(raw) {
            Ok(comment) => outcome.comments.push(comment),
            Err((raw, error)) => {
                warn!(index, id = raw.id, error = %error, "failed to parse comment");
                outcome.failures.push(ParseFailure {
                    index,
                    comment_id: raw.id,
                    error,
                });
                outcome.comments.push(Comment::Raw(raw));
            }
        }
    }

    log_coverage(&outcome);
    outcome
}

/// On failure the comment is handed back so callers can pass it through.
fn parse_or_return(raw: RawComment) -> Result<Comment, (RawComment, ParseError)> {
    let Some(bot) = classify(&raw) else {
        return Ok(Comment::Raw(raw));
    };
    let fields = match raw.body.as_deref() {
        Some(body) => extract_fields(body),
        None => {
            let error = ParseError::MissingBody { id: raw.id };
            return Err((raw, error));
        }
    };

    debug!(id = raw.id, fields = fields.present_count(), "parsed bot comment");
    Ok(Comment::Parsed(assemble(raw, bot, fields)))
}

fn assemble(raw: RawComment, bot: BotIdentity, fields: ExtractedFields) -> ParsedComment {
    ParsedComment {
        raw,
        bot,
        issue_type: fields.issue_type,
        heading: fields.heading,
        summary: fields.summary,
        diff: fields.diff,
        suggested_code: fields.suggested_code,
        committable_suggestion: fields.committable_suggestion,
        ai_prompt: fields.ai_prompt,
        tools: fields.tools,
        internal_id: fields.internal_id,
    }
}

fn log_coverage(outcome: &BatchOutcome) {
    let parsed: Vec<&ParsedComment> = outcome
        .comments
        .iter()
        .filter_map(Comment::as_parsed)
        .collect();
    let count = |f: fn(&ParsedComment) -> bool| parsed.iter().filter(|p| f(p)).count();

    info!(
        total = outcome.comments.len(),
        parsed = parsed.len(),
        failed = outcome.failures.len(),
        issue_type = count(|p| p.issue_type.is_some()),
        summary = count(|p| p.summary.is_some()),
        diff = count(|p| p.diff.is_some()),
        suggestion = count(|p| p.suggested_code.is_some()),
        committable = count(|p| p.committable_suggestion.is_some()),
        ai_prompt = count(|p| p.ai_prompt.is_some()),
        tools = count(|p| !p.tools.is_empty()),
        internal_id = count(|p| p.internal_id.is_some()),
        "parsed comment batch"
    );
}
