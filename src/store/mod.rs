//! Flattened records handed to the persistence layer.

use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use crate::comment::Comment;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write records: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One comment as a row of named columns. Tools are comma-joined and
/// missing thread flags become `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: u64,
    pub author: Option<String>,
    pub url: String,
    pub created_at: String,
    pub path: Option<String>,
    pub line: Option<u32>,
    pub start_line: Option<u32>,
    pub thread_id: Option<String>,
    pub bot: Option<String>,
    pub issue_type: Option<String>,
    pub heading: Option<String>,
    pub summary: Option<String>,
    pub diff: Option<String>,
    pub suggested_code: Option<String>,
    pub committable_suggestion: Option<String>,
    pub ai_prompt: Option<String>,
    pub tools: String,
    pub internal_id: Option<String>,
    pub is_resolved: bool,
    pub is_outdated: bool,
    pub is_minimized: bool,
    pub is_actionable: bool,
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        let raw = comment.raw();
        let mut record = CommentRecord {
            id: raw.id,
            author: raw.author.clone(),
            url: raw.url.clone(),
            created_at: raw.created_at.clone(),
            path: raw.path.clone(),
            line: raw.line,
            start_line: raw.start_line,
            thread_id: raw.thread_id.clone(),
            bot: None,
            issue_type: None,
            heading: None,
            summary: None,
            diff: None,
            suggested_code: None,
            committable_suggestion: None,
            ai_prompt: None,
            tools: String::new(),
            internal_id: None,
            is_resolved: raw.is_resolved.unwrap_or(false),
            is_outdated: raw.is_outdated.unwrap_or(false),
            is_minimized: raw.is_minimized.unwrap_or(false),
            is_actionable: false,
        };

        if let Some(parsed) = comment.as_parsed() {
            record.bot = Some(parsed.bot.to_string());
            record.issue_type = parsed.issue_type.clone();
            record.heading = parsed.heading.clone();
            record.summary = parsed.summary.clone();
            record.diff = parsed.diff.clone();
            record.suggested_code = parsed.suggested_code.clone();
            record.committable_suggestion = parsed.committable_suggestion.clone();
            record.ai_prompt = parsed.ai_prompt.clone();
            record.tools = parsed.tools.join(",");
            record.internal_id = parsed.internal_id.clone();
            record.is_actionable = parsed.is_actionable();
        }
        record
    }
}

pub fn to_records(comments: &[Comment]) -> Vec<CommentRecord> {
    comments.iter().map(CommentRecord::from).collect()
}

/// Write records as JSON Lines. Returns the number of records written.
pub fn write_jsonl<W: Write>(
    records: &[CommentRecord],
    mut writer: W,
) -> Result<usize, StoreError> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    debug!(records = records.len(), "wrote comment records");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::RawComment;
    use crate::parser::parse_one;

    fn raw(author: &str, body: &str) -> RawComment {
        RawComment {
            id: 5,
            author: Some(author.to_string()),
            body: Some(body.to_string()),
            created_at: "2024-05-01T12:00:00Z".to_string(),
            url: "https://github.com/org/repo/pull/1#discussion_r5".to_string(),
            path: Some("src/lib.rs".to_string()),
            line: Some(3),
            start_line: None,
            thread_id: Some("PRRT_5".to_string()),
            is_resolved: Some(true),
            is_outdated: None,
            is_minimized: None,
        }
    }

    #[test]
    fn test_record_from_parsed_comment() {
        let body = "_💡 Verification agent_\n**Check it**\n\
            <summary>🪛 Biome</summary>\n<summary>🔧 ESLint</summary>\n\
            ```suggestion\nok();\n```";
        let record = CommentRecord::from(&parse_one(raw("coderabbitai", body)));
        assert_eq!(record.bot.as_deref(), Some("coderabbitai[bot]"));
        assert_eq!(record.issue_type.as_deref(), Some("Verification agent"));
        assert_eq!(record.tools, "Biome,ESLint");
        assert!(record.is_resolved);
        assert!(!record.is_outdated);
        assert!(record.is_actionable);
    }

    #[test]
    fn test_record_from_raw_comment() {
        let record = CommentRecord::from(&parse_one(raw("alice", "**Looks good**")));
        assert!(record.bot.is_none());
        assert!(record.summary.is_none());
        assert_eq!(record.tools, "");
        assert!(!record.is_actionable);
    }

    #[test]
    fn test_write_jsonl() {
        let comments = vec![
            parse_one(raw("alice", "hi")),
            parse_one(raw("coderabbitai[bot]", "**x**")),
        ];
        let mut out = Vec::new();
        let written = write_jsonl(&to_records(&comments), &mut out).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["summary"], "x");
        assert_eq!(second["is_resolved"], true);
    }
}
