use serde::{Deserialize, Serialize};

/// A review comment as delivered by the fetch layer, before any parsing.
///
/// `author` and `body` are optional because GitHub returns `null` for
/// deleted ("ghost") users and for redacted bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    /// Numeric comment id (GitHub `databaseId`)
    pub id: u64,
    /// Author login
    #[serde(default)]
    pub author: Option<String>,
    /// Full Markdown body
    #[serde(default)]
    pub body: Option<String>,
    /// Creation timestamp, RFC 3339 as returned by GitHub
    pub created_at: String,
    /// Permalink to the comment
    pub url: String,
    /// File path for inline comments
    #[serde(default)]
    pub path: Option<String>,
    /// Line in the file for inline comments; the last line of a range
    #[serde(default)]
    pub line: Option<u32>,
    /// First line when the comment covers a range of lines
    #[serde(default)]
    pub start_line: Option<u32>,
    /// GraphQL node id of the review thread this comment belongs to
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub is_resolved: Option<bool>,
    #[serde(default)]
    pub is_outdated: Option<bool>,
    #[serde(default)]
    pub is_minimized: Option<bool>,
}

/// The review bot a parsed comment is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotIdentity {
    #[serde(rename = "coderabbitai[bot]")]
    CodeRabbit,
}

impl BotIdentity {
    /// Canonical login used when tagging output, whichever spelling matched.
    pub fn login(&self) -> &'static str {
        match self {
            BotIdentity::CodeRabbit => "coderabbitai[bot]",
        }
    }
}

impl std::fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.login())
    }
}

/// A bot comment plus the fields extracted from its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedComment {
    /// The source comment, preserved verbatim
    #[serde(flatten)]
    pub raw: RawComment,
    pub bot: BotIdentity,
    /// Category label from the leading italic marker line, glyph stripped
    pub issue_type: Option<String>,
    /// First `###` heading
    pub heading: Option<String>,
    /// First bold span in the body
    pub summary: Option<String>,
    /// Content of the first ```` ```diff ```` block
    pub diff: Option<String>,
    /// Content of the first ```` ```suggestion ```` block
    pub suggested_code: Option<String>,
    /// Code under the "Committable suggestion" section
    pub committable_suggestion: Option<String>,
    /// Text of the "Prompt for AI Agents" section
    pub ai_prompt: Option<String>,
    /// Tool attributions in document order, duplicates kept
    pub tools: Vec<String>,
    /// Fingerprint token used for cross-sync deduplication
    pub internal_id: Option<String>,
}

impl ParsedComment {
    /// True when the comment carries something an agent can act on:
    /// a prompt, a suggestion block or a committable suggestion.
    pub fn is_actionable(&self) -> bool {
        [
            &self.ai_prompt,
            &self.suggested_code,
            &self.committable_suggestion,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// Either a comment that went through the parser or one passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Comment {
    Parsed(ParsedComment),
    Raw(RawComment),
}

impl Comment {
    /// The underlying raw comment, whichever variant this is.
    pub fn raw(&self) -> &RawComment {
        match self {
            Comment::Parsed(parsed) => &parsed.raw,
            Comment::Raw(raw) => raw,
        }
    }

    pub fn as_parsed(&self) -> Option<&ParsedComment> {
        match self {
            Comment::Parsed(parsed) => Some(parsed),
            Comment::Raw(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Comment::Parsed(_))
    }
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment::Raw(raw)
    }
}

impl From<ParsedComment> for Comment {
    fn from(parsed: ParsedComment) -> Self {
        Comment::Parsed(parsed)
    }
}
