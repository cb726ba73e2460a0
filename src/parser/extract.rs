//! Field extractors for CodeRabbit comment bodies.
//!
//! Each extractor is an independent rule over the raw Markdown text and
//! returns `None` (or an empty list) when its pattern is missing, incomplete
//! or truncated. Marker patterns run on the `regex` crate's automaton engine
//! and fenced blocks are found by a single pass over the lines, so matching is
//! linear in the body length even on adversarial input.

use regex::Regex;
use std::sync::LazyLock;

/// Italic marker line such as `_⚠️ Potential issue_`. Only the label after the
/// glyph is captured, so a trailing badge like `| _🟠 Major_` is ignored.
static ISSUE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^_(?:⚠\x{FE0F}?|💡|❗|💬|🛠\x{FE0F}?|🔧)[ \t]*([^_\n]+?)[ \t]*_")
        .expect("issue type pattern")
});

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###[ \t]+(.+)$").expect("heading pattern"));

// Single-line and non-greedy: the first bold run wins, even inside prose.
static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("summary pattern"));

static FINGERPRINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--[ \t]*fingerprinting:([a-z:]+)[ \t]*-->").expect("fingerprint pattern")
});

static TOOL_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<summary>[ \t]*(?:🔧|🪛)[ \t]*([^<\n]+)</summary>").expect("tool pattern")
});

static AI_PROMPT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<summary>[ \t]*🤖[ \t]*Prompt for AI Agents[ \t]*</summary>")
        .expect("ai prompt marker pattern")
});

static COMMITTABLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)📝[ \t]*Committable suggestion").expect("committable marker pattern")
});

/// Every derived field a comment body can yield.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub issue_type: Option<String>,
    pub heading: Option<String>,
    pub summary: Option<String>,
    pub diff: Option<String>,
    pub suggested_code: Option<String>,
    pub committable_suggestion: Option<String>,
    pub ai_prompt: Option<String>,
    pub tools: Vec<String>,
    pub internal_id: Option<String>,
}

impl ExtractedFields {
    /// Number of optional fields that were found, tools counted once.
    pub fn present_count(&self) -> usize {
        [
            &self.issue_type,
            &self.heading,
            &self.summary,
            &self.diff,
            &self.suggested_code,
            &self.committable_suggestion,
            &self.ai_prompt,
            &self.internal_id,
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
            + usize::from(!self.tools.is_empty())
    }
}

/// Run every extractor over `body`.
pub fn extract_fields(body: &str) -> ExtractedFields {
    ExtractedFields {
        issue_type: extract_issue_type(body),
        heading: extract_heading(body),
        summary: extract_summary(body),
        diff: extract_diff(body),
        suggested_code: extract_suggested_code(body),
        committable_suggestion: extract_committable_suggestion(body),
        ai_prompt: extract_ai_prompt(body),
        tools: extract_tools(body),
        internal_id: extract_internal_id(body),
    }
}

pub fn extract_issue_type(body: &str) -> Option<String> {
    first_capture(&ISSUE_TYPE, body)
}

/// First `###` heading line.
///
/// Only the first heading is looked at: when its text is blank the field is
/// absent, even if a later heading has content.
pub fn extract_heading(body: &str) -> Option<String> {
    first_capture(&HEADING, body)
}

/// First `**bold**` span anywhere in the body.
///
/// This is a heuristic: a bold word in prose ahead of the real summary line
/// will be returned instead. Only the first span is looked at, so a blank one
/// such as `** **` makes the field absent even if a later span has text.
pub fn extract_summary(body: &str) -> Option<String> {
    first_capture(&SUMMARY, body)
}

pub fn extract_diff(body: &str) -> Option<String> {
    tagged_fence(body, "diff")
}

pub fn extract_suggested_code(body: &str) -> Option<String> {
    tagged_fence(body, "suggestion")
}

pub fn extract_internal_id(body: &str) -> Option<String> {
    first_capture(&FINGERPRINT, body)
}

/// All tool attributions, in document order.
pub fn extract_tools(body: &str) -> Vec<String> {
    TOOL_SUMMARY
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| non_empty(m.as_str()))
        .collect()
}

/// Fenced text after the "Prompt for AI Agents" collapsible marker.
pub fn extract_ai_prompt(body: &str) -> Option<String> {
    fence_after_marker(&AI_PROMPT_MARKER, body)
}

/// Code block after the "Committable suggestion" label, whatever its fence tag.
pub fn extract_committable_suggestion(body: &str) -> Option<String> {
    fence_after_marker(&COMMITTABLE_MARKER, body)
}

/// Replacement text for the commented lines, untrimmed: the first
/// `suggestion` block, else the block under the committable label.
///
/// Indentation is kept and only the line break before the closing fence is
/// dropped. An empty suggestion block yields `Some("")`, which deletes the lines.
pub fn suggestion_source(body: &str) -> Option<&str> {
    let content = first_tagged(body, "suggestion")
        .or_else(|| first_after_marker(&COMMITTABLE_MARKER, body))?;
    let content = content.strip_suffix('\n').unwrap_or(content);
    Some(content.strip_suffix('\r').unwrap_or(content))
}

fn fence_after_marker(marker: &Regex, body: &str) -> Option<String> {
    first_after_marker(marker, body).and_then(non_empty)
}

fn tagged_fence(body: &str, tag: &str) -> Option<String> {
    first_tagged(body, tag).and_then(non_empty)
}

/// Anchor on the first `marker` match, then take the first fenced block after
/// it. If that block is never closed there is no content. Fences before the
/// marker never count.
fn first_after_marker<'a>(marker: &Regex, body: &'a str) -> Option<&'a str> {
    let anchor = marker.find(body)?;
    fences(&body[anchor.end()..])
        .first()
        .and_then(|fence| fence.content)
}

/// Content of the first closed block tagged `tag`.
fn first_tagged<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    fences(body)
        .into_iter()
        .find(|fence| fence.tag == tag && fence.content.is_some())
        .and_then(|fence| fence.content)
}

/// A fenced code block. `content` is `None` when the block is never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence<'a> {
    tag: &'a str,
    content: Option<&'a str>,
}

/// Fenced blocks in document order.
///
/// A block opens on a line starting with three or more backticks and an
/// optional tag, and closes on a line holding at least as many backticks and
/// nothing else. Shorter backtick runs are content, so a four-backtick block
/// can carry a nested three-backtick one. An opener at least as long as the
/// open block's fence before its close leaves that block unclosed.
fn fences(text: &str) -> Vec<Fence<'_>> {
    let mut blocks = Vec::new();
    // (fence length, tag, offset where the content starts)
    let mut open: Option<(usize, &str, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let Some((ticks, info)) = fence_line(line) else {
            continue;
        };
        match open {
            Some((len, _, _)) if ticks < len => {}
            Some((_, tag, from)) if info.is_empty() => {
                blocks.push(Fence {
                    tag,
                    content: Some(&text[from..line_start]),
                });
                open = None;
            }
            Some((_, tag, _)) => {
                blocks.push(Fence { tag, content: None });
                open = Some((ticks, fence_tag(info), offset));
            }
            None => open = Some((ticks, fence_tag(info), offset)),
        }
    }

    if let Some((_, tag, _)) = open {
        blocks.push(Fence { tag, content: None });
    }
    blocks
}

/// Backtick count and trailing info text of a fence line.
fn fence_line(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let ticks = line.len() - line.trim_start_matches('`').len();
    let info = line[ticks..].trim();
    (ticks >= 3 && !info.contains('`')).then_some((ticks, info))
}

fn fence_tag(info: &str) -> &str {
    info.split_whitespace().next().unwrap_or("")
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_type_strips_glyph() {
        let body = "_⚠️ Potential issue_\n\n**Something**";
        assert_eq!(extract_issue_type(body), Some("Potential issue".to_string()));
    }

    #[test]
    fn test_issue_type_with_severity_badge() {
        let body = "_🛠️ Refactor suggestion_ | _🟠 Major_\n";
        assert_eq!(
            extract_issue_type(body),
            Some("Refactor suggestion".to_string())
        );
    }

    #[test]
    fn test_issue_type_without_variation_selector() {
        let body = "_⚠ Potential issue_";
        assert_eq!(extract_issue_type(body), Some("Potential issue".to_string()));
    }

    #[test]
    fn test_issue_type_must_start_line() {
        assert_eq!(extract_issue_type("see _💡 Verification agent_"), None);
        assert_eq!(extract_issue_type("_plain italics_"), None);
    }

    #[test]
    fn test_issue_type_first_line_wins() {
        let body = "_💡 Verification agent_\n_❗ Critical_";
        assert_eq!(
            extract_issue_type(body),
            Some("Verification agent".to_string())
        );
    }

    #[test]
    fn test_heading_level_three_only() {
        assert_eq!(
            extract_heading("#### Deep\n### Real heading  \n"),
            Some("Real heading".to_string())
        );
        assert_eq!(extract_heading("## Too shallow"), None);
    }

    #[test]
    fn test_blank_first_match_is_absent() {
        assert_eq!(extract_heading("###   \n### Later heading"), None);
        assert_eq!(extract_summary("** **\n**Later summary**"), None);
    }

    #[test]
    fn test_summary_first_bold_span() {
        let body = "Intro with **emphasis** here.\n\n**Actual summary**";
        // Known heuristic: the prose emphasis wins.
        assert_eq!(extract_summary(body), Some("emphasis".to_string()));
    }

    #[test]
    fn test_summary_does_not_span_lines() {
        assert_eq!(extract_summary("**unterminated\nbold**"), None);
    }

    #[test]
    fn test_diff_and_suggestion_are_independent() {
        let body = "```suggestion\nlet b = 2;\n```\n\n```diff\n-let a = 1;\n+let a = 2;\n```";
        assert_eq!(extract_diff(body), Some("-let a = 1;\n+let a = 2;".to_string()));
        assert_eq!(extract_suggested_code(body), Some("let b = 2;".to_string()));
    }

    #[test]
    fn test_unterminated_fence_is_absent() {
        assert_eq!(extract_diff("```diff\n-a\n+b\n"), None);
        assert_eq!(extract_suggested_code("```suggestion\nx"), None);
    }

    #[test]
    fn test_empty_fence_is_absent() {
        assert_eq!(extract_diff("```diff\n\n```"), None);
        assert_eq!(extract_diff("```diff\n```"), None);
    }

    #[test]
    fn test_backticks_inside_diff_do_not_close_it() {
        let body = "```diff\n-let s = \"```\";\n+let s = \"~~~\";\n```\n";
        assert_eq!(
            extract_diff(body),
            Some("-let s = \"```\";\n+let s = \"~~~\";".to_string())
        );
    }

    #[test]
    fn test_closing_fence_must_stand_alone() {
        assert_eq!(extract_diff("```diff\n-a\n``` not a close\n"), None);
        assert_eq!(extract_diff("```diff\n-a\n```  \n"), Some("-a".to_string()));
    }

    #[test]
    fn test_four_backtick_suggestion_keeps_nested_fence() {
        let body = "````suggestion\n# Title\n```rust\nfn x() {}\n```\n````\n";
        assert_eq!(
            extract_suggested_code(body),
            Some("# Title\n```rust\nfn x() {}\n```".to_string())
        );
        assert_eq!(extract_suggested_code("````suggestion\nx\n```\n"), None);
    }

    #[test]
    fn test_crlf_bodies() {
        let body = "_⚠️ Potential issue_\r\n\r\n**Fix the leak**\r\n\r\n\
            ```diff\r\n-a\r\n+b\r\n```\r\n\r\n\
            ```suggestion\r\nfix();\r\n```\r\n\r\n\
            <summary>🤖 Prompt for AI Agents</summary>\r\n\r\n\
            ```\r\nClear the interval.\r\n```\r\n";
        let fields = extract_fields(body);
        assert_eq!(fields.issue_type.as_deref(), Some("Potential issue"));
        assert_eq!(fields.summary.as_deref(), Some("Fix the leak"));
        assert_eq!(fields.diff.as_deref(), Some("-a\r\n+b"));
        assert_eq!(fields.suggested_code.as_deref(), Some("fix();"));
        assert_eq!(fields.ai_prompt.as_deref(), Some("Clear the interval."));
    }

    #[test]
    fn test_internal_id() {
        let body = "text\n<!-- fingerprinting:phantom:medusa:falcon -->\n";
        assert_eq!(
            extract_internal_id(body),
            Some("phantom:medusa:falcon".to_string())
        );
        assert_eq!(extract_internal_id("<!-- fingerprinting:Upper:Case -->"), None);
        assert_eq!(extract_internal_id("<!-- fingerprinting:"), None);
    }

    #[test]
    fn test_tools_keep_order_and_duplicates() {
        let body = "<details>\n<summary>🧰 Tools</summary>\n\
            <details>\n<summary>🪛 Biome (1.9.4)</summary>\n</details>\n\
            <details>\n<summary>🔧 ESLint</summary>\n</details>\n\
            <details>\n<summary>🪛 Biome (1.9.4)</summary>\n</details>\n</details>";
        assert_eq!(
            extract_tools(body),
            vec!["Biome (1.9.4)", "ESLint", "Biome (1.9.4)"]
        );
    }

    #[test]
    fn test_tools_empty_when_absent() {
        assert!(extract_tools("nothing here").is_empty());
        assert!(extract_tools("<summary>🔧 never closed").is_empty());
    }

    #[test]
    fn test_ai_prompt_anchors_on_marker() {
        let body = "```\nnot the prompt\n```\n\n<details>\n\
            <summary>🤖 Prompt for AI Agents</summary>\n\n\
            ```\nIn src/app.tsx around line 10, add a cleanup.\n```\n</details>";
        assert_eq!(
            extract_ai_prompt(body),
            Some("In src/app.tsx around line 10, add a cleanup.".to_string())
        );
    }

    #[test]
    fn test_ai_prompt_requires_marker() {
        assert_eq!(extract_ai_prompt("```\nsome code\n```"), None);
    }

    #[test]
    fn test_ai_prompt_marker_without_fence() {
        assert_eq!(extract_ai_prompt("<summary>🤖 Prompt for AI Agents</summary>"), None);
        assert_eq!(
            extract_ai_prompt("<summary>🤖 Prompt for AI Agents</summary>\n```\nunterminated"),
            None
        );
    }

    #[test]
    fn test_unclosed_prompt_does_not_take_a_later_block() {
        let body = "<details>\n<summary>🤖 Prompt for AI Agents</summary>\n\n\
            ```\nReview this component\n</details>\n\n```diff\n-a\n+b\n```";
        assert_eq!(extract_ai_prompt(body), None);
        assert_eq!(extract_diff(body), Some("-a\n+b".to_string()));
    }

    #[test]
    fn test_committable_marker_without_fence() {
        assert_eq!(
            extract_committable_suggestion("<summary>📝 Committable suggestion</summary>"),
            None
        );
        assert_eq!(
            extract_committable_suggestion(
                "<summary>📝 Committable suggestion</summary>\n\n```ts\nunterminated"
            ),
            None
        );
    }

    #[test]
    fn test_committable_marker_with_unclosed_fence_before_another_block() {
        let body = "<summary>📝 Committable suggestion</summary>\n\n\
            ```ts\nconst a = 1;\n\n```suggestion\nconst b = 2;\n```";
        assert_eq!(extract_committable_suggestion(body), None);
        assert_eq!(extract_suggested_code(body), Some("const b = 2;".to_string()));
    }

    #[test]
    fn test_committable_suggestion_any_tag() {
        let body = "```suggestion\nfirst();\n```\n\n<details>\n\
            <summary>📝 Committable suggestion</summary>\n\n\
            > ‼️ **IMPORTANT**\n\n\
            ```typescript\nuseEffect(() => () => clearInterval(id), []);\n```\n</details>";
        assert_eq!(
            extract_committable_suggestion(body),
            Some("useEffect(() => () => clearInterval(id), []);".to_string())
        );
        assert_eq!(extract_suggested_code(body), Some("first();".to_string()));
    }

    #[test]
    fn test_suggestion_source_keeps_indentation() {
        let body = "```suggestion\n    let a = 1;\n    let b = 2;\n```\n";
        assert_eq!(
            suggestion_source(body),
            Some("    let a = 1;\n    let b = 2;")
        );
        assert_eq!(suggestion_source("```suggestion\n```"), Some(""));
        assert_eq!(suggestion_source("```diff\n-a\n```"), None);
    }

    #[test]
    fn test_suggestion_source_falls_back_to_committable() {
        let body = "<summary>📝 Committable suggestion</summary>\r\n\r\n\
            ```ts\r\n  call();\r\n```\r\n";
        assert_eq!(suggestion_source(body), Some("  call();"));
    }

    #[test]
    fn test_extract_fields_on_plain_text() {
        let fields = extract_fields("Simple CodeRabbit comment without extras");
        assert_eq!(fields, ExtractedFields::default());
        assert_eq!(fields.present_count(), 0);
    }

    #[test]
    fn test_extract_fields_on_empty_body() {
        assert_eq!(extract_fields(""), ExtractedFields::default());
    }

    #[test]
    fn test_present_count() {
        let fields = extract_fields("### Title\n**Bold**\n<summary>🔧 Clippy</summary>");
        assert_eq!(fields.present_count(), 3);
    }
}
