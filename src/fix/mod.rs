//! Apply a comment's suggested code to a checked-out working tree.

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};

use crate::comment::ParsedComment;
use crate::parser::extract::suggestion_source;

#[derive(Debug, Error)]
pub enum FixError {
    #[error("comment {id} carries no suggested code")]
    NoSuggestion { id: u64 },

    #[error("comment {id} is not attached to a file line")]
    NoLocation { id: u64 },

    #[error("refusing to edit {0}: path leaves the repository root")]
    UnsafePath(String),

    #[error("{path:?}: lines {start}-{end} are outside the file ({lines} lines)")]
    OutOfRange {
        path: PathBuf,
        start: u32,
        end: u32,
        lines: usize,
    },

    #[error("comment {id} overlaps a fix already applied to {path:?}")]
    Overlaps { id: u64, path: PathBuf },

    #[error("Failed to update file: {0}")]
    Io(#[from] std::io::Error),
}

/// A pending edit: replace lines `start..=end` (1-based) of `path` with
/// `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixPlan {
    pub comment_id: u64,
    /// Path relative to the repository root
    pub path: PathBuf,
    pub start: u32,
    pub end: u32,
    pub replacement: String,
}

/// Work out the edit a comment asks for without touching the filesystem.
///
/// The replacement is the first suggestion block, else the committable
/// suggestion. It covers the comment's line range, or just `line` when the
/// comment has no `start_line`.
pub fn plan(comment: &ParsedComment) -> Result<FixPlan, FixError> {
    let id = comment.raw.id;
    let replacement = comment
        .raw
        .body
        .as_deref()
        .and_then(suggestion_source)
        .ok_or(FixError::NoSuggestion { id })?;
    let (Some(path), Some(end)) = (comment.raw.path.as_deref(), comment.raw.line) else {
        return Err(FixError::NoLocation { id });
    };
    let path = relative_path(path).ok_or_else(|| FixError::UnsafePath(path.to_string()))?;

    Ok(FixPlan {
        comment_id: id,
        path,
        start: comment.raw.start_line.unwrap_or(end),
        end,
        replacement: replacement.to_string(),
    })
}

/// Apply a comment's suggestion to the file it was left on, under `root`.
#[instrument(skip(comment, root), fields(id = comment.raw.id))]
pub fn apply_fix(comment: &ParsedComment, root: &Path) -> Result<FixPlan, FixError> {
    let plan = plan(comment)?;
    let target = root.join(&plan.path);
    let original = fs::read_to_string(&target)?;
    let updated = splice(&original, &plan)?;
    fs::write(&target, updated)?;

    info!(
        path = %plan.path.display(),
        start = plan.start,
        end = plan.end,
        "applied suggested fix"
    );
    Ok(plan)
}

/// Apply every comment's suggestion under `root`, bottom-up within each file
/// so an edit never shifts the lines of one still to come. Comments without a
/// suggestion are left out of the result; a range overlapping one already
/// applied is refused.
pub fn apply_all(
    comments: &[ParsedComment],
    root: &Path,
) -> Vec<(u64, Result<FixPlan, FixError>)> {
    let mut ordered: Vec<&ParsedComment> = comments.iter().collect();
    ordered.sort_by(|a, b| {
        a.raw
            .path
            .cmp(&b.raw.path)
            .then(b.raw.line.cmp(&a.raw.line))
    });

    let mut results = Vec::new();
    let mut applied_above: Option<(PathBuf, u32)> = None;
    for comment in ordered {
        let id = comment.raw.id;
        let plan = match plan(comment) {
            Ok(plan) => plan,
            Err(FixError::NoSuggestion { .. }) => continue,
            Err(e) => {
                results.push((id, Err(e)));
                continue;
            }
        };
        if let Some((path, start)) = &applied_above {
            if *path == plan.path && plan.end >= *start {
                results.push((id, Err(FixError::Overlaps { id, path: plan.path })));
                continue;
            }
        }
        let result = apply_fix(comment, root);
        if let Ok(done) = &result {
            applied_above = Some((done.path.clone(), done.start));
        }
        results.push((id, result));
    }
    results
}

/// Rewrite `original` with the planned line range replaced. The file's line
/// ending style is kept, and so is a missing newline at end of file.
pub fn splice(original: &str, plan: &FixPlan) -> Result<String, FixError> {
    let lines: Vec<&str> = original.split_inclusive('\n').collect();
    let (start, end) = (plan.start as usize, plan.end as usize);
    if start == 0 || start > end || end > lines.len() {
        return Err(FixError::OutOfRange {
            path: plan.path.clone(),
            start: plan.start,
            end: plan.end,
            lines: lines.len(),
        });
    }

    let newline = if original.contains("\r\n") { "\r\n" } else { "\n" };
    let mut out = String::with_capacity(original.len() + plan.replacement.len());
    out.extend(lines[..start - 1].iter().copied());
    for line in plan.replacement.lines() {
        out.push_str(line);
        out.push_str(newline);
    }
    if end == lines.len() && !original.ends_with('\n') && !plan.replacement.is_empty() {
        out.truncate(out.len() - newline.len());
    }
    out.extend(lines[end..].iter().copied());
    Ok(out)
}

/// Only plain relative paths: no root, prefix or `..` components.
fn relative_path(path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    let mut components = path.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        .then(|| path.to_path_buf())
}
