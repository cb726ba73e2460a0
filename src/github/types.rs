use serde::{Deserialize, Serialize};

/// Represents the parsed components of a GitHub PR URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl std::fmt::Display for PrUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.pr_number)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

// reviewThreads query

#[derive(Debug, Deserialize)]
pub(crate) struct ThreadsData {
    pub repository: Option<Repository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Repository {
    #[serde(rename = "pullRequest")]
    pub pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestNode {
    #[serde(rename = "reviewThreads")]
    pub review_threads: ReviewThreads,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewThreads {
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
    pub nodes: Vec<ReviewThreadNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewThreadNode {
    pub id: String,
    #[serde(rename = "isResolved")]
    pub is_resolved: bool,
    #[serde(rename = "isOutdated", default)]
    pub is_outdated: bool,
    pub path: Option<String>,
    pub line: Option<u32>,
    #[serde(rename = "startLine", default)]
    pub start_line: Option<u32>,
    pub comments: CommentConnection,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentConnection {
    #[serde(rename = "pageInfo", default)]
    pub page_info: CommentPageInfo,
    pub nodes: Vec<CommentNode>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommentPageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentNode {
    #[serde(rename = "databaseId")]
    pub database_id: Option<u64>,
    pub body: Option<String>,
    pub url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "isMinimized", default)]
    pub is_minimized: bool,
    pub author: Option<Author>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Author {
    pub login: String,
}

// resolveReviewThread mutation

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveData {
    #[serde(rename = "resolveReviewThread")]
    pub resolve_review_thread: ResolvePayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolvePayload {
    pub thread: ResolvedThread,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolvedThread {
    #[serde(rename = "isResolved")]
    pub is_resolved: bool,
}

/// REST response for a newly created reply.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedComment {
    pub id: u64,
}
