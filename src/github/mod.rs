//! GitHub collaborator: fetches review threads and acts on them
//! (reply, resolve) over the REST and GraphQL APIs.

pub mod types;

pub use types::PrUrl;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::comment::RawComment;
use crate::config::Config;
use crate::source::{CommentSource, SourceError};
use types::{
    CreatedComment, GraphQlRequest, GraphQlResponse, ResolveData, ReviewThreadNode, ThreadsData,
};

const USER_AGENT: &str = "pr-comments";

const REVIEW_THREADS_QUERY: &str = r"
query ReviewThreads($owner: String!, $repo: String!, $number: Int!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    pullRequest(number: $number) {
      reviewThreads(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          isResolved
          isOutdated
          path
          line
          startLine
          comments(first: 100) {
            pageInfo { hasNextPage }
            nodes {
              databaseId
              body
              url
              createdAt
              isMinimized
              author { login }
            }
          }
        }
      }
    }
  }
}
";

const RESOLVE_THREAD_MUTATION: &str = r"
mutation ResolveReviewThread($threadId: ID!) {
  resolveReviewThread(input: {threadId: $threadId}) {
    thread { isResolved }
  }
}
";

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub GraphQL error: {0}")]
    GraphQl(String),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("Pull request not found: {0}")]
    NotFound(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// Parse a GitHub PR URL of the form
/// `https://github.com/{owner}/{repo}/pull/{number}`.
pub fn parse_pr_url(url: &str) -> Result<PrUrl, GithubError> {
    let invalid = || GithubError::InvalidUrl(url.to_string());
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(invalid());
    }

    let pr_number = segments[3].parse::<u64>().map_err(|_| invalid())?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        pr_number,
    })
}

/// Authenticated GitHub API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
}

impl GithubClient {
    pub fn new(config: &Config) -> Result<Self, GithubError> {
        let token = config.github_token().ok_or(GithubError::MissingToken)?;
        Ok(Self::with_api_url(token, config.api_url()))
    }

    pub fn with_api_url(token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every comment of every review thread on the PR, with the
    /// thread's resolved/outdated state copied onto each comment.
    #[instrument(skip(self, pr), fields(pr = %pr))]
    pub async fn fetch_review_comments(&self, pr: &PrUrl) -> Result<Vec<RawComment>, GithubError> {
        let mut comments = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let variables = json!({
                "owner": pr.owner,
                "repo": pr.repo,
                "number": pr.pr_number,
                "cursor": cursor,
            });
            let data: ThreadsData = self.graphql(REVIEW_THREADS_QUERY, variables).await?;
            let threads = data
                .repository
                .and_then(|repo| repo.pull_request)
                .ok_or_else(|| GithubError::NotFound(pr.to_string()))?
                .review_threads;

            debug!(threads = threads.nodes.len(), "received review thread page");
            for thread in threads.nodes {
                comments.extend(thread_comments(thread));
            }

            match threads.page_info.end_cursor {
                Some(next) if threads.page_info.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        debug!(comments = comments.len(), "fetched review comments");
        Ok(comments)
    }

    /// Post a reply in the thread of an inline review comment.
    /// Returns the id of the new comment.
    #[instrument(skip(self, pr, body), fields(pr = %pr))]
    pub async fn reply(&self, pr: &PrUrl, comment_id: u64, body: &str) -> Result<u64, GithubError> {
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/comments/{}/replies",
            self.api_url, pr.owner, pr.repo, pr.pr_number, comment_id
        );
        let created = self
            .http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .json(&json!({ "body": body }))
            .send()
            .await?
            .error_for_status()?
            .json::<CreatedComment>()
            .await?;
        debug!(reply_id = created.id, "posted reply");
        Ok(created.id)
    }

    /// Mark a review thread resolved. Returns the thread's state afterwards.
    #[instrument(skip(self))]
    pub async fn resolve_thread(&self, thread_id: &str) -> Result<bool, GithubError> {
        let data: ResolveData = self
            .graphql(RESOLVE_THREAD_MUTATION, json!({ "threadId": thread_id }))
            .await?;
        Ok(data.resolve_review_thread.thread.is_resolved)
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GithubError> {
        let response = self
            .http
            .post(format!("{}/graphql", self.api_url))
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&self.token)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?
            .error_for_status()?
            .json::<GraphQlResponse<T>>()
            .await?;

        if !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(GithubError::GraphQl(messages.join("; ")));
        }
        response
            .data
            .ok_or_else(|| GithubError::GraphQl("response carried no data".to_string()))
    }
}

fn thread_comments(thread: ReviewThreadNode) -> Vec<RawComment> {
    if thread.comments.page_info.has_next_page {
        warn!(
            thread = %thread.id,
            fetched = thread.comments.nodes.len(),
            "review thread has more comments than one page; later replies are not fetched"
        );
    }
    thread
        .comments
        .nodes
        .into_iter()
        .filter_map(|node| {
            let Some(id) = node.database_id else {
                debug!(url = %node.url, "skipping comment without database id");
                return None;
            };
            Some(RawComment {
                id,
                author: node.author.map(|a| a.login),
                body: node.body,
                created_at: node.created_at,
                url: node.url,
                path: thread.path.clone(),
                line: thread.line,
                start_line: thread.start_line,
                thread_id: Some(thread.id.clone()),
                is_resolved: Some(thread.is_resolved),
                is_outdated: Some(thread.is_outdated),
                is_minimized: Some(node.is_minimized),
            })
        })
        .collect()
}

/// Review comments of one pull request, fetched live.
pub struct PullRequestSource {
    pub client: GithubClient,
    pub pr: PrUrl,
}

#[async_trait]
impl CommentSource for PullRequestSource {
    fn describe(&self) -> String {
        self.pr.to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawComment>, SourceError> {
        Ok(self.client.fetch_review_comments(&self.pr).await?)
    }
}
