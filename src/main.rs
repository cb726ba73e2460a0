use clap::Parser;
use pr_comments::config::Config;
use pr_comments::github::{self, GithubClient, PullRequestSource};
use pr_comments::source::{CommentSource, JsonSource};
use pr_comments::{filter_actionable, fix, parse_batch, report, store, ThreadFilter};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// pr-comments: collect CodeRabbit review comments on a GitHub pull request
/// and report the ones an agent can act on.
#[derive(Parser, Debug)]
#[command(name = "pr-comments", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// Not required when --mock or --input is used.
    pr_url: Option<String>,

    /// Read raw comments from a JSON file instead of GitHub
    #[arg(long, conflicts_with = "mock")]
    input: Option<PathBuf>,

    /// Optional output file path for markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write every comment as a flattened JSON Lines record
    #[arg(long)]
    export: Option<PathBuf>,

    /// Apply suggested code from actionable comments to the checkout at this path
    #[arg(long, value_name = "REPO_ROOT")]
    apply_fixes: Option<PathBuf>,

    /// Keep resolved, outdated and minimized threads
    #[arg(long)]
    all_threads: bool,

    /// Use built-in sample comments for demo purposes (no GitHub token needed)
    #[arg(long)]
    r#mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = Config::load()?;

    let source: Box<dyn CommentSource> = if cli.r#mock {
        info!("using mock comments for demo");
        Box::new(JsonSource::Inline {
            label: "mock PR".to_string(),
            json: include_str!("../tests/fixtures/sample_comments.json"),
        })
    } else if let Some(path) = cli.input.clone() {
        Box::new(JsonSource::File(path))
    } else {
        let pr_url = cli.pr_url.as_deref().ok_or(
            "PR URL is required unless --mock or --input is used. Usage: pr-comments <URL>",
        )?;
        let pr = github::parse_pr_url(pr_url)?;
        debug!(owner = %pr.owner, repo = %pr.repo, pr = pr.pr_number, "parsed PR URL");
        Box::new(PullRequestSource {
            client: GithubClient::new(&config)?,
            pr,
        })
    };

    let title = source.describe();
    let _main_span = info_span!("pr_comments", source = %title).entered();

    info!("fetching comments");
    let raws = source.fetch().await?;
    info!(comments = raws.len(), "fetched comments");

    let outcome = parse_batch(raws);

    if let Some(path) = cli.export.as_deref() {
        let records = store::to_records(&outcome.comments);
        let written = store::write_jsonl(&records, BufWriter::new(File::create(path)?))?;
        info!(records = written, path = %path.display(), "exported records");
    }

    let threads = if cli.all_threads {
        ThreadFilter::all()
    } else {
        config.threads
    };
    let actionable = filter_actionable(threads.apply(outcome.comments.clone()));
    info!(actionable = actionable.len(), "filtered actionable comments");

    if let Some(root) = cli.apply_fixes.as_deref() {
        let mut applied = 0;
        for (id, result) in fix::apply_all(&actionable, root) {
            match result {
                Ok(_) => applied += 1,
                Err(e) => warn!(id, error = %e, "could not apply suggested fix"),
            }
        }
        info!(applied, root = %root.display(), "applied suggested fixes");
    }

    let built_report = report::build(title, &outcome, actionable);
    report::output(&built_report, cli.output.as_deref())?;
    info!(top_urgency = %built_report.top_urgency, "done");

    Ok(())
}
