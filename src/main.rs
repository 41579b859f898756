use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gh_issues_report::report::{self, DEFAULT_OUTPUT};
use gh_issues_report::{
    cancellation, cancel::cancel_on_ctrl_c, Config, GitHubClient, OutputFormat, PipelineConfig,
    ReportPipeline,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "gh-issues-report")]
#[command(version)]
#[command(about = "Render the open issues of a GitHub repository as an HTML report")]
struct Args {
    /// Display verbose operation tracing during command execution
    #[arg(short, long)]
    verbose: bool,

    /// GitHub repo as owner/name or a full URL (example: droideck/389-ds-base)
    #[arg(short, long)]
    github_repo: Option<String>,

    /// GitHub API key (defaults to GITHUB_TOKEN)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Report file, overwritten on every run
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Output format (html, json)
    #[arg(short, long, default_value = "html")]
    format: String,

    /// Page size for issue and comment listings
    #[arg(long, default_value = "100")]
    per_page: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("gh_issues_report={}", level).parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(verbose);

    builder
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))
}

async fn run(args: Args) -> anyhow::Result<()> {
    tracing::debug!("GitHub Issues Report tool");
    let mut shown = args.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("***".to_string());
    }
    tracing::debug!("Called with: {:?}", shown);

    // Load environment variables
    dotenvy::dotenv().ok();

    let format: OutputFormat = args.format.parse()?;
    let config = Config::resolve(args.github_repo.as_deref(), args.api_key.as_deref())?
        .with_per_page(args.per_page)?
        .with_output(&args.output, format);
    tracing::debug!("GitHub repo: {}", config.repository);

    let github = GitHubClient::with_base_url(&config.github_token, &config.api_url)?;

    let (handle, cancel) = cancellation();
    cancel_on_ctrl_c(handle);

    let pipeline = ReportPipeline::new(github, PipelineConfig::from(&config), cancel);
    let outcome = pipeline.fetch_report(&config.repository).await?;

    if outcome.is_partial() {
        tracing::warn!(
            "Fetch {}, writing report with {} issues gathered so far",
            outcome.status,
            outcome.data.issues.len()
        );
    }

    report::write_report(&outcome.data, &config.output_path, config.format)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;
    tracing::info!("Report written to: {}", config.output_path.display());

    Ok(())
}
