use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use critic_core::CriticConfig;
use critic_review::pipeline::ReviewPipeline;
use critic_review::select::parse_changed_files;

const DEFAULT_CONFIG: &str = ".critic.toml";

#[derive(Parser)]
#[command(
    name = "critic",
    version,
    about = "Post an AI review comment on a pull request for each changed source file",
    long_about = "Post an AI review comment on a pull request for each changed source file.\n\n\
                  Files are filtered by extension, read from the working tree, reviewed one at a\n\
                  time by the configured model, and each review is posted as a PR comment.\n\n\
                  Environment:\n  \
                    GEMINI_API_KEY      API key for the default provider (OPENAI_API_KEY for openai)\n  \
                    GITHUB_TOKEN        Token allowed to comment on pull requests\n  \
                    GITHUB_REPOSITORY   Repository in owner/repo form\n  \
                    PR_NUMBER           Pull request number (optional)\n  \
                    GITHUB_EVENT_PATH   Event payload used when PR_NUMBER is unset (optional)\n  \
                    GITHUB_API_URL      API base for GitHub Enterprise (optional)\n\n\
                  Example:\n  \
                    critic \"$(git diff --name-only origin/main...HEAD)\""
)]
struct Cli {
    /// Whitespace-separated list of changed file paths
    #[arg(default_value = "")]
    changed_files: String,

    /// Path to configuration file (default: .critic.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated extensions to review, overriding the config (e.g. ".py,.ts")
    #[arg(long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Output format for the run summary
    #[arg(long, default_value = "text")]
    format: Format,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Per-file outcomes and a final tally
    Text,
    /// Machine-readable JSON
    Json,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<CriticConfig> {
    let config = match path {
        Some(path) => CriticConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG);
            if default_path.exists() {
                CriticConfig::from_file(default_path)?
            } else {
                CriticConfig::default()
            }
        }
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    if !cli.extensions.is_empty() {
        config.review.extensions = cli.extensions.clone();
    }
    config.validate()?;

    let pipeline = ReviewPipeline::from_config(&config)?;
    let changed = parse_changed_files(&cli.changed_files);
    tracing::info!(files = ?changed, "changed files");

    let report = pipeline.run(&changed).await;

    match cli.format {
        Format::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
        }
        Format::Text => {
            if report.files.is_empty() {
                println!(
                    "No reviewable files among {} changed file(s).",
                    changed.len()
                );
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
