//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bookmuse_profile::UserProfile;
use bookmuse_recommend::pipeline::{ProgressReporter, RunOptions, RunStage};
use bookmuse_shared::{
    BookmuseError, Credentials, RecommendationResult, init_config, load_config,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// bookmuse — turn a taste survey into book recommendations.
#[derive(Parser)]
#[command(
    name = "bookmuse",
    version,
    about = "취향 설문을 바탕으로 책을 추천해 드립니다.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the recommendation pipeline for a survey answers file.
    Recommend {
        /// Path to a TOML file with the survey answers.
        #[arg(short, long)]
        profile: PathBuf,

        /// Maximum items to show per keyword.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Skip the generated per-book justifications.
        #[arg(long)]
        no_justify: bool,
    },

    /// Print the survey questions and answer options.
    Questions,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bookmuse=info",
        1 => "bookmuse=debug",
        _ => "bookmuse=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Recommend {
            profile,
            limit,
            no_justify,
        } => cmd_recommend(&profile, limit, no_justify).await,
        Command::Questions => cmd_questions(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// recommend
// ---------------------------------------------------------------------------

async fn cmd_recommend(profile_path: &PathBuf, limit: Option<usize>, no_justify: bool) -> Result<()> {
    let config = load_config()?;

    let profile_text = std::fs::read_to_string(profile_path)
        .map_err(|e| eyre!("cannot read profile file {}: {e}", profile_path.display()))?;
    let profile: UserProfile = toml::from_str(&profile_text)
        .map_err(|e| eyre!("invalid profile file {}: {e}", profile_path.display()))?;

    let credentials = Credentials::resolve(&config);
    let opts = RunOptions {
        justify: !no_justify,
        limit,
    };

    info!(profile = %profile_path.display(), "starting recommendation");

    let reporter = CliProgress::new();
    let outcome =
        bookmuse_recommend::recommend(&config, &credentials, &profile, &opts, &reporter).await;
    reporter.finish();

    match outcome {
        Ok(result) => {
            render_result(&result);
            Ok(())
        }
        Err(BookmuseError::MalformedResponse { .. }) => {
            println!();
            println!("  추천 생성에 실패했어요. 잠시 후 다시 시도해 주세요.");
            println!();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print one run's result groups.
fn render_result(result: &RecommendationResult) {
    println!();

    if let Some(summary) = &result.profile_summary {
        println!("  독서 성향: {summary}");
        println!();
    }

    if let Some(keyword) = &result.broadened_with {
        println!("  ⓘ 조건에 맞는 결과가 없어 더 넓은 키워드 \"{keyword}\"(으)로 다시 검색했어요.");
        println!();
    }

    if result.is_empty() {
        println!("  조건에 맞는 책을 찾지 못했어요. 답변을 바꿔 다시 시도해 보세요.");
        println!();
        return;
    }

    for group in &result.groups {
        if group.items.is_empty() {
            continue;
        }
        println!("  🔎 {}", group.keyword.text);

        for entry in &group.items {
            let item = &entry.item;
            let year = item
                .publish_year
                .map(|y| format!(" ({y})"))
                .unwrap_or_default();
            println!("    • {} — {}{year}", item.title, item.authors.join(", "));
            if !item.publisher.is_empty() {
                println!("      {}", item.publisher);
            }
            if !item.description.is_empty() {
                println!("      {}", item.description);
            }
            if let Some(justification) = &entry.justification {
                println!("      💬 {justification}");
            }
        }
        println!();
    }
}

// ---------------------------------------------------------------------------
// questions
// ---------------------------------------------------------------------------

fn cmd_questions() -> Result<()> {
    println!();
    println!("  📚 취향 기반 도서 추천 설문");
    println!();

    for section in bookmuse_profile::survey_outline() {
        println!("  {}", section.title);
        println!("    {}", section.prompt);
        for option in &section.options {
            println!("      - {option}");
        }
        if let Some(note) = section.note {
            println!("    ({note})");
        }
        println!();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let rendered = toml::to_string_pretty(&config).map_err(|e| eyre!("render config: {e}"))?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Pipeline progress shown as an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("valid progress template"),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, stage: RunStage) {
        let message = match stage {
            RunStage::Collecting => "설정을 확인하는 중...",
            RunStage::Deriving => "검색 키워드를 만드는 중...",
            RunStage::Querying => "도서 목록을 검색하는 중...",
            RunStage::Filtering => "결과를 거르는 중...",
            RunStage::Presenting => "추천을 정리하는 중...",
        };
        self.spinner.set_message(message);
    }

    fn keyword_queried(&self, keyword: &str, found: usize) {
        self.spinner
            .println(format!("  \"{keyword}\" → {found}권"));
    }
}
