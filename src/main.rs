use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use llamainsight::{
    api::InsightService,
    charts::{ChartData, DEFAULT_TOP_CONTRIBUTORS},
    error::Result,
    extractors::UploadedDocument,
    logging, server, AnalysisResult, Config, RepositoryMetadata,
};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Width of the longest bar in terminal charts
const BAR_WIDTH: usize = 40;

#[derive(Parser)]
#[command(author, version, about = "AI summaries of GitHub repositories and documents", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a GitHub repository
    Repo {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,
    },
    /// Analyze a PDF, Markdown or plain text file
    File {
        /// Path to the file
        path: PathBuf,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Repo { url } => {
            config.validate()?;
            let service = InsightService::new(config)?;
            let spinner = spinner(format!("Analyzing {}", url));
            let result = service.analyze_repository(&url).await;
            spinner.finish_and_clear();
            let response = result?;
            print_repository(&response.repo_data);
            print_analysis(&response.analysis);
        }
        Command::File { path } => {
            config.validate()?;
            let bytes = tokio::fs::read(&path).await?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let document = UploadedDocument::new(bytes, "", filename);

            let service = InsightService::new(config)?;
            let spinner = spinner(format!("Analyzing {}", path.display()));
            let result = service.analyze_file(&document).await;
            spinner.finish_and_clear();
            let response = result?;
            println!(
                "{} {}",
                "Text extracted with:".bright_white().bold(),
                response.extraction_method.label().cyan()
            );
            print_analysis(&response.analysis);
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            println!("{} http://{}", "Starting server on".bright_green(), config.server.bind);
            server::run_server(config).await?;
        }
    }
    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["-", "\\", "|", "/", "-", "\\", "|", "/"]),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn bar(value: u64, max: u64) -> String {
    let len = if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * BAR_WIDTH as f64).round() as usize
    };
    "█".repeat(len.max(if value > 0 { 1 } else { 0 }))
}

fn print_repository(meta: &RepositoryMetadata) {
    println!("\n{}", meta.name.bright_green().bold());
    if !meta.description.is_empty() {
        println!("{}", meta.description);
    }
    println!(
        "{} {}   {} {}",
        "Language:".bright_white().bold(),
        meta.language,
        "Topics:".bright_white().bold(),
        if meta.topics.is_empty() { "none".to_string() } else { meta.topics.join(", ") }
    );
    if let (Some(created), Some(updated)) = (meta.created_at, meta.updated_at) {
        println!(
            "{} {}   {} {}",
            "Created:".bright_white().bold(),
            created.format("%Y-%m-%d"),
            "Updated:".bright_white().bold(),
            updated.format("%Y-%m-%d")
        );
    }

    let chart = ChartData::from_metadata(meta, DEFAULT_TOP_CONTRIBUTORS);

    println!("\n{}", "Popularity".bright_yellow().bold());
    let max = chart.popularity.stars.max(chart.popularity.forks);
    println!("  {:<8} {} {}", "stars", bar(chart.popularity.stars, max).yellow(), chart.popularity.stars);
    println!("  {:<8} {} {}", "forks", bar(chart.popularity.forks, max).blue(), chart.popularity.forks);

    if !chart.top_contributors.is_empty() {
        println!("\n{}", "Top contributors".bright_yellow().bold());
        let max = chart.max_contributions();
        for c in &chart.top_contributors {
            println!("  {:<20} {} {}", c.login, bar(c.contributions, max).green(), c.contributions);
        }
    }

    if !chart.languages.is_empty() {
        println!("\n{}", "Languages".bright_yellow().bold());
        for lang in &chart.languages {
            let len = (lang.percent / 100.0 * BAR_WIDTH as f64).round() as usize;
            println!("  {:<20} {} {:.1}%", lang.name, "█".repeat(len).magenta(), lang.percent);
        }
    }
}

fn print_analysis(analysis: &AnalysisResult) {
    println!("\n{}", "Summary".bright_cyan().bold());
    println!("{}", analysis.summary);

    print_list("Features", &analysis.features);
    print_list("Technologies", &analysis.technologies);
    print_list("Use cases", &analysis.use_cases);

    println!("\n{}", "Insights".bright_cyan().bold());
    println!("{}", analysis.insights);
}

fn print_list(title: &str, items: &[String]) {
    println!("\n{}", title.bright_cyan().bold());
    for item in items {
        println!("  {} {}", "•".bright_green(), item);
    }
}
