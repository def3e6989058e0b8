//! ai-crawler CLI - Snapshot source trees into markdown bundles.

use std::path::PathBuf;

use ai_crawler::builder::{run, CrawlReport};
use ai_crawler::config::Config;
use ai_crawler::errors::{exit_code, CrawlError};
use ai_crawler::format::{DEFAULT_LANGUAGE, LANGUAGE_TABLE};
use ai_crawler::output::DEFAULT_MAX_BUNDLE_BYTES;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ai-crawler")]
#[command(about = "Snapshot source trees into size-bounded markdown bundles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle source directories and record change fingerprints
    Crawl {
        /// Comma-separated source directories
        #[arg(long, env = "AI_CRAWLER_DIRECTORY")]
        directory: Option<String>,

        /// Directory receiving bundles and tracking files
        #[arg(long, env = "AI_CRAWLER_OUTPUT_DIRECTORY")]
        output_directory: Option<String>,

        /// Root that relative directories are resolved against
        #[arg(long, default_value = ".")]
        workspace_root: PathBuf,

        /// Maximum bundle size in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_BUNDLE_BYTES)]
        max_bundle_bytes: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the extension to language label table
    Languages {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Crawl {
            directory,
            output_directory,
            workspace_root,
            max_bundle_bytes,
            json,
        } => run_crawl(
            directory.unwrap_or_default(),
            output_directory.unwrap_or_default(),
            workspace_root,
            max_bundle_bytes,
            json,
        ),
        Commands::Languages { json } => run_languages(json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "ai-crawler", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("Error crawling directory: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

/// Log to stderr so stdout stays parseable; `RUST_LOG` overrides the level.
fn init_logging() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Crawl { json, .. } => *json,
        Commands::Languages { json } => *json,
        Commands::Completions { .. } => false,
    }
}

// --- Crawl command ---

fn run_crawl(
    directory: String,
    output_directory: String,
    workspace_root: PathBuf,
    max_bundle_bytes: usize,
    json: bool,
) -> Result<(), CrawlError> {
    let config = Config::from_settings(&workspace_root, &directory, &output_directory)?
        .max_bundle_bytes(max_bundle_bytes);

    let report = run(&config)?;

    if json {
        print_json(&report)?;
    } else {
        println!(
            "Successfully crawled directory and generated {} markdown file(s)",
            report.bundle_count
        );
    }

    Ok(())
}

fn print_json(report: &CrawlReport) -> Result<(), CrawlError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| CrawlError::Io(std::io::Error::other(e.to_string())))?;
    println!("{json}");
    Ok(())
}

// --- Languages command ---

#[derive(Serialize)]
struct LanguageInfo {
    name: String,
    extensions: Vec<String>,
}

fn run_languages(json: bool) -> Result<(), CrawlError> {
    let mut languages: Vec<LanguageInfo> = Vec::new();
    for (ext, label) in LANGUAGE_TABLE {
        let ext = format!(".{}", ext);
        match languages.iter_mut().find(|l| l.name == *label) {
            Some(lang) => lang.extensions.push(ext),
            None => languages.push(LanguageInfo {
                name: label.to_string(),
                extensions: vec![ext],
            }),
        }
    }

    if json {
        #[derive(Serialize)]
        struct Output {
            languages: Vec<LanguageInfo>,
            default: &'static str,
        }
        let output = Output {
            languages,
            default: DEFAULT_LANGUAGE,
        };
        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| CrawlError::Io(std::io::Error::other(e.to_string())))?;
        println!("{json}");
    } else {
        println!("Language labels:");
        for lang in &languages {
            println!("  {:12} {}", lang.name, lang.extensions.join(", "));
        }
        println!("  {:12} (anything else)", DEFAULT_LANGUAGE);
    }

    Ok(())
}
