// Tue Jan 17 2026 - Alex

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use layout_crosscheck::{
    config::MatchConfig,
    crosscheck,
    output::{JsonSerializer, ReportFormat, ReportGenerator, StatusSummary},
    utils::{logging, pluralize},
    CrossCheck, DiagnosticLevel, MatchStatus, SourceFile,
};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version)]
#[command(about = "Cross-checks shader struct layouts against host-side structs", long_about = None)]
struct Args {
    /// Preprocessed shader sources
    #[arg(short, long, num_args = 1.., required = true)]
    shader: Vec<PathBuf>,

    /// Host header sources
    #[arg(long, num_args = 1.., required = true)]
    host: Vec<PathBuf>,

    /// JSON file overriding the matching thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    json: Option<PathBuf>,

    #[arg(long)]
    text_output: Option<PathBuf>,

    #[arg(long)]
    markdown_output: Option<PathBuf>,

    /// Only report structs that found a host counterpart
    #[arg(long)]
    only_matched: bool,

    /// Show the best rejected candidate of unmatched structs
    #[arg(long)]
    show_top_candidate: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// error, warn, info, debug, trace or off; overrides -v
    #[arg(short, long)]
    log_level: Option<String>,

    #[arg(long)]
    no_color: bool,
}

fn main() {
    let args = Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }
    logging::init_logger(args.log_level.as_deref(), args.verbose, !args.no_color);

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let config = match &args.config {
        Some(path) => {
            let config = MatchConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?;
            println!("{} Loaded config: {}", "[+]".green(), path.display());
            config
        }
        None => MatchConfig::default(),
    };

    let shader_sources = read_sources(&args.shader, "shader")?;
    let host_sources = read_sources(&args.host, "host")?;

    println!("{} Matching shader structs against host structs...", "[*]".blue());
    let result = crosscheck(&shader_sources, &host_sources, &config);

    println!(
        "{} Parsed {} and {}",
        "[+]".green(),
        pluralize(result.shader.len(), "shader struct", "shader structs"),
        pluralize(result.host.len(), "host struct", "host structs")
    );
    if result.shader.is_empty() {
        bail!("No shader structs found in {}", pluralize(args.shader.len(), "file", "files"));
    }

    print_results_summary(&result, &config, args.only_matched);

    if let Some(path) = &args.json {
        JsonSerializer::new()
            .with_status_config(config.status.clone())
            .serialize_to_file(&result.pass, &result.usages, path)
            .with_context(|| format!("Failed to save results to {}", path.display()))?;
        println!("{} Results saved to: {}", "[+]".green(), path.display());
    }

    for (path, format) in [
        (&args.text_output, ReportFormat::Text),
        (&args.markdown_output, ReportFormat::Markdown),
    ] {
        if let Some(path) = path {
            ReportGenerator::new(format)
                .with_only_matched(args.only_matched)
                .with_top_candidate(args.show_top_candidate)
                .with_status_config(config.status.clone())
                .generate_to_file(&result.pass, &result.usages, path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            println!("{} Report saved to: {}", "[+]".green(), path.display());
        }
    }

    let warnings = result.pass.diagnostics.count(DiagnosticLevel::Warn);
    if warnings > 0 {
        println!("{} {}", "[!]".yellow(), pluralize(warnings, "warning", "warnings"));
    }

    println!();
    println!("{} Cross-check complete in {:.2}s", "[+]".green(), start_time.elapsed().as_secs_f64());
    Ok(())
}

fn read_sources(paths: &[PathBuf], kind: &str) -> Result<Vec<SourceFile>> {
    paths
        .iter()
        .map(|path: &PathBuf| {
            println!("{} Reading {} source: {}", "[*]".blue(), kind, path.display());
            read_source(path)
        })
        .collect()
}

fn read_source(path: &Path) -> Result<SourceFile> {
    SourceFile::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_results_summary(result: &CrossCheck, config: &MatchConfig, only_matched: bool) {
    println!();
    println!("{}", "Results Summary".cyan().bold());
    println!("{}", "-".repeat(40).cyan());

    let summary = StatusSummary::from_matches(&result.pass.matches, &config.status);
    println!("  Matched: {}", summary.matched.to_string().green());
    println!("  Mismatched: {}", summary.mismatched.to_string().yellow());
    println!("  Unmatched: {}", summary.unmatched.to_string().red());
    println!();

    for m in &result.pass.matches {
        let status = m.status(&config.status);
        let label = match &status {
            MatchStatus::Matched => status.to_string().green(),
            MatchStatus::Mismatched(_) => status.to_string().yellow(),
            MatchStatus::Unmatched => {
                if only_matched {
                    continue;
                }
                status.to_string().red()
            }
        };
        let host = m
            .host_name()
            .map(|h| format!(" -> {} ({:.3})", h, m.score()))
            .unwrap_or_default();
        println!("  {} {}{} [{}]", m.shader_name.cyan(), label, host, m.shader_location);
    }
    println!();
}
