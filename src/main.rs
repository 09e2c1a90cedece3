//! siteaudit CLI Entry Point
//!
//! SEO compliance and spam-policy risk auditor

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use siteaudit::audit::{AuditEngine, ProgressCallback};
use siteaudit::cli::Args;
use siteaudit::config::load_audit_config;
use siteaudit::error::AuditError;
use siteaudit::{AuditRunResult, Severity, Verdict};

/// Exit codes: 0 = gates passed, 1 = gate(s) failed, 2 = audit error.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args);

    match run(args).await {
        Ok(result) if result.all_gates_passed() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// Setup tracing/logging based on CLI flags
fn setup_logging(args: &Args) {
    let level = if args.quiet {
        Level::ERROR
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Main application logic
async fn run(args: Args) -> siteaudit::Result<AuditRunResult> {
    if let Err(e) = args.validate() {
        return Err(AuditError::ConfigError(e));
    }

    if !args.quiet {
        print_banner();
    }

    let site_id = args
        .effective_site_id()
        .ok_or_else(|| AuditError::ConfigError("Cannot determine site ID".to_string()))?;

    let config = load_audit_config(&site_id, &args.config_dir, Some(args.config_overrides()))?;

    if !args.quiet {
        println!(
            "{} {} ({} mode)",
            "Auditing:".cyan().bold(),
            config.base_url,
            args.mode
        );
    }

    let engine = AuditEngine::new(config, args.mode.to_string())?;

    let progress_bar = if !args.quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let engine = if let Some(pb) = progress_bar.clone() {
        let callback: ProgressCallback = Arc::new(move |processed, total, url| {
            pb.set_length(total as u64);
            pb.set_position(processed as u64);
            pb.set_message(truncate_url(url, 50));
        });
        engine.with_progress(callback)
    } else {
        engine
    };

    let result = if args.is_resume() {
        engine.resume(args.resume.as_deref()).await?
    } else {
        engine.run().await?
    };

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Complete");
    }

    if !args.quiet {
        print_summary(&result);
    }

    Ok(result)
}

/// Print the structured terminal summary after completion.
fn print_summary(result: &AuditRunResult) {
    println!();
    println!("{} Audit Results", "═══".cyan());
    println!();
    println!("  {} {}", "Run:".bold(), result.run_id);
    println!("  {} {}ms", "Duration:".bold(), result.duration_ms());
    println!("  {} {}", "URLs:".bold(), result.total_urls);
    println!(
        "  {} {} P0, {} P1, {} P2",
        "Issues:".bold(),
        result.severity_count(Severity::P0).to_string().red(),
        result.severity_count(Severity::P1).to_string().yellow(),
        result.severity_count(Severity::P2)
    );

    let verdict = match result.verdict() {
        Verdict::Pass => "PASS".green().bold(),
        Verdict::Warn => "WARN".yellow().bold(),
        Verdict::Fail => "FAIL".red().bold(),
    };
    println!("  {} {}", "Verdict:".bold(), verdict);
    println!();

    println!("{}", "─".repeat(72));
    println!(
        "{:<30} {:>10} {:>8} {:>10} {:>8}",
        "Gate".bold(),
        "Category".bold(),
        "P0".bold(),
        "Total".bold(),
        "Result".bold()
    );
    println!("{}", "─".repeat(72));
    for gate in &result.gate_results {
        let outcome = if gate.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!(
            "{:<30} {:>10} {:>8} {:>10} {:>8}",
            gate.name,
            gate.category.to_string(),
            gate.p0_count,
            gate.total_count,
            outcome
        );
    }
    println!("{}", "─".repeat(72));
}

/// Truncate URL for display
fn truncate_url(url: &str, max_len: usize) -> String {
    if url.len() <= max_len {
        url.to_string()
    } else {
        format!("{}...", &url[..max_len - 3])
    }
}

/// Print application banner
fn print_banner() {
    println!();
    println!(
        "  {} v{} - SEO compliance auditor",
        "siteaudit".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();
}
