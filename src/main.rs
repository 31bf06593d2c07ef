//! VK Doc Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use vk_doc_downloader::{
    cli::{build_targets, read_target_file, Args, TargetLine},
    config::{validate_config, Config},
    download::{run_batch, BatchStats, Fetcher, PermitPool},
    error::{exit_codes, Error, Result},
    fs::ensure_dir,
    output::{
        create_item_bar, print_banner, print_batch_stats, print_config_summary, print_error,
        print_info, print_success, print_warning, write_report,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(stats) if stats.has_errors() => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
        Ok(_) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::Regex(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<BatchStats> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    if !args.quiet {
        print_banner();
    }

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        if !args.quiet {
            print_info(&format!(
                "No configuration file at {}, using defaults",
                args.config.display()
            ));
        }
        Config::default()
    };

    args.merge_into_config(&mut config)?;
    validate_config(&config)?;

    // Collect targets
    let mut lines: Vec<TargetLine> = args
        .urls
        .iter()
        .map(|url| TargetLine {
            url: url.clone(),
            file_name: None,
        })
        .collect();
    if let Some(input) = &args.input {
        lines.extend(read_target_file(input)?);
    }

    if lines.is_empty() {
        return Err(Error::MissingConfig(
            "targets (pass URLs or --input <file>)".to_string(),
        ));
    }

    let save_path = config.download_directory();
    ensure_dir(&save_path).await?;
    let targets = build_targets(lines, &save_path, &config.cookies);

    if !args.quiet {
        print_config_summary(
            targets.len(),
            config.options.concurrency,
            &save_path.display().to_string(),
        );
    }

    // Run the batch
    let fetcher = Fetcher::from_config(&config)?;
    let pool = PermitPool::new(config.options.concurrency);
    let progress = create_item_bar(targets.len() as u64, "Downloading", args.quiet);

    let results = run_batch(&fetcher, &targets, &pool, &progress).await;
    let stats = BatchStats::from_results(&results);

    if let Some(report) = &args.report {
        write_report(report, &results)?;
        if !args.quiet {
            print_info(&format!("Report written to {}", report.display()));
        }
    }

    if !args.quiet {
        print_batch_stats(&stats);
        if stats.has_errors() {
            print_warning(&format!("{} target(s) failed", stats.error_count));
        } else {
            print_success("All targets processed");
        }
    }

    Ok(stats)
}
