use anyhow::{Context, Result};
use clap::Parser;
use installdata_lib::config::SUPPORTED_DOCUMENT_VERSION;
use installdata_lib::{CheckOptions, CoverageMode, ProbeConfig, ReachabilityChecker, ValidationReport};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Validate a 07th-Mod installData.json listing")]
struct Args {
    /// Path to the installData.json to validate
    path: PathBuf,

    /// How files with a null url are checked for override coverage (any, symmetric)
    #[arg(long, default_value = "symmetric")]
    coverage: CoverageMode,

    /// Skip probing urls over the network
    #[arg(long, alias = "skip-network")]
    offline: bool,

    /// Attempts per url before a timeout is reported
    #[arg(long)]
    attempts: Option<u32>,

    /// Concurrent connections allowed per host
    #[arg(long)]
    per_host: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the decoded document as JSON
    #[arg(long)]
    print_document: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::default();
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }
        if let Some(per_host) = self.per_host {
            config.max_connections_per_host = per_host;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = Duration::from_secs(timeout);
        }
        config
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let source = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.path.display().to_string());

    let options = CheckOptions {
        coverage: args.coverage,
    };
    let mut report = ValidationReport::run(&source, &bytes, &options);

    if let Some(document) = &report.document {
        if !document.is_supported() {
            log::warn!(
                "{} declares version {}, newer than the supported version {}",
                source,
                document.version,
                SUPPORTED_DOCUMENT_VERSION
            );
        }
        if args.print_document {
            let json = serde_json::to_string_pretty(document)
                .context("Failed to encode the decoded document")?;
            println!("{}", json);
        }
    }

    if args.offline {
        log::info!("Skipping reachability check");
    } else {
        let checker = ReachabilityChecker::new(args.probe_config())?;
        report.probe(&checker).await;
    }

    for line in report.lines() {
        println!("{}", line);
    }
    println!("{}", report.summary());

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
