// # ddns-update
//
// One-shot dynamic DNS updater. This binary is a THIN integration layer:
// it parses arguments, sets up logging, builds the selected provider and
// hands over to `ddns_core::Reconciler`. All decision logic lives in
// ddns-core; all provider logic lives in the provider crates.
//
// ## Usage
//
// ```bash
// ddns-update cloudflare home.example.com ops@example.com $CF_API_KEY
// ddns-update gandi home.example.com unused $GANDI_API_KEY --ipurl https://api.ipify.org
// ```
//
// Intended to be driven by an external scheduler (cron, systemd timer).
// A failed run exits non-zero and is simply retried on the next schedule.
//
// ## Output
//
// - stdout: the outcome, followed by the provider's JSON response for
//   create/update
// - stderr: logs (level from `--log-level` or `DDNS_LOG_LEVEL`) and errors

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ddns_core::config::{DEFAULT_IP_URL, DEFAULT_TIMEOUT_SECS};
use ddns_core::{DnsProvider, DnsTarget, Outcome, ProviderConfig, Reconciler, RunConfig};
use ddns_ip_http::HttpIpSource;
use ddns_provider_cloudflare::{CloudflareCredentials, CloudflareProvider};
use ddns_provider_gandi::GandiProvider;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success (record created, updated, or already correct)
/// - 1: Configuration or argument error
/// - 2: Runtime error (network, provider, precondition)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Supported DNS providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderKind {
    Cloudflare,
    Gandi,
}

/// Update a DNS A record in Cloudflare or Gandi to the current public IP
// No Debug derive: the API key must never be printed
#[derive(Parser)]
#[command(name = "ddns-update", version, about, long_about = None)]
struct Args {
    /// Which DNS provider to use
    #[arg(value_enum)]
    provider: ProviderKind,

    /// DNS name to update
    dnsname: String,

    /// Account email, only needed for Cloudflare. Value is not used for Gandi.
    authemail: String,

    /// API key for provider
    authkey: String,

    /// URL to query for current IP address
    #[arg(short = 'i', long = "ipurl", default_value = DEFAULT_IP_URL)]
    ipurl: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Look up the record but do not create or update it
    #[arg(long)]
    dry_run: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Build the run configuration
    fn to_config(&self) -> RunConfig {
        let provider = match self.provider {
            ProviderKind::Cloudflare => ProviderConfig::Cloudflare {
                email: self.authemail.clone(),
                api_key: self.authkey.clone(),
            },
            ProviderKind::Gandi => ProviderConfig::Gandi {
                api_key: self.authkey.clone(),
            },
        };

        RunConfig::new(self.dnsname.clone(), provider)
            .with_ip_url(self.ipurl.clone())
            .with_timeout_secs(self.timeout)
            .with_dry_run(self.dry_run)
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not errors
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::Success.into()
            };
        }
    };

    let log_level = match parse_log_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so stdout only carries the outcome
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = args.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!(
        "Updating {} via {}",
        config.hostname,
        config.provider.type_name()
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run(&config)) {
        Ok(outcome) => {
            print_outcome(&outcome);
            DdnsExitCode::Success.into()
        }
        Err(e) => {
            error!("Update failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            DdnsExitCode::RuntimeError.into()
        }
    }
}

/// Run one reconciliation
async fn run(config: &RunConfig) -> Result<Outcome> {
    let target = DnsTarget::parse(&config.hostname)?;
    let provider = build_provider(config, target).await?;
    let ip_source = HttpIpSource::new(config.ip_url.clone(), config.timeout())?;

    let mut reconciler =
        Reconciler::new(Box::new(ip_source), provider).dry_run(config.dry_run);

    reconciler
        .run()
        .await
        .with_context(|| format!("Failed to update {}", config.hostname))
}

/// Construct the configured provider
///
/// Cloudflare resolves its zone ID here, before the IP is looked up.
async fn build_provider(config: &RunConfig, target: DnsTarget) -> Result<Box<dyn DnsProvider>> {
    let provider: Box<dyn DnsProvider> = match &config.provider {
        ProviderConfig::Cloudflare { email, api_key } => {
            let credentials = CloudflareCredentials::new(email.clone(), api_key.clone());
            let provider = CloudflareProvider::connect(target, credentials, config.timeout())
                .await
                .context("Failed to resolve Cloudflare zone")?;
            Box::new(provider)
        }
        ProviderConfig::Gandi { api_key } => Box::new(GandiProvider::new(
            target,
            api_key.clone(),
            config.timeout(),
        )?),
    };
    Ok(provider)
}

fn print_outcome(outcome: &Outcome) {
    println!("{}", outcome);
    if let Some(response) = outcome.response() {
        match serde_json::to_string_pretty(response) {
            Ok(text) => println!("{}", text),
            Err(_) => println!("{}", response),
        }
    }
}
