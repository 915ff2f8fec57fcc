// # ddns-update - one-shot subdomain updater
//
// This binary is a THIN integration layer:
// - DO NOT add DNS logic or retry logic here
// - All reconciliation logic lives in ddns-core
// - Credentials come from the config file or environment, never from flags
//
// The binary is responsible for:
// 1. Parsing flags and loading configuration
// 2. Initializing logging and the runtime
// 3. Building the provider through the registry
// 4. Discovering the public address when none is given
// 5. Running one reconciliation and mapping its outcome to an exit code
//
// ## Configuration
//
// See `ddns_core::config` for the environment variables. Additionally:
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_DNSIMPLE_API_TOKEN=your_token
// export DDNS_DNSIMPLE_ACCOUNT_ID=1010
//
// ddns-update --domain example.com --subdomain home --ttl 600
// ddns-update --domain example.com --subdomain home --ip 2001:db8::7 --dry-run
// ```

use anyhow::{Context, Result};
use clap::Parser;
use ddns_core::traits::{IpSource, IpVersion};
use ddns_core::{DdnsConfig, ErrorKind, ProviderConfig, Reconciled, Reconciler, UpdateRequest};
use ddns_ip_http::HttpIpSource;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes, one per outcome a caller may want to script against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Record now points at the address
    Updated = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Invalid domain, subdomain or address
    ValidationError = 2,
    /// Existing record could not be retrieved
    LookupError = 3,
    /// Record already points at the address
    NoChangeNeeded = 4,
    /// Provider rejected or failed the update
    UpdateError = 5,
    /// Public address could not be discovered
    IpSourceError = 6,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<ErrorKind> for DdnsExitCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => DdnsExitCode::ValidationError,
            ErrorKind::Lookup => DdnsExitCode::LookupError,
            ErrorKind::NoChangeNeeded => DdnsExitCode::NoChangeNeeded,
            ErrorKind::Update => DdnsExitCode::UpdateError,
            ErrorKind::Config => DdnsExitCode::ConfigError,
            ErrorKind::IpSource => DdnsExitCode::IpSourceError,
        }
    }
}

/// Point a subdomain's A/AAAA record at the current address
#[derive(Debug, Parser)]
#[command(name = "ddns-update", version, about)]
struct Args {
    /// Zone the record lives in (e.g. example.com)
    #[arg(long)]
    domain: String,

    /// Record label within the zone (e.g. home)
    #[arg(long)]
    subdomain: String,

    /// TTL in seconds, used when validating the request
    #[arg(long, default_value_t = 3600)]
    ttl: u32,

    /// Address to publish; discovered over HTTP when omitted
    #[arg(long)]
    ip: Option<String>,

    /// JSON configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Look up the record but do not write it
    #[arg(long)]
    dry_run: bool,

    /// Upper bound for each provider call, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Only discover an IPv4 address
    #[arg(long, conflicts_with = "ipv6")]
    ipv4: bool,

    /// Only discover an IPv6 address
    #[arg(long)]
    ipv6: bool,
}

impl Args {
    /// Apply flag overrides on top of file and environment configuration
    fn apply_to(&self, config: &mut DdnsConfig) {
        if self.dry_run {
            match &mut config.provider {
                ProviderConfig::Dnsimple { dry_run, .. } => *dry_run = true,
                ProviderConfig::Memory { .. } => {}
            }
        }
        if let Some(secs) = self.timeout {
            config.reconciler.timeout_secs = Some(secs);
        }
        if self.ipv4 {
            config.ip_source.version = Some(IpVersion::V4);
        } else if self.ipv6 {
            config.ip_source.version = Some(IpVersion::V6);
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let level_name = args
        .log_level
        .clone()
        .or_else(|| std::env::var("DDNS_LOG_LEVEL").ok())
        .unwrap_or_else(|| "info".to_string());
    let Some(log_level) = parse_level(&level_name) else {
        eprintln!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level_name
        );
        return DdnsExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Load configuration: file, then environment, then flags
    let mut config = match DdnsConfig::load(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let code = match rt.block_on(run(&args, &config)) {
        Ok(outcome) => {
            info!(
                "Updated {}.{} ({}): {} -> {} [record {}]",
                args.subdomain,
                args.domain,
                outcome.change.record_type,
                outcome.previous_address,
                outcome.change.value,
                outcome.record_id
            );
            println!("{}", outcome.record_id);
            DdnsExitCode::Updated
        }
        Err(e) => exit_code_for(&e),
    };

    code.into()
}

/// Map a failed run to its exit code, logging it at the right level
fn exit_code_for(err: &anyhow::Error) -> DdnsExitCode {
    match err.downcast_ref::<ddns_core::Error>() {
        Some(core) if core.is_no_change() => {
            info!("{}", core);
            DdnsExitCode::NoChangeNeeded
        }
        Some(core) => {
            error!("{:#}", err);
            core.kind().into()
        }
        None => {
            error!("{:#}", err);
            DdnsExitCode::ConfigError
        }
    }
}

/// Run one reconciliation
async fn run(args: &Args, config: &DdnsConfig) -> Result<Reconciled> {
    // Names are checked before address discovery touches the network.
    UpdateRequest::check_names(&args.domain, &args.subdomain)?;

    let registry = ddns_core::ProviderRegistry::with_builtin();
    ddns_provider_dnsimple::register(&registry);

    let provider = registry
        .create_provider(&config.provider)
        .context("Failed to create DNS provider")?;
    info!(
        "Using provider '{}' for {}.{}",
        provider.provider_name(),
        args.subdomain,
        args.domain
    );

    let address = match &args.ip {
        Some(ip) => ip.clone(),
        None => {
            let source = HttpIpSource::from_config(&config.ip_source);
            info!("No --ip given, asking {}", source.url());
            source
                .current()
                .await
                .context("Failed to discover public address")?
                .to_string()
        }
    };

    if config.reconciler.timeout().is_none() {
        warn!("No reconciler timeout set, relying on the provider's HTTP timeout");
    }

    let request = UpdateRequest::parse(&args.domain, &args.subdomain, args.ttl, &address)?;
    let reconciler = Reconciler::from_config(provider, &config.reconciler);
    Ok(reconciler.apply(&request).await?)
}
