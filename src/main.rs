//! etcd Storage Provisioner
//!
//! Ensures the data storage class for a provisioner exists, then creates the
//! data PVC for one etcd member and waits for it to bind.

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use etcd_storage_provisioner::{
    ClaimProvisioner, ProvisionerConfig, Result, StorageClassEnsurer, StoreFactory,
    VolumeClaimRequest,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Provision the data volume for one etcd cluster member
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// etcd cluster name
    #[arg(long, env = "ETCD_CLUSTER")]
    cluster: String,

    /// Member identifier within the cluster
    #[arg(long, env = "ETCD_MEMBER_ID")]
    member_id: u64,

    /// Namespace for the data PVC
    #[arg(long, env = "NAMESPACE", default_value = "default")]
    namespace: String,

    /// Volume provisioner (e.g. kubernetes.io/gce-pd)
    #[arg(long, env = "PV_PROVISIONER", default_value = "kubernetes.io/gce-pd")]
    provisioner: String,

    /// Requested volume size in MiB
    #[arg(long, env = "VOLUME_SIZE_MIB", default_value = "512")]
    size_mib: i64,

    /// YAML config file
    #[arg(long, env = "PROVISIONER_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds between bind checks (overrides config)
    #[arg(long, env = "POLL_INTERVAL_SECS")]
    poll_interval_secs: Option<u64>,

    /// Maximum bind checks (overrides config)
    #[arg(long, env = "POLL_ATTEMPTS")]
    poll_attempts: Option<u32>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Run against an in-memory store (no Kubernetes)
    #[arg(long, env = "STANDALONE")]
    standalone: bool,

    /// Checks before the in-memory store binds a claim
    #[arg(long, env = "STANDALONE_BIND_AFTER", default_value = "2")]
    standalone_bind_after: u32,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = load_config(&args)?;

    info!("Starting etcd storage provisioner");
    info!("  Version: {}", etcd_storage_provisioner::VERSION);
    info!("  Cluster: {} member {}", args.cluster, args.member_id);
    info!("  Provisioner: {}", args.provisioner);
    info!(
        "  Bind budget: {} checks every {:?}",
        config.retry.max_attempts,
        config.retry.interval()
    );
    info!("  Standalone mode: {}", args.standalone);

    let store = StoreFactory::create(args.standalone, args.standalone_bind_after).await?;

    let ensurer = StorageClassEnsurer::new(store.clone(), &config);
    let class = ensurer
        .ensure_storage_class_idempotent(&args.provisioner)
        .await
        .inspect_err(|e| error!("Failed to create storage class: {}", e))?;
    info!("Storage class ready: {}", class.name);

    let provisioner = ClaimProvisioner::new(store, config);
    let request = VolumeClaimRequest {
        cluster_id: args.cluster.clone(),
        member_id: args.member_id,
        namespace: args.namespace.clone(),
        provisioner_id: args.provisioner.clone(),
        size_mib: args.size_mib,
    };

    let outcome = provisioner
        .provision_claim(&request)
        .await
        .inspect_err(|e| error!("Failed to provision data PVC: {}", e))?;

    println!("{}", serde_json::to_string(&outcome)?);
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

fn load_config(args: &Args) -> Result<ProvisionerConfig> {
    let mut config = match &args.config {
        Some(path) => ProvisionerConfig::load(path)?,
        None => ProvisionerConfig::default(),
    };

    if let Some(secs) = args.poll_interval_secs {
        config.retry.interval_millis = secs.saturating_mul(1_000);
    }
    if let Some(attempts) = args.poll_attempts {
        config.retry.max_attempts = attempts;
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("kube=info".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
