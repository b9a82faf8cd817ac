// Demo entrypoint: concurrent callers against a refresh-ahead cache.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use refreshcache::cache::{self, telemetry, BoxError, Cache};
use refreshcache::config::{Config, ConfigTrait, Demo, DEFAULT_TELEMETRY_INTERVAL};

const CONFIG_PATH: &str = "cfg/refreshcache.cfg.yaml";
const CONFIG_PATH_LOCAL: &str = "cfg/refreshcache.cfg.local.yaml";

const DEFAULT_CALLERS: usize = 4;
const DEFAULT_VALUE: i64 = 42;
const DEFAULT_LOADER_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_RUN_FOR: Duration = Duration::from_secs(10);

/// refreshcache - self-refreshing, load-once cache demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE")]
    cfg: Option<PathBuf>,
}

/// Loads the configuration struct from YAML file.
/// Tries local config first, then falls back to default config.
fn load_cfg(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    if let Some(custom_path) = path {
        let cfg = Config::load(&custom_path)
            .with_context(|| format!("failed to load custom config from {:?}", custom_path))?;
        return Ok((cfg, custom_path));
    }

    match Config::load(CONFIG_PATH_LOCAL) {
        Ok(cfg) => Ok((cfg, PathBuf::from(CONFIG_PATH_LOCAL))),
        Err(_) => {
            let cfg = Config::load(CONFIG_PATH)
                .with_context(|| format!("failed to load config from {}", CONFIG_PATH))?;
            Ok((cfg, PathBuf::from(CONFIG_PATH)))
        }
    }
}

/// Configures structured logging based on configuration.
fn configure_logger(cfg: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let log_level = cfg
        .logs()
        .and_then(|logs| logs.level.as_deref())
        .unwrap_or("debug");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if cfg.is_prod() {
        // Production: JSON format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Development: Pretty console format
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

/// Builds the tokio runtime with the configured number of worker threads.
fn build_runtime(cfg: &Config) -> Result<tokio::runtime::Runtime> {
    let configured = cfg.runtime().num_cpus;
    let cores = if configured == 0 {
        num_cpus::get()
    } else {
        configured
    };
    info!(
        component = "main",
        event = "num_cpus_configured",
        num_cpus = cores,
        auto = configured == 0,
        "worker threads configured"
    );

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(cores)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let (cfg, path) = load_cfg(args.cfg)?;
    configure_logger(&cfg);
    info!(
        component = "config",
        event = "load_success",
        path = ?path,
        "config loaded"
    );

    build_runtime(&cfg)?.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let demo = cfg.demo().cloned().unwrap_or_else(|| Demo {
        keys: vec!["foo".to_string()],
        callers: None,
        value: None,
        loader_delay: None,
        run_for: None,
    });
    let delay = demo.loader_delay.unwrap_or(DEFAULT_LOADER_DELAY);
    let value = demo.value.unwrap_or(DEFAULT_VALUE);

    let loader = cache::from_fn(move |key: String| async move {
        info!(component = "demo", event = "fetching", key = %key, "fetching value for key");
        tokio::time::sleep(delay).await;
        Ok::<_, BoxError>(value)
    });
    let cache: Cache<String, i64> = Cache::from_config(loader, &cfg)?;

    if let Some(t) = cfg.telemetry().filter(|t| t.enabled) {
        let each = t.interval.unwrap_or(DEFAULT_TELEMETRY_INTERVAL);
        tokio::task::spawn(telemetry::logger(shutdown_token.clone(), cache.clone(), each));
    }

    let mut callers = JoinSet::new();
    for key in &demo.keys {
        for caller in 0..demo.callers.unwrap_or(DEFAULT_CALLERS) {
            let cache = cache.clone();
            let key = key.clone();
            callers.spawn(async move {
                match cache.get(&key).await {
                    Ok(v) => info!(component = "demo", caller, key = %key, value = v, "fetched"),
                    Err(e) => error!(component = "demo", caller, key = %key, error = %e, "fetch failed"),
                }
            });
        }
    }

    tokio::select! {
        _ = signal::ctrl_c() => {
            warn!(component = "main", event = "os_signal", signal = "SIGINT", "stopping");
        }
        _ = tokio::time::sleep(demo.run_for.unwrap_or(DEFAULT_RUN_FOR)) => {
            info!(component = "main", event = "run_for_elapsed", "stopping");
        }
    }

    shutdown_token.cancel();
    cache.close();
    callers.abort_all();

    let stats = cache.stats();
    info!(
        component = "main",
        event = "stopped",
        length = stats.length,
        hits = stats.hits,
        misses = stats.misses,
        loads = stats.loads,
        shared_loads = stats.shared_loads,
        refreshes = stats.refreshes,
        refresh_errors = stats.refresh_errors,
        "cache demo finished"
    );

    Ok(())
}
