//! buildstamp-inject library
//!
//! Command-line front end a native build orchestrator shells out to. The
//! orchestrator either captures the printed flag, or hands over a build
//! environment file that gets the flag appended in place.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buildstamp_common::build_info::{BuildInfo, BuildStamp};
use buildstamp_common::config::StampConfig;
use buildstamp_common::time::Clock;
use buildstamp_common::{BuildEnvironment, Injector};
use clap::{Parser, Subcommand};
use tracing::{info, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Command-line arguments for buildstamp-inject
#[derive(Parser, Debug)]
#[command(name = "buildstamp-inject")]
#[command(about = "Inject a UTC build timestamp define into a native build")]
#[command(version)]
pub struct Args {
    /// Config file (defaults to <config_dir>/buildstamp/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Define name, overriding the config file
    #[arg(short, long)]
    pub define: Option<String>,

    /// strftime pattern, overriding the config file
    #[arg(short, long)]
    pub format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the define flag for the current time
    Flag,

    /// Append the define flag to a build environment file
    Inject {
        /// TOML build environment to update in place
        #[arg(short, long, value_name = "FILE")]
        env: PathBuf,

        /// Environment key holding the flag list, overriding the config file
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Print the Cargo build-script directive for the current time
    Cargo,

    /// Decode a build stamp value or define flag
    Decode {
        /// Stamp value (`2024-03-05 14:30:00 UTC`, `1709649000`) or `-D...` flag
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

/// Handle to the live log filter, so the config file's level can be applied
/// after the subscriber is already running
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilter {
    /// Switch to the configured `logging.level` unless `RUST_LOG` was set
    pub fn apply_config(&self, config: &StampConfig) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        let filter = EnvFilter::try_new(&config.logging.level)
            .with_context(|| format!("Invalid logging level '{}'", config.logging.level))?;
        self.handle.reload(filter)?;
        Ok(())
    }
}

/// Build the tracing subscriber writing to `writer`.
///
/// Filters by `RUST_LOG`, or `info` until [`LogFilter::apply_config`] runs.
pub fn log_subscriber<W>(writer: W) -> (impl Subscriber + Send + Sync + 'static, LogFilter)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_env = env_filter.is_some();
    let (filter, handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|| EnvFilter::new("info")));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer));

    (subscriber, LogFilter { handle, from_env })
}

/// Resolve configuration from the config file and command-line overrides
pub fn load_config(args: &Args) -> Result<StampConfig> {
    let config = StampConfig::resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    config
        .with_overrides(args.define.clone(), args.format.clone())
        .context("Invalid command-line override")
}

/// Execute the selected command, writing results to `out`
pub fn run<C: Clock>(
    command: &Command,
    mut config: StampConfig,
    clock: C,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Flag => {
            let injector = Injector::new(clock, config)?;
            writeln!(out, "{}", injector.define_flag())?;
        }
        Command::Inject { env, key } => {
            if let Some(key) = key {
                config.flags_key = key.clone();
            }
            let injector = Injector::new(clock, config).context("Invalid --key")?;
            let flag = inject_file(&injector, env)?;
            writeln!(out, "{}", flag)?;
        }
        Command::Cargo => {
            let injector = Injector::new(clock, config)?;
            writeln!(out, "{}", injector.cargo_directive())?;
        }
        Command::Decode { value } => {
            let info = decode(value, &config.define)?;
            writeln!(out, "{}", info.summary())?;
        }
    }
    Ok(())
}

/// Load `path`, inject, and write it back. Any failure leaves the file as it was.
pub fn inject_file<C: Clock>(injector: &Injector<C>, path: &Path) -> Result<String> {
    let mut env = BuildEnvironment::load(path)
        .with_context(|| format!("Failed to load build environment {}", path.display()))?;

    let flag = injector
        .inject(&mut env)
        .with_context(|| format!("Failed to inject into {}", path.display()))?;

    env.save(path)
        .with_context(|| format!("Failed to write build environment {}", path.display()))?;

    info!("Updated {} in {}", injector.config().flags_key, path.display());
    Ok(flag)
}

/// Decode a bare stamp value or a `-D<define>=...` flag.
///
/// A flag for a different define falls back to this binary's own build
/// timestamp.
pub fn decode(value: &str, define: &str) -> Result<BuildInfo> {
    if value.starts_with("-D") {
        let flags = [value.to_string()];
        return BuildInfo::from_flags(&flags, define, own_build_stamp)
            .context("Failed to decode build stamp");
    }

    let stamp = BuildStamp::decode(value).context("Failed to decode build stamp")?;
    Ok(BuildInfo {
        stamp,
        injected: true,
    })
}

/// Build stamp of this binary, captured by build.rs
pub fn own_build_stamp() -> BuildStamp {
    let value = env!("BUILD_TIMESTAMP");
    BuildStamp::decode(value).unwrap_or_else(|_| BuildStamp::Raw(value.to_string()))
}
