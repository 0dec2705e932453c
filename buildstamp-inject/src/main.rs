//! buildstamp-inject - Build timestamp injector
//!
//! Invoked once per build by the surrounding build orchestrator. Prints or
//! appends `-DBUILD_TIMESTAMP="<UTC time>"`. Logs go to stderr so stdout
//! carries only the result. Any failure exits non-zero, which aborts the
//! calling build.

use anyhow::Result;
use buildstamp_common::time::SystemClock;
use buildstamp_inject::{load_config, log_subscriber, run, Args};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing before anything else; RUST_LOG wins over the config file
    let (subscriber, log_filter) = log_subscriber(std::io::stderr);
    subscriber.init();

    info!(
        "buildstamp-inject v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = load_config(&args)?;
    log_filter.apply_config(&config)?;
    debug!(
        "define={} format={:?} flags_key={}",
        config.define, config.format, config.flags_key
    );

    let stdout = std::io::stdout();
    run(&args.command, config, SystemClock, &mut stdout.lock())
}
