//! Build timestamp injector
//!
//! Reads the clock once, formats the instant as UTC and appends
//! `-D<define>="<timestamp>"` to the build environment's flag list.
//!
//! ```
//! use buildstamp_common::{inject, BuildEnvironment};
//!
//! let mut env = BuildEnvironment::new();
//! let flag = inject(&mut env).unwrap();
//! assert!(flag.starts_with("-DBUILD_TIMESTAMP=\""));
//! assert_eq!(env.flags(), [flag]);
//! ```

use crate::build_env::BuildEnvironment;
use crate::config::StampConfig;
use crate::time::{format_or_iso8601, Clock, SystemClock};
use crate::Result;
use tracing::info;

/// Append one timestamp define to `env` using the system clock and the
/// default configuration. Returns the appended flag.
pub fn inject(env: &mut BuildEnvironment) -> Result<String> {
    Injector::<SystemClock>::default().inject(env)
}

/// Timestamp injector bound to a clock and a configuration
#[derive(Debug, Clone)]
pub struct Injector<C = SystemClock> {
    clock: C,
    config: StampConfig,
}

impl Default for Injector<SystemClock> {
    fn default() -> Self {
        Self {
            clock: SystemClock,
            config: StampConfig::default(),
        }
    }
}

impl<C: Clock> Injector<C> {
    /// Bind a clock and configuration. The configuration is validated here
    /// so every injector produces a well-formed define.
    pub fn new(clock: C, config: StampConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { clock, config })
    }

    /// Configuration this injector was built with
    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    /// Current time rendered with the configured pattern, or ISO 8601 if
    /// that renders empty
    pub fn stamp(&self) -> String {
        format_or_iso8601(&self.clock.now(), &self.config.format)
    }

    /// Compiler define for the current time, without touching any environment
    pub fn define_flag(&self) -> String {
        define_flag(&self.config.define, &self.stamp())
    }

    /// Cargo build-script directive exposing the stamp to `env!()`
    pub fn cargo_directive(&self) -> String {
        format!(
            "cargo:rustc-env={}={}",
            self.config.define,
            sanitize(&self.stamp())
        )
    }

    /// Append one define to the configured flag list of `env`.
    ///
    /// Exactly one entry is added per call; existing entries are left in
    /// place. Calling twice adds two flags.
    pub fn inject(&self, env: &mut BuildEnvironment) -> Result<String> {
        let flag = self.define_flag();
        env.append(&self.config.flags_key, [flag.as_str()])?;
        info!("Injected {} into {}", flag, self.config.flags_key);
        Ok(flag)
    }
}

/// Build `-D<name>="<value>"`, escaping the value for a quoted define
pub fn define_flag(name: &str, value: &str) -> String {
    format!("-D{}=\"{}\"", name, escape_define_value(value))
}

/// Backslash-escape `\` and `"`; control characters become spaces
pub fn escape_define_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in sanitize(value).chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
