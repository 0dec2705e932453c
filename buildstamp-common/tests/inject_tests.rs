//! Integration tests for the timestamp injector
//!
//! Covers:
//! - Append-only, order-preserving injection (+1 flag per call)
//! - Define shape `-DBUILD_TIMESTAMP="..."` with non-empty body
//! - ISO 8601 fallback when the primary pattern renders empty
//! - Malformed environments propagating an error
//! - Decoding injected flags on the consuming side

use buildstamp_common::build_env::{EnvValue, BUILD_FLAGS};
use buildstamp_common::build_info::{BuildInfo, BuildStamp};
use buildstamp_common::config::StampConfig;
use buildstamp_common::time::{Clock, FixedClock, SystemClock};
use buildstamp_common::{inject, BuildEnvironment, Error, Injector};
use chrono::{DateTime, TimeZone, Utc};

fn existing_flags() -> Vec<String> {
    vec!["-Os".to_string(), "-Wall".to_string(), "-DUSE_CAN=1".to_string()]
}

fn env_with_flags() -> BuildEnvironment {
    let mut env = BuildEnvironment::new();
    env.set("CC", EnvValue::Scalar("arm-none-eabi-gcc".to_string()));
    env.set(BUILD_FLAGS, EnvValue::List(existing_flags()));
    env
}

/// Body between the quotes of `-DBUILD_TIMESTAMP="<body>"`
fn quoted_body(flag: &str) -> &str {
    flag.strip_prefix("-DBUILD_TIMESTAMP=\"")
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or_else(|| panic!("unexpected flag shape: {}", flag))
}

#[test]
fn test_inject_appends_exactly_one_flag() {
    let mut env = env_with_flags();

    let flag = inject(&mut env).unwrap();

    let flags = env.flags();
    assert_eq!(flags.len(), existing_flags().len() + 1);
    assert_eq!(&flags[..3], existing_flags().as_slice());
    assert_eq!(flags[3], flag);
    // Other keys untouched
    assert_eq!(env.get("CC"), Some(&EnvValue::Scalar("arm-none-eabi-gcc".to_string())));
    assert_eq!(env.len(), 2);
}

#[test]
fn test_inject_flag_shape_with_system_clock() {
    let mut env = BuildEnvironment::new();
    let before = SystemClock.now().timestamp();

    let flag = inject(&mut env).unwrap();

    let body = quoted_body(&flag);
    assert!(!body.is_empty());
    assert!(body.ends_with(" UTC"));

    let decoded = BuildStamp::decode(body).unwrap();
    let instant = decoded.instant().unwrap().timestamp();
    // Formatting truncates to whole seconds
    assert!(instant >= before - 1);
    assert!(instant <= SystemClock.now().timestamp());
}

#[test]
fn test_inject_twice_appends_twice() {
    let mut env = env_with_flags();

    let first = inject(&mut env).unwrap();
    let second = inject(&mut env).unwrap();

    let flags = env.flags();
    assert_eq!(flags.len(), existing_flags().len() + 2);
    assert_eq!(flags[3], first);
    assert_eq!(flags[4], second);
}

#[test]
fn test_scenario_fixed_clock() {
    let instant = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
    let injector = Injector::new(FixedClock(instant), StampConfig::default()).unwrap();
    let mut env = BuildEnvironment::new();

    let flag = injector.inject(&mut env).unwrap();

    assert_eq!(flag, r#"-DBUILD_TIMESTAMP="2024-03-05 14:30:00 UTC""#);
    assert_eq!(env.flags(), [flag]);
}

#[test]
fn test_empty_primary_format_uses_iso8601() {
    let config = StampConfig {
        format: String::new(),
        ..StampConfig::default()
    };
    let injector = Injector::new(SystemClock, config).unwrap();
    let mut env = BuildEnvironment::new();

    let flag = injector.inject(&mut env).unwrap();

    let body = quoted_body(&flag);
    assert!(!body.is_empty());
    assert!(DateTime::parse_from_rfc3339(body).is_ok());
}

#[test]
fn test_blank_rendering_format_still_decodes() {
    let config = StampConfig::from_toml_str("format = \"%n\"\n").unwrap();
    let clock = FixedClock::from_unix(1_709_649_000).unwrap();
    let mut env = BuildEnvironment::new();

    let flag = Injector::new(clock, config).unwrap().inject(&mut env).unwrap();

    assert_eq!(flag, r#"-DBUILD_TIMESTAMP="2024-03-05T14:30:00+00:00""#);
    let info = BuildInfo::from_flags(env.flags(), "BUILD_TIMESTAMP", || {
        BuildStamp::Raw("unused".to_string())
    })
    .unwrap();
    assert_eq!(info.stamp, BuildStamp::Formatted(clock.now()));
}

#[test]
fn test_injector_rejects_empty_define() {
    let config = StampConfig {
        define: String::new(),
        ..StampConfig::default()
    };

    let result = Injector::new(SystemClock, config);

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_environment_propagates() {
    let mut env = BuildEnvironment::new();
    env.set(BUILD_FLAGS, EnvValue::Scalar("-Os".to_string()));

    let result = inject(&mut env);

    assert!(matches!(result, Err(Error::MalformedEnvironment(_))));
    assert_eq!(env.get(BUILD_FLAGS), Some(&EnvValue::Scalar("-Os".to_string())));
}

#[test]
fn test_consumer_decodes_injected_flag() {
    let clock = FixedClock::from_unix(1_709_649_000).unwrap();
    let injector = Injector::new(clock, StampConfig::default()).unwrap();
    let mut env = env_with_flags();
    injector.inject(&mut env).unwrap();

    let info = BuildInfo::from_flags(env.flags(), "BUILD_TIMESTAMP", || {
        BuildStamp::Raw("unused".to_string())
    })
    .unwrap();

    assert!(info.injected);
    assert_eq!(info.stamp.instant(), Some(clock.now()));
}

#[test]
fn test_consumer_decodes_epoch_define() {
    let config = StampConfig {
        format: "%s".to_string(),
        ..StampConfig::default()
    };
    let clock = FixedClock::from_unix(1_709_649_000).unwrap();
    let mut env = BuildEnvironment::new();
    Injector::new(clock, config)
        .unwrap()
        .inject(&mut env)
        .unwrap();

    let info = BuildInfo::from_flags(env.flags(), "BUILD_TIMESTAMP", || {
        BuildStamp::Raw("unused".to_string())
    })
    .unwrap();

    assert_eq!(info.stamp, BuildStamp::Epoch(clock.now()));
}
