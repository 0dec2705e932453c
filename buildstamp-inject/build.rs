//! Build script for buildstamp-inject
//!
//! Stamps this binary with its own identification so the startup log line
//! can report it: short commit, build time and cargo profile.

use std::process::Command;

use buildstamp_common::time::SystemClock;
use buildstamp_common::Injector;

/// Short commit of the checkout, or `unknown` outside a git work tree
fn short_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|hash| hash.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", short_commit());
    // Same stamp a firmware build would get, in Cargo's form
    println!("{}", Injector::<SystemClock>::default().cargo_directive());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // Without rerun-if-changed the script runs on every build, keeping the stamp fresh
}
