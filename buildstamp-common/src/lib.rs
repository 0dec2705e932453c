//! # Buildstamp Common Library
//!
//! Shared code for injecting a UTC build timestamp into a native build:
//! - Build environment model (compiler flag lists)
//! - Clock abstraction and timestamp formatting
//! - The timestamp injector
//! - Decoding of injected build stamps
//! - Configuration loading

pub mod build_env;
pub mod build_info;
pub mod config;
pub mod error;
pub mod inject;
pub mod time;

pub use build_env::{BuildEnvironment, EnvValue};
pub use error::{Error, Result};
pub use inject::{inject, Injector};
