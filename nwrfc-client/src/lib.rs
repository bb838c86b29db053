//! # nwrfc-client
//!
//! Client facade for SAP NW RFC connections.
//!
//! This crate provides:
//! - `Client`, with an async and an error-first callback API per operation
//! - Argument validation before anything reaches the native connection
//! - The process-wide binding and SDK library lookup
//! - Layered configuration (defaults, YAML file, environment)
//! - An in-process mock backend for tests and benchmarks

pub mod binding;
pub mod client;
mod completion;
pub mod config;
pub mod error;
pub mod mock;
pub mod native;

pub use binding::{Backend, Binding, BindingConfig, BindingError, LibrarySearch};
pub use client::{Client, InvokeCallback};
pub use completion::ClientCallback;
pub use config::{Config, ConfigError};
pub use error::ClientError;
pub use native::{Callback, NativeConnection};
