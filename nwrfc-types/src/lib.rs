//! # nwrfc-types
//!
//! Data model shared by the nwrfc client facade and native backends.
//!
//! This crate provides:
//! - RFC parameter values (scalars, arrays, structures, tables)
//! - Connection parameters and per-call options
//! - Version and connection-info descriptors
//! - The native RFC error type
//! - Function module metadata with parameter conformance checks

pub mod error;
pub mod info;
pub mod metadata;
pub mod params;
pub mod value;

pub use error::{RfcError, RfcErrorGroup, TypeError};
pub use info::{ClientVersion, ConnectionInfo};
pub use metadata::{Direction, FieldDesc, FunctionDesc, ParameterDesc, RfcType, TypeDesc};
pub use params::{CallOptions, ConnectionParameters, Destination, SncQop, TraceLevel};
pub use value::{RfcStructure, RfcTable, RfcValue};

/// Version of this binding, reported in [`ClientVersion::binding`].
pub const BINDING_VERSION: &str = env!("CARGO_PKG_VERSION");
