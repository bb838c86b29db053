//! The native connection seam.
//!
//! A [`NativeConnection`] is the opaque object a backend hands out for one
//! set of connection parameters. Every asynchronous operation reports its
//! outcome by calling the supplied [`Callback`] exactly once, from any thread.

use nwrfc_types::{CallOptions, ClientVersion, ConnectionInfo, RfcError, RfcStructure};

/// Error-first completion: `Err` carries the native error, `Ok` the result.
pub type Callback<T> = Box<dyn FnOnce(Result<T, RfcError>) + Send + 'static>;

/// Capabilities the facade needs from a native RFC connection.
pub trait NativeConnection: Send + Sync {
    /// Opens the connection.
    fn connect(&self, done: Callback<()>);

    /// Calls a remote function module.
    fn invoke(
        &self,
        name: &str,
        parameters: RfcStructure,
        done: Callback<RfcStructure>,
        options: &CallOptions,
    );

    fn ping(&self, done: Callback<()>);

    fn close(&self, done: Callback<()>);

    /// Closes and opens the connection again with the same parameters.
    fn reopen(&self, done: Callback<()>);

    /// Live liveness query; never cached by callers.
    fn is_alive(&self) -> bool;

    fn id(&self) -> u64;

    fn version(&self) -> ClientVersion;

    fn connection_info(&self) -> Result<ConnectionInfo, RfcError>;
}
