//! High-level client API.

use crate::binding::{self, Binding};
use crate::completion::{ClientCallback, Completion};
use crate::error::ClientError;
use crate::native::{Callback, NativeConnection};
use nwrfc_types::{
    CallOptions, ClientVersion, ConnectionInfo, ConnectionParameters, RfcStructure, RfcValue,
};

/// Callback receiving the result of [`Client::invoke`].
pub type InvokeCallback = ClientCallback<RfcStructure>;

/// Client facade over one native RFC connection.
///
/// Every operation comes in two flavors: an `async fn` resolving to a
/// `Result`, and a callback variant that hands the outcome to an error-first
/// callback. The facade keeps no connection state of its own; all state
/// queries go to the native object.
pub struct Client {
    native: Box<dyn NativeConnection>,
}

impl Client {
    /// Creates a client through the process-wide binding.
    pub fn new(params: ConnectionParameters) -> Result<Self, ClientError> {
        Self::with_binding(binding::get()?, params)
    }

    /// Creates a client through an explicit binding.
    pub fn with_binding(
        binding: &Binding,
        params: ConnectionParameters,
    ) -> Result<Self, ClientError> {
        let native = binding.new_connection(&params)?;
        Ok(Self::from_connection(native))
    }

    /// Wraps an existing native connection object.
    pub fn from_connection(native: Box<dyn NativeConnection>) -> Self {
        Self { native }
    }

    // =========================================================================
    // Connection lifecycle
    // =========================================================================

    /// Opens the connection, resolving to the client itself.
    pub async fn open(&self) -> Result<&Self, ClientError> {
        tracing::debug!("Opening connection id={}", self.native.id());
        let (completion, deferred) = Completion::deferred();
        completion.dispatch("connect", |done| self.native.connect(done));
        deferred.wait().await?;
        Ok(self)
    }

    /// Opens the connection, reporting through `callback`.
    pub fn connect(&self, callback: Callback<()>) {
        self.native.connect(callback);
    }

    /// Closes the connection.
    pub async fn close(&self) -> Result<(), ClientError> {
        tracing::debug!("Closing connection id={}", self.native.id());
        let (completion, deferred) = Completion::deferred();
        completion.dispatch("close", |done| self.native.close(done));
        deferred.wait().await
    }

    /// Closes the connection, reporting through `callback`.
    pub fn close_with(&self, callback: Callback<()>) {
        self.native.close(callback);
    }

    /// Closes and reopens the connection.
    pub async fn reopen(&self) -> Result<(), ClientError> {
        tracing::debug!("Reopening connection id={}", self.native.id());
        let (completion, deferred) = Completion::deferred();
        completion.dispatch("reopen", |done| self.native.reopen(done));
        deferred.wait().await
    }

    /// Closes and reopens the connection, reporting through `callback`.
    pub fn reopen_with(&self, callback: Callback<()>) {
        self.native.reopen(callback);
    }

    /// Pings the backend; resolves to `true` when it answers.
    pub async fn ping(&self) -> Result<bool, ClientError> {
        tracing::debug!("Pinging connection id={}", self.native.id());
        let (completion, deferred) = Completion::deferred();
        completion.dispatch("ping", |done| self.native.ping(done));
        deferred.wait().await?;
        Ok(true)
    }

    /// Pings the backend, reporting through `callback`.
    pub fn ping_with(&self, callback: Callback<()>) {
        self.native.ping(callback);
    }

    // =========================================================================
    // Remote function calls
    // =========================================================================

    /// Calls a remote function module.
    ///
    /// `name` is forwarded as given; `parameters` must be a structure.
    /// Validation failures resolve to [`ClientError::TypeMismatch`] without
    /// reaching the native connection.
    pub async fn call(
        &self,
        name: &str,
        parameters: impl Into<RfcValue>,
        options: Option<CallOptions>,
    ) -> Result<RfcStructure, ClientError> {
        let parameters = validate_parameters(parameters.into())?;
        let options = options.unwrap_or_default();

        tracing::debug!("Calling {} on connection id={}", name, self.native.id());
        let (completion, deferred) = Completion::deferred();
        completion.dispatch("invoke", |done| {
            self.native.invoke(name, parameters, done, &options)
        });
        deferred.wait().await
    }

    /// Calls a remote function module, reporting through `callback`.
    ///
    /// Fails synchronously only when `callback` is `None`; every other
    /// failure, validation included, is passed to the callback.
    pub fn invoke(
        &self,
        name: &str,
        parameters: impl Into<RfcValue>,
        callback: Option<InvokeCallback>,
        options: Option<CallOptions>,
    ) -> Result<(), ClientError> {
        let callback = callback.ok_or(ClientError::MissingCallback)?;

        let parameters = match validate_parameters(parameters.into()) {
            Ok(p) => p,
            Err(e) => {
                callback(Err(e));
                return Ok(());
            }
        };
        let options = options.unwrap_or_default();

        tracing::debug!("Invoking {} on connection id={}", name, self.native.id());
        Completion::new(callback).dispatch("invoke", |done| {
            self.native.invoke(name, parameters, done, &options)
        });
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Queries the native connection; never cached.
    pub fn is_alive(&self) -> bool {
        self.native.is_alive()
    }

    pub fn id(&self) -> u64 {
        self.native.id()
    }

    pub fn version(&self) -> ClientVersion {
        self.native.version()
    }

    pub fn connection_info(&self) -> Result<ConnectionInfo, ClientError> {
        Ok(self.native.connection_info()?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.native.id())
            .field("alive", &self.native.is_alive())
            .finish()
    }
}

fn validate_parameters(parameters: RfcValue) -> Result<RfcStructure, ClientError> {
    parameters.into_structure().map_err(|other| {
        ClientError::TypeMismatch(format!(
            "Second argument (remote function module parameters) must be a structure, got {}",
            other.kind()
        ))
    })
}
