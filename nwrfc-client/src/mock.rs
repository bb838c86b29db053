//! In-process stand-in for the native SDK.
//!
//! [`MockConnection`] behaves like a native connection object: it completes
//! every operation synchronously on the calling thread, tracks liveness and
//! dispatches calls to registered handlers. [`MockBackend`] hands out mock
//! connections through a [`Binding`](crate::Binding).

use crate::binding::Backend;
use crate::native::{Callback, NativeConnection};
use nwrfc_types::{
    CallOptions, ClientVersion, ConnectionInfo, ConnectionParameters, FunctionDesc, RfcError,
    RfcErrorGroup, RfcStructure, RfcValue, BINDING_VERSION,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Handler answering a remote function call.
pub type Handler =
    Arc<dyn Fn(&RfcStructure, &CallOptions) -> Result<RfcStructure, RfcError> + Send + Sync>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    None,
    Panic,
    DropCallback,
}

struct Function {
    desc: Option<FunctionDesc>,
    handler: Handler,
}

struct Inner {
    id: u64,
    params: ConnectionParameters,
    alive: AtomicBool,
    functions: Mutex<HashMap<String, Function>>,
    connect_error: Mutex<Option<RfcError>>,
    close_error: Mutex<Option<RfcError>>,
    fault: Mutex<Fault>,
    invokes: AtomicUsize,
    connects: AtomicUsize,
}

/// Scriptable native connection. Clones share state.
#[derive(Clone)]
pub struct MockConnection {
    inner: Arc<Inner>,
}

impl MockConnection {
    pub fn new(params: ConnectionParameters) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                params,
                alive: AtomicBool::new(false),
                functions: Mutex::new(HashMap::new()),
                connect_error: Mutex::new(None),
                close_error: Mutex::new(None),
                fault: Mutex::new(Fault::None),
                invokes: AtomicUsize::new(0),
                connects: AtomicUsize::new(0),
            }),
        }
    }

    /// Registers a function module answered by `handler`.
    pub fn with_function<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&RfcStructure, &CallOptions) -> Result<RfcStructure, RfcError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name.into(), None, Arc::new(handler));
        self
    }

    /// Registers a function module whose parameters are checked against `desc`.
    pub fn with_function_desc<F>(self, desc: FunctionDesc, handler: F) -> Self
    where
        F: Fn(&RfcStructure, &CallOptions) -> Result<RfcStructure, RfcError>
            + Send
            + Sync
            + 'static,
    {
        let name = desc.name.clone();
        self.register(name, Some(desc), Arc::new(handler));
        self
    }

    /// Registers `STFC_CONNECTION`, echoing `REQUTEXT`.
    pub fn with_stfc_connection(self) -> Self {
        let id = self.inner.id;
        self.with_function("STFC_CONNECTION", move |params, _| {
            let requtext = params
                .get("REQUTEXT")
                .and_then(RfcValue::as_str)
                .unwrap_or_default()
                .to_string();
            let mut result = params.clone();
            result.insert("ECHOTEXT".to_string(), requtext.into());
            result.insert(
                "RESPTEXT".to_string(),
                format!("SAP R/3 Rel. 750   Sysid: MCK   Connection: {id}").into(),
            );
            Ok(result)
        })
    }

    /// Makes the next connect attempts fail with `err`.
    pub fn fail_connect(self, err: RfcError) -> Self {
        *self.inner.connect_error.lock() = Some(err);
        self
    }

    /// Makes the next close attempts fail with `err`, leaving the connection open.
    pub fn fail_close(self, err: RfcError) -> Self {
        *self.inner.close_error.lock() = Some(err);
        self
    }

    /// Panics inside every following invoke.
    pub fn panic_on_invoke(&self) {
        *self.inner.fault.lock() = Fault::Panic;
    }

    /// Drops every following invoke callback without calling it.
    pub fn drop_callbacks(&self) {
        *self.inner.fault.lock() = Fault::DropCallback;
    }

    /// Simulates the backend closing or restoring the connection.
    pub fn set_alive(&self, alive: bool) {
        self.inner.alive.store(alive, Ordering::SeqCst);
    }

    pub fn params(&self) -> &ConnectionParameters {
        &self.inner.params
    }

    /// Number of invokes that reached this connection.
    pub fn invoke_count(&self) -> usize {
        self.inner.invokes.load(Ordering::SeqCst)
    }

    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    fn register(&self, name: String, desc: Option<FunctionDesc>, handler: Handler) {
        self.inner
            .functions
            .lock()
            .insert(name, Function { desc, handler });
    }

    fn open(&self) -> Result<(), RfcError> {
        self.inner.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.inner.connect_error.lock().clone() {
            return Err(err);
        }
        self.set_alive(true);
        Ok(())
    }

    fn require_alive(&self) -> Result<(), RfcError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(RfcError::communication(format!(
                "connection {} is closed",
                self.inner.id
            )))
        }
    }

    fn execute(
        &self,
        name: &str,
        parameters: &RfcStructure,
        options: &CallOptions,
    ) -> Result<RfcStructure, RfcError> {
        self.require_alive()?;

        // Clone out so handlers may register functions themselves.
        let (desc, handler) = {
            let functions = self.inner.functions.lock();
            let function = functions.get(name).ok_or_else(|| {
                RfcError::abap_exception("FU_NOT_FOUND", format!("ID:FL Type:E Number:046 {name}"))
            })?;
            (function.desc.clone(), function.handler.clone())
        };

        if let Some(desc) = desc {
            desc.check(parameters)?;
        }

        let mut result = handler(parameters, options)?;
        result.retain(|key, _| options.is_requested(key));
        Ok(result)
    }
}

impl NativeConnection for MockConnection {
    fn connect(&self, done: Callback<()>) {
        done(self.open());
    }

    fn invoke(
        &self,
        name: &str,
        parameters: RfcStructure,
        done: Callback<RfcStructure>,
        options: &CallOptions,
    ) {
        self.inner.invokes.fetch_add(1, Ordering::SeqCst);
        let fault = *self.inner.fault.lock();
        match fault {
            Fault::Panic => panic!("mock native invoke of {name} failed"),
            Fault::DropCallback => drop(done),
            Fault::None => done(self.execute(name, &parameters, options)),
        }
    }

    fn ping(&self, done: Callback<()>) {
        done(self.require_alive());
    }

    fn close(&self, done: Callback<()>) {
        let close_error = self.inner.close_error.lock().clone();
        if let Some(err) = close_error {
            return done(Err(err));
        }
        self.set_alive(false);
        done(Ok(()));
    }

    fn reopen(&self, done: Callback<()>) {
        self.set_alive(false);
        done(self.open());
    }

    fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    fn id(&self) -> u64 {
        self.inner.id
    }

    fn version(&self) -> ClientVersion {
        ClientVersion::new("7500", "0", "10", BINDING_VERSION)
    }

    fn connection_info(&self) -> Result<ConnectionInfo, RfcError> {
        self.require_alive()?;
        let params = &self.inner.params;
        let lang = params.lang.clone().unwrap_or_else(|| "EN".to_string());
        Ok(ConnectionInfo {
            host: "localhost".to_string(),
            partner_host: params.ashost.clone().unwrap_or_default(),
            sys_number: params.sysnr.clone().unwrap_or_default(),
            sys_id: params.sysid.clone().unwrap_or_else(|| "MCK".to_string()),
            client: params.client.clone(),
            user: params.user.clone().unwrap_or_default().to_uppercase(),
            language: lang.chars().take(1).collect::<String>().to_uppercase(),
            iso_language: lang.to_uppercase(),
            trace: params
                .trace
                .map(|t| t.as_str().to_string())
                .unwrap_or_else(|| "0".to_string()),
            rfc_role: "C".to_string(),
            kind: "E".to_string(),
            partner_type: "3".to_string(),
            rel: "753".to_string(),
            partner_rel: "750".to_string(),
            kernel_rel: "753".to_string(),
            prog_name: "SAPLSYST".to_string(),
            ..Default::default()
        })
    }
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection")
            .field("id", &self.inner.id)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}

/// Backend creating [`MockConnection`]s that answer `STFC_CONNECTION`.
#[derive(Default, Clone)]
pub struct MockBackend {
    created: Arc<Mutex<Vec<MockConnection>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections created so far, in creation order.
    pub fn connections(&self) -> Vec<MockConnection> {
        self.created.lock().clone()
    }
}

impl Backend for MockBackend {
    fn version(&self) -> ClientVersion {
        ClientVersion::new("7500", "0", "10", BINDING_VERSION)
    }

    fn new_connection(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Box<dyn NativeConnection>, RfcError> {
        if params.client.trim().is_empty() {
            return Err(RfcError::new(
                RfcErrorGroup::ExternalApplicationFailure,
                20,
                "RFC_INVALID_PARAMETER",
                "Missing CLIENT parameter",
            ));
        }
        let conn = MockConnection::new(params.clone()).with_stfc_connection();
        self.created.lock().push(conn.clone());
        Ok(Box::new(conn))
    }
}
