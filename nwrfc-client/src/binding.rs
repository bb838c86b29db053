//! Process-wide native binding.
//!
//! The hosting application loads the binding once, before constructing any
//! [`Client`](crate::Client):
//!
//! ```text
//! binding::load(&config.binding, backend)?;   // locate SDK library, install backend
//! let client = Client::new(params)?;           // uses the installed backend
//! ```
//!
//! A missing SDK library is fatal; nothing is retried. Lookup only checks that
//! the library file exists; the [`Backend`] opens it and rejects a corrupt or
//! wrong-architecture build.

use crate::native::NativeConnection;
use nwrfc_types::{ClientVersion, ConnectionParameters, RfcError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// File name of the NW RFC SDK shared library on this platform.
#[cfg(target_os = "windows")]
pub const LIBRARY_FILE: &str = "sapnwrfc.dll";
#[cfg(target_os = "macos")]
pub const LIBRARY_FILE: &str = "libsapnwrfc.dylib";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub const LIBRARY_FILE: &str = "libsapnwrfc.so";

/// Environment variable naming the SDK installation root.
pub const SDK_HOME_ENV: &str = "SAPNWRFC_HOME";

#[cfg(target_os = "windows")]
const SEARCH_PATH_ENV: &str = "PATH";
#[cfg(target_os = "macos")]
const SEARCH_PATH_ENV: &str = "DYLD_LIBRARY_PATH";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SEARCH_PATH_ENV: &str = "LD_LIBRARY_PATH";

#[cfg(target_os = "windows")]
const DEFAULT_DIRS: &[&str] = &["C:\\nwrfcsdk\\lib"];
#[cfg(not(target_os = "windows"))]
const DEFAULT_DIRS: &[&str] = &["/usr/local/sap/nwrfcsdk/lib", "/usr/sap/nwrfcsdk/lib"];

/// Binding errors.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("{}", library_not_found_message(searched))]
    LibraryNotFound { searched: Vec<PathBuf> },

    #[error("native binding not loaded: call binding::load before creating a client")]
    NotLoaded,
}

fn library_not_found_message(searched: &[PathBuf]) -> String {
    let mut msg = format!("\nnwrfc binding not loaded\nSAP NW RFC shared library {LIBRARY_FILE} not found.");
    if cfg!(target_os = "windows") {
        msg.push_str(" Check if on %PATH%");
    } else {
        msg.push_str(" Check \"ldconfig -p | grep sap\"");
    }
    msg.push_str(" and check SAP NW RFC SDK installation guides.\n");
    if !searched.is_empty() {
        msg.push_str("Searched:\n");
        for path in searched {
            let _ = writeln!(msg, "  {}", path.display());
        }
    }
    msg
}

/// The native implementation behind the binding.
pub trait Backend: Send + Sync {
    /// SDK and binding version.
    fn version(&self) -> ClientVersion;

    /// Creates a native connection object. Does not connect.
    fn new_connection(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Box<dyn NativeConnection>, RfcError>;
}

/// A located SDK library together with the backend driving it.
pub struct Binding {
    backend: Box<dyn Backend>,
    library: PathBuf,
}

impl Binding {
    pub fn new(backend: impl Backend + 'static, library: impl Into<PathBuf>) -> Self {
        Self {
            backend: Box::new(backend),
            library: library.into(),
        }
    }

    /// Path of the SDK shared library.
    pub fn library(&self) -> &Path {
        &self.library
    }

    pub fn version(&self) -> ClientVersion {
        self.backend.version()
    }

    pub fn new_connection(
        &self,
        params: &ConnectionParameters,
    ) -> Result<Box<dyn NativeConnection>, RfcError> {
        tracing::debug!(
            "Creating native connection (client={}, destination={})",
            params.client,
            params.destination()
        );
        self.backend.new_connection(params)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("library", &self.library)
            .finish_non_exhaustive()
    }
}

/// Where to look for the SDK library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Library file, or directory containing it. Searched first.
    pub library_path: Option<PathBuf>,
    /// Also search `$SAPNWRFC_HOME/lib`, the platform search path and the
    /// default install directories.
    pub search_defaults: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            search_defaults: true,
        }
    }
}

impl BindingConfig {
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    pub fn without_defaults(mut self) -> Self {
        self.search_defaults = false;
        self
    }
}

/// Ordered list of candidate library locations.
#[derive(Debug, Clone, Default)]
pub struct LibrarySearch {
    candidates: Vec<PathBuf>,
}

impl LibrarySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the search order from configuration and the process environment.
    pub fn from_config(config: &BindingConfig) -> Self {
        Self::from_config_with(config, |key| std::env::var_os(key))
    }

    fn from_config_with<F>(config: &BindingConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let mut search = Self::new();

        if let Some(ref path) = config.library_path {
            search = if path.is_dir() {
                search.with_dir(path)
            } else {
                search.with_file(path)
            };
        }

        if config.search_defaults {
            if let Some(home) = env(SDK_HOME_ENV) {
                search = search.with_dir(PathBuf::from(home).join("lib"));
            }
            if let Some(paths) = env(SEARCH_PATH_ENV) {
                for dir in std::env::split_paths(&paths) {
                    search = search.with_dir(dir);
                }
            }
            for dir in DEFAULT_DIRS {
                search = search.with_dir(dir);
            }
        }

        search
    }

    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.candidates.push(dir.as_ref().join(LIBRARY_FILE));
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.candidates.push(file.into());
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// Returns the first candidate that exists as a file. The file is not opened.
    pub fn locate(&self) -> Result<PathBuf, BindingError> {
        for candidate in &self.candidates {
            tracing::trace!("Probing {}", candidate.display());
            if candidate.is_file() {
                return Ok(candidate.clone());
            }
        }
        Err(BindingError::LibraryNotFound {
            searched: self.candidates.clone(),
        })
    }
}

static BINDING: OnceLock<Binding> = OnceLock::new();

/// Locates the SDK library and installs `backend` as the process binding.
///
/// Subsequent calls return the binding installed first; `backend` is dropped.
pub fn load<B>(config: &BindingConfig, backend: B) -> Result<&'static Binding, BindingError>
where
    B: Backend + 'static,
{
    if let Some(binding) = BINDING.get() {
        tracing::debug!("Binding already loaded from {}", binding.library.display());
        return Ok(binding);
    }

    let library = LibrarySearch::from_config(config).locate().map_err(|e| {
        tracing::error!("{}", e);
        e
    })?;

    Ok(install(Binding::new(backend, library)))
}

/// Installs an already located binding. First install wins.
pub fn install(binding: Binding) -> &'static Binding {
    let installed = BINDING.get_or_init(|| binding);
    tracing::info!(
        "Loaded SAP NW RFC binding {} from {}",
        installed.version(),
        installed.library.display()
    );
    installed
}

/// Returns the installed binding.
pub fn get() -> Result<&'static Binding, BindingError> {
    BINDING.get().ok_or(BindingError::NotLoaded)
}

pub fn is_loaded() -> bool {
    BINDING.get().is_some()
}
