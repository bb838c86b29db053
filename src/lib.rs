//! nwrfc - async client facade for SAP NW RFC connections.
//!
//! Loads the native binding once per process, then hands out [`Client`]s,
//! each wrapping a single native connection:
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use nwrfc::mock::MockBackend;
//!
//! let config = nwrfc::Config::load()?;
//! nwrfc::init(&config, MockBackend::new())?;
//!
//! let client = nwrfc::Client::new(config.connection.clone())?;
//! client.open().await?;
//! let params: nwrfc::RfcValue = [("REQUTEXT", "hello")].into_iter().collect();
//! let result = client.call("STFC_CONNECTION", params, Some(config.call.clone())).await?;
//! println!("{:?}", result.get("ECHOTEXT"));
//! # Ok(())
//! # }
//! ```

pub use nwrfc_client::{
    binding, mock, Backend, Binding, BindingConfig, BindingError, Callback, Client,
    ClientCallback, ClientError, Config, ConfigError, InvokeCallback, NativeConnection,
};
pub use nwrfc_types::{
    metadata, CallOptions, ClientVersion, ConnectionInfo, ConnectionParameters, Destination,
    Direction, FieldDesc, FunctionDesc, ParameterDesc, RfcError, RfcErrorGroup, RfcStructure,
    RfcTable, RfcType, RfcValue, SncQop, TraceLevel, TypeDesc, TypeError, BINDING_VERSION,
};

/// Loads the process-wide binding described by `config`.
pub fn init<B>(config: &Config, backend: B) -> Result<&'static Binding, BindingError>
where
    B: Backend + 'static,
{
    match config.binding.library_path {
        Some(ref path) => tracing::info!("Loading SAP NW RFC binding from {}", path.display()),
        None => tracing::info!("Searching for SAP NW RFC library {}", binding::LIBRARY_FILE),
    }

    let binding = binding::load(&config.binding, backend)?;

    tracing::info!("  Library: {}", binding.library().display());
    tracing::info!("  Version: {}", binding.version());
    tracing::info!("  Default destination: {}", config.connection.destination());
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[tokio::test]
    async fn test_init_and_call() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(binding::LIBRARY_FILE), b"").unwrap();

        let mut config = Config::default();
        config.binding = BindingConfig::default()
            .with_library_path(dir.path())
            .without_defaults();
        config.connection = ConnectionParameters::new("001")
            .with_user("a", "b")
            .with_application_server("host", "00");

        let binding = init(&config, mock::MockBackend::new()).unwrap();
        assert_eq!(binding.version().binding, BINDING_VERSION);

        let client = Client::new(config.connection.clone()).unwrap();
        assert!(std::ptr::eq(client.open().await.unwrap(), &client));

        let params: RfcValue = [("REQUTEXT", "hello")].into_iter().collect();
        let result = client.call("STFC_CONNECTION", params, None).await.unwrap();
        assert_eq!(result["ECHOTEXT"], RfcValue::from("hello"));

        client.close().await.unwrap();
        assert!(!client.is_alive());
    }
}
