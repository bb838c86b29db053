//! Runs in its own process, where no binding has been loaded.

use nwrfc_client::{binding, BindingError, Client, ClientError};
use nwrfc_types::ConnectionParameters;

#[test]
fn test_client_requires_loaded_binding() {
    assert!(!binding::is_loaded());
    assert!(matches!(binding::get(), Err(BindingError::NotLoaded)));

    let params = ConnectionParameters::new("001")
        .with_user("a", "b")
        .with_application_server("host", "00");
    let err = Client::new(params).unwrap_err();

    assert!(matches!(err, ClientError::Binding(BindingError::NotLoaded)));
    assert!(err.to_string().contains("binding::load"));
}

#[test]
fn test_failed_load_installs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = nwrfc_client::BindingConfig::default()
        .with_library_path(dir.path())
        .without_defaults();

    let err = binding::load(&config, nwrfc_client::mock::MockBackend::new()).unwrap_err();
    assert!(matches!(err, BindingError::LibraryNotFound { .. }));
    assert!(!binding::is_loaded());
    assert!(Client::new(ConnectionParameters::new("001")).is_err());
}
