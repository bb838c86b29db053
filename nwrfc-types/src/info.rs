//! Version and connection descriptors reported by the native connection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SDK and binding version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientVersion {
    pub major: String,
    pub minor: String,
    pub patch: String,
    /// Version of the binding wrapping the SDK.
    pub binding: String,
}

impl ClientVersion {
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        patch: impl Into<String>,
        binding: impl Into<String>,
    ) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            patch: patch.into(),
            binding: binding.into(),
        }
    }
}

impl fmt::Display for ClientVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{} (binding {})",
            self.major, self.minor, self.patch, self.binding
        )
    }
}

/// Attributes of a live connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub host: String,
    pub partner_host: String,
    pub sys_number: String,
    pub sys_id: String,
    pub client: String,
    pub user: String,
    pub language: String,
    pub trace: String,
    pub iso_language: String,
    pub codepage: String,
    pub partner_codepage: String,
    pub rfc_role: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub partner_type: String,
    pub rel: String,
    pub partner_rel: String,
    pub kernel_rel: String,
    pub cpic_conv_id: String,
    pub prog_name: String,
    pub partner_bytes_per_char: String,
    pub reserved: String,
}
