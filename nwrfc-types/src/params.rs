//! Connection parameters and per-call options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SNC quality of protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SncQop {
    #[serde(rename = "1")]
    DigSig,
    #[serde(rename = "2")]
    DigSigEnc,
    #[serde(rename = "3")]
    DigSigEncUserAuth,
    #[serde(rename = "8")]
    BackendDefault,
    #[serde(rename = "9")]
    Maximum,
}

impl SncQop {
    pub fn as_str(&self) -> &'static str {
        match self {
            SncQop::DigSig => "1",
            SncQop::DigSigEnc => "2",
            SncQop::DigSigEncUserAuth => "3",
            SncQop::BackendDefault => "8",
            SncQop::Maximum => "9",
        }
    }
}

/// RFC trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceLevel {
    #[serde(rename = "0")]
    Off,
    #[serde(rename = "1")]
    Brief,
    #[serde(rename = "2")]
    Verbose,
    #[serde(rename = "3")]
    Full,
}

impl TraceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceLevel::Off => "0",
            TraceLevel::Brief => "1",
            TraceLevel::Verbose => "2",
            TraceLevel::Full => "3",
        }
    }

    /// Parses the numeric form (`"0"`..`"3"`) used by the SDK.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "0" => Some(TraceLevel::Off),
            "1" => Some(TraceLevel::Brief),
            "2" => Some(TraceLevel::Verbose),
            "3" => Some(TraceLevel::Full),
            _ => None,
        }
    }
}

/// How the connection parameters select a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Named destination resolved by the SDK from `sapnwrfc.ini`.
    Named,
    /// Specific application server (`ashost` + `sysnr`).
    ApplicationServer,
    /// Logon group via message server (`mshost` / `r3name` / `sysid` + `group`).
    LoadBalancing,
    /// Registered program at a gateway (`program_id` / `tpname`).
    Gateway,
    Unspecified,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Named => write!(f, "named destination"),
            Destination::ApplicationServer => write!(f, "application server"),
            Destination::LoadBalancing => write!(f, "load balancing"),
            Destination::Gateway => write!(f, "gateway program"),
            Destination::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Parameters handed to the native connection at construction.
///
/// Field names follow the SDK keys. Nothing here is validated; the native
/// connection decides what is acceptable.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParameters {
    // general
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saprouter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snc_lib: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snc_myname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snc_partnername: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snc_qop: Option<SncQop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceLevel>,

    // logon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passwd: Option<String>,
    pub client: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysapsso2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub getsso2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x509cert: Option<String>,

    // specific server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ashost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysnr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gwhost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gwserv: Option<String>,

    // load balancing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r3name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sysid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mshost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msserv: Option<String>,

    // gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tpname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,
}

impl ConnectionParameters {
    pub fn new(client: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user: impl Into<String>, passwd: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.passwd = Some(passwd.into());
        self
    }

    pub fn with_sso_ticket(mut self, ticket: impl Into<String>) -> Self {
        self.mysapsso2 = Some(ticket.into());
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    pub fn with_application_server(
        mut self,
        ashost: impl Into<String>,
        sysnr: impl Into<String>,
    ) -> Self {
        self.ashost = Some(ashost.into());
        self.sysnr = Some(sysnr.into());
        self
    }

    pub fn with_message_server(
        mut self,
        mshost: impl Into<String>,
        sysid: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        self.mshost = Some(mshost.into());
        self.sysid = Some(sysid.into());
        self.group = Some(group.into());
        self
    }

    pub fn with_gateway_program(
        mut self,
        gwhost: impl Into<String>,
        gwserv: impl Into<String>,
        program_id: impl Into<String>,
    ) -> Self {
        self.gwhost = Some(gwhost.into());
        self.gwserv = Some(gwserv.into());
        self.program_id = Some(program_id.into());
        self
    }

    pub fn with_saprouter(mut self, saprouter: impl Into<String>) -> Self {
        self.saprouter = Some(saprouter.into());
        self
    }

    pub fn with_snc(
        mut self,
        snc_lib: impl Into<String>,
        snc_partnername: impl Into<String>,
        qop: SncQop,
    ) -> Self {
        self.snc_lib = Some(snc_lib.into());
        self.snc_partnername = Some(snc_partnername.into());
        self.snc_qop = Some(qop);
        self
    }

    pub fn with_trace(mut self, trace: TraceLevel) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Classifies the destination selection strategy.
    ///
    /// A named destination wins, then direct application server, then load
    /// balancing, then gateway program.
    pub fn destination(&self) -> Destination {
        if self.dest.is_some() {
            Destination::Named
        } else if self.ashost.is_some() {
            Destination::ApplicationServer
        } else if self.mshost.is_some() || self.group.is_some() || self.r3name.is_some() {
            Destination::LoadBalancing
        } else if self.program_id.is_some() || self.tpname.is_some() {
            Destination::Gateway
        } else {
            Destination::Unspecified
        }
    }

    /// Returns the set parameters as `(key, value)` pairs in SDK key names.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        };

        push("saprouter", &self.saprouter);
        push("snc_lib", &self.snc_lib);
        push("snc_myname", &self.snc_myname);
        push("snc_partnername", &self.snc_partnername);
        push("snc_qop", &self.snc_qop.map(|q| q.as_str().to_string()));
        push("trace", &self.trace.map(|t| t.as_str().to_string()));
        push("user", &self.user);
        push("passwd", &self.passwd);
        push("client", &Some(self.client.clone()));
        push("lang", &self.lang);
        push("mysapsso2", &self.mysapsso2);
        push("getsso2", &self.getsso2);
        push("x509cert", &self.x509cert);
        push("dest", &self.dest);
        push("ashost", &self.ashost);
        push("sysnr", &self.sysnr);
        push("gwhost", &self.gwhost);
        push("gwserv", &self.gwserv);
        push("group", &self.group);
        push("r3name", &self.r3name);
        push("sysid", &self.sysid);
        push("mshost", &self.mshost);
        push("msserv", &self.msserv);
        push("tpname", &self.tpname);
        push("program_id", &self.program_id);

        pairs
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ConnectionParameters");
        for (key, value) in self.to_pairs() {
            match key {
                "passwd" | "mysapsso2" | "x509cert" => s.field(key, &"***"),
                _ => s.field(key, &value),
            };
        }
        s.finish()
    }
}

/// Per-invocation options, forwarded to the native connection as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallOptions {
    /// Timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Parameters the backend should neither fill nor return.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub not_requested: Vec<String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn with_not_requested(mut self, name: impl Into<String>) -> Self {
        self.not_requested.push(name.into());
        self
    }

    pub fn is_requested(&self, name: &str) -> bool {
        !self.not_requested.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct() -> ConnectionParameters {
        ConnectionParameters::new("001")
            .with_user("a", "b")
            .with_application_server("host", "00")
    }

    #[test]
    fn test_destination_classification() {
        assert_eq!(direct().destination(), Destination::ApplicationServer);
        assert_eq!(
            ConnectionParameters::new("100")
                .with_message_server("ms", "QI3", "PUBLIC")
                .destination(),
            Destination::LoadBalancing
        );
        assert_eq!(
            ConnectionParameters::new("100")
                .with_gateway_program("gw", "sapgw00", "NODE_RFC")
                .destination(),
            Destination::Gateway
        );
        assert_eq!(
            direct().with_dest("QI3").destination(),
            Destination::Named
        );
        assert_eq!(
            ConnectionParameters::new("100").destination(),
            Destination::Unspecified
        );
    }

    #[test]
    fn test_to_pairs_only_set_fields() {
        let pairs = direct().with_trace(TraceLevel::Verbose).to_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["trace", "user", "passwd", "client", "ashost", "sysnr"]);
        assert!(pairs.contains(&("trace", "2".to_string())));
        assert!(pairs.contains(&("client", "001".to_string())));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let params = direct().with_sso_ticket("TICKET");
        let debug = format!("{:?}", params);
        assert!(debug.contains("ashost"));
        assert!(!debug.contains("\"b\""));
        assert!(!debug.contains("TICKET"));
    }

    #[test]
    fn test_yaml_keys() {
        let yaml = "client: '001'\nuser: a\npasswd: b\nashost: host\nsysnr: '00'\nsnc_qop: '9'\ntrace: '1'\n";
        let params: ConnectionParameters = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.client, "001");
        assert_eq!(params.snc_qop, Some(SncQop::Maximum));
        assert_eq!(params.trace, Some(TraceLevel::Brief));
        assert_eq!(params.ashost.as_deref(), Some("host"));
        assert_eq!(params.sysnr.as_deref(), Some("00"));
        assert!(params.dest.is_none());
    }

    #[test]
    fn test_call_options() {
        let opts = CallOptions::new()
            .with_timeout(10)
            .with_not_requested("ET_RETURN");
        assert!(!opts.is_requested("ET_RETURN"));
        assert!(opts.is_requested("ES_HEADER"));

        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["timeout"], 10);
        assert_eq!(json["notRequested"][0], "ET_RETURN");
    }

    #[test]
    fn test_trace_parse() {
        assert_eq!(TraceLevel::parse("3"), Some(TraceLevel::Full));
        assert_eq!(TraceLevel::parse(" 0 "), Some(TraceLevel::Off));
        assert_eq!(TraceLevel::parse("verbose"), None);
    }
}
