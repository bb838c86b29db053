//! RFC parameter values.

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A named-field record: field name to value.
pub type RfcStructure = BTreeMap<String, RfcValue>;

/// An ordered list of structures.
pub type RfcTable = Vec<RfcStructure>;

/// Value of an RFC parameter, structure field or table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RfcValue {
    Text(String),
    Int(i64),
    Float(f64),
    #[serde(serialize_with = "serialize_binary")]
    Binary(Vec<u8>),
    /// Ordered list of scalars.
    Array(Vec<RfcValue>),
    Structure(RfcStructure),
    Table(RfcTable),
}

fn serialize_binary<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

impl RfcValue {
    /// Human-readable name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RfcValue::Text(_) => "text",
            RfcValue::Int(_) => "integer",
            RfcValue::Float(_) => "float",
            RfcValue::Binary(_) => "binary",
            RfcValue::Array(_) => "array",
            RfcValue::Structure(_) => "structure",
            RfcValue::Table(_) => "table",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RfcValue::Text(_) | RfcValue::Int(_) | RfcValue::Float(_) | RfcValue::Binary(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RfcValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RfcValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RfcValue::Int(n) => Some(*n as f64),
            RfcValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RfcValue::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&RfcStructure> {
        match self {
            RfcValue::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&RfcTable> {
        match self {
            RfcValue::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Consumes the value, returning the structure if it is one.
    pub fn into_structure(self) -> Result<RfcStructure, RfcValue> {
        match self {
            RfcValue::Structure(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl From<&str> for RfcValue {
    fn from(s: &str) -> Self {
        RfcValue::Text(s.to_string())
    }
}

impl From<String> for RfcValue {
    fn from(s: String) -> Self {
        RfcValue::Text(s)
    }
}

impl From<i64> for RfcValue {
    fn from(n: i64) -> Self {
        RfcValue::Int(n)
    }
}

impl From<i32> for RfcValue {
    fn from(n: i32) -> Self {
        RfcValue::Int(n.into())
    }
}

impl From<f64> for RfcValue {
    fn from(n: f64) -> Self {
        RfcValue::Float(n)
    }
}

impl From<Vec<u8>> for RfcValue {
    fn from(b: Vec<u8>) -> Self {
        RfcValue::Binary(b)
    }
}

impl From<&[u8]> for RfcValue {
    fn from(b: &[u8]) -> Self {
        RfcValue::Binary(b.to_vec())
    }
}

impl From<RfcStructure> for RfcValue {
    fn from(s: RfcStructure) -> Self {
        RfcValue::Structure(s)
    }
}

impl From<RfcTable> for RfcValue {
    fn from(t: RfcTable) -> Self {
        RfcValue::Table(t)
    }
}

impl<K: Into<String>, V: Into<RfcValue>> FromIterator<(K, V)> for RfcValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RfcValue::Structure(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// JSON objects become structures, arrays of objects become tables and any
/// other array becomes an array. `null` maps to empty text.
impl From<Value> for RfcValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RfcValue::Text(String::new()),
            Value::Bool(b) => RfcValue::Text(if b { "X" } else { "" }.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => RfcValue::Int(i),
                None => RfcValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => RfcValue::Text(s),
            Value::Object(map) => RfcValue::Structure(
                map.into_iter()
                    .map(|(k, v)| (k, RfcValue::from(v)))
                    .collect(),
            ),
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(Value::is_object) {
                    RfcValue::Table(
                        items
                            .into_iter()
                            .filter_map(|item| RfcValue::from(item).into_structure().ok())
                            .collect(),
                    )
                } else {
                    RfcValue::Array(items.into_iter().map(RfcValue::from).collect())
                }
            }
        }
    }
}
