use crate::error::TypeError;
use serde_json::Value;

/// Placeholder rendered for null or missing cell values in every export
/// format and table view.
pub const MISSING_VALUE: &str = "—";

/// A partial field map sent to the backend on create/update.
pub type FieldMap = serde_json::Map<String, Value>;

/// Stable identifier of a backend-owned record.
///
/// The backend may emit ids as JSON strings or integers; both normalise to
/// the string form here. The client never interprets the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Err(serde::de::Error::custom("record id cannot be empty"));
        }
        Ok(Self(raw))
    }
}

/// One backend-owned entity instance (patient, appointment, ...).
///
/// Records are opaque: an id plus a map of named fields. The manager never
/// interprets fields beyond what display, filtering and the rescheduling
/// status guard need.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: serde_json::Map<String, Value>,
}

impl Record {
    /// Builds a record from a backend JSON value.
    ///
    /// The value must be an object carrying an `id` field that is either a
    /// string or an integer; anything else is a malformed record.
    pub fn from_value(value: Value) -> Result<Self, TypeError> {
        let fields = match value {
            Value::Object(map) => map,
            _ => return Err(TypeError::NotAnObject),
        };
        let id = match fields.get("id") {
            Some(Value::String(s)) if !s.is_empty() => RecordId::new(s.clone()),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => RecordId::from(i),
                None => return Err(TypeError::MissingId),
            },
            _ => return Err(TypeError::MissingId),
        };
        Ok(Self { id, fields })
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Stringifies a field for display, falling back to [`MISSING_VALUE`]
    /// for null or absent values.
    pub fn display_value(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => MISSING_VALUE.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Replaces (or inserts) a single field in place. Used by controllers
    /// to merge a confirmed mutation into the local cache.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// The record's `status` field, when it carries one.
    pub fn status(&self) -> Option<&str> {
        match self.fields.get("status") {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn fields(&self) -> &serde_json::Map<String, Value> {
        &self.fields
    }
}

impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Record::from_value(value).map_err(serde::de::Error::custom)
    }
}
