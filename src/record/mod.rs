//! Contact records and the rows they persist as.
//!
//! # Data Flow
//! ```text
//! JSON body / packed `data` field / discrete parameters
//!     → Record (all text, blanks for anything missing)
//!     → Row (six fixed columns, timestamp filled in)
//!     → RowStore::append
//! ```

pub mod timestamp;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use timestamp::Timestamper;

/// Column order of a persisted row.
pub const COLUMNS: [&str; 6] = ["timestamp", "name", "phone", "email", "company", "message"];

/// A contact submission.
///
/// Every field is plain text; an empty string means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timestamp: String,
}

impl Record {
    /// Parse a JSON document into a record.
    ///
    /// The document must be an object. Field values of any JSON type are
    /// accepted and coerced to text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value)
    }

    /// True when at least one of name, email or message carries text.
    ///
    /// Read-style requests without any of these are treated as status checks.
    pub fn has_contact_content(&self) -> bool {
        !self.name.is_empty() || !self.email.is_empty() || !self.message.is_empty()
    }

    /// Names of the fields a form must fill before submitting.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Copy of this record with a timestamp, generating one if it is blank.
    pub fn stamped(&self, clock: &Timestamper) -> Self {
        let mut record = self.clone();
        if record.timestamp.is_empty() {
            record.timestamp = clock.now();
        }
        record
    }
}

/// One persisted row: timestamp, name, phone, email, company, message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row([String; 6]);

impl Row {
    /// Lay a record out in column order, generating a timestamp if needed.
    pub fn from_record(record: &Record, clock: &Timestamper) -> Self {
        let timestamp = if record.timestamp.is_empty() {
            clock.now()
        } else {
            record.timestamp.clone()
        };

        Self([
            timestamp,
            record.name.clone(),
            record.phone.clone(),
            record.email.clone(),
            record.company.clone(),
            record.message.clone(),
        ])
    }

    pub fn columns(&self) -> &[String; 6] {
        &self.0
    }

    pub fn timestamp(&self) -> &str {
        &self.0[0]
    }

    /// Column names paired with their values, in row order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, &str)> {
        COLUMNS.into_iter().zip(self.0.iter().map(String::as_str))
    }
}

impl From<[String; 6]> for Row {
    fn from(columns: [String; 6]) -> Self {
        Self(columns)
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        // Zero counts as "not supplied", like null and false.
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        compound @ (Value::Array(_) | Value::Object(_)) => compound.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
