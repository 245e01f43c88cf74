//! JSON body encoding and decoding with client-wide options.
//!
//! `serde_json` does the actual parsing and writing. [`SerializerOptions`]
//! adds what a REST client needs on top: a field naming policy, a nesting
//! limit, null handling and pretty output, applied identically to both
//! directions.

mod naming;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use self::naming::{FieldMatcher, FieldRenamer};
use crate::error::{ConfigError, ValidationError};

pub use self::naming::NamingPolicy;

/// Content type of every encoded request body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Default nesting limit for encoded and decoded documents.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options applied to every body one client encodes or decodes.
///
/// Deserializable with defaults for missing fields, so it can be loaded from a
/// configuration file or built from name/value pairs with
/// [`from_pairs`](SerializerOptions::from_pairs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializerOptions {
    /// Key naming policy.
    pub naming: NamingPolicy,
    /// Maximum nesting of objects and arrays.
    pub max_depth: usize,
    /// Indent encoded output.
    pub pretty: bool,
    /// Drop `null` object members when encoding.
    pub skip_nulls: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            naming: NamingPolicy::AsIs,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty: false,
            skip_nulls: false,
        }
    }
}

impl SerializerOptions {
    /// Builds options from option names and values.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use rest_pipeline::{NamingPolicy, SerializerOptions};
    /// use serde_json::json;
    ///
    /// let options = SerializerOptions::from_pairs([
    ///     ("naming", json!("camel_case")),
    ///     ("max_depth", json!(16)),
    /// ])
    /// .unwrap();
    /// assert_eq!(options.naming, NamingPolicy::CamelCase);
    /// assert_eq!(options.max_depth, 16);
    /// ```
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for unknown names or values of
    /// the wrong type.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map: Map<String, Value> = pairs.into_iter().map(|(k, v)| (k.into(), v)).collect();
        serde_json::from_value(Value::Object(map))
            .map_err(|e| ConfigError::InvalidOption(e.to_string()))
    }

    /// Encodes `value` as a JSON body.
    ///
    /// Returns `None` when the value serializes to `null`; such a request is
    /// sent without content.
    ///
    /// ## Errors
    ///
    /// - [`ValidationError::JsonEncode`] if serde cannot serialize the value
    /// - [`ValidationError::DepthExceeded`] if it nests deeper than `max_depth`
    pub fn encode<T>(&self, value: &T) -> Result<Option<Bytes>, ValidationError>
    where
        T: Serialize + ?Sized,
    {
        let mut document = match self.naming {
            NamingPolicy::AsIs => serde_json::to_value(value),
            naming => value.serialize(FieldRenamer::new(naming)),
        }
        .map_err(ValidationError::JsonEncode)?;
        if document.is_null() {
            return Ok(None);
        }
        self.check_depth(&document)?;
        if self.skip_nulls {
            strip_nulls(&mut document);
        }

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)
        } else {
            serde_json::to_vec(&document)
        }
        .map_err(ValidationError::JsonEncode)?;
        Ok(Some(Bytes::from(bytes)))
    }

    /// Decodes a JSON body.
    ///
    /// An empty or whitespace-only body, and a literal `null`, decode to
    /// `None`.
    ///
    /// ## Errors
    ///
    /// - [`ValidationError::JsonParse`] on malformed JSON or a shape that does
    ///   not fit `T`
    /// - [`ValidationError::DepthExceeded`] if the document nests deeper than
    ///   `max_depth`
    pub fn decode<T>(&self, body: &[u8]) -> Result<Option<T>, ValidationError>
    where
        T: DeserializeOwned,
    {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let document: Value = serde_json::from_slice(body).map_err(ValidationError::JsonParse)?;
        if document.is_null() {
            return Ok(None);
        }
        self.check_depth(&document)?;
        match self.naming {
            NamingPolicy::AsIs => T::deserialize(document),
            naming => T::deserialize(FieldMatcher::new(document, naming)),
        }
        .map(Some)
        .map_err(ValidationError::JsonParse)
    }

    fn check_depth(&self, document: &Value) -> Result<(), ValidationError> {
        if depth(document) > self.max_depth {
            return Err(ValidationError::DepthExceeded {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
        Value::Object(members) => 1 + members.values().map(depth).max().unwrap_or(0),
        _ => 0,
    }
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, v| !v.is_null());
            members.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
