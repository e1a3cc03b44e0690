//! Key-value configuration sources feeding the global settings layer.

use indexmap::IndexMap;

/// Errors raised while reading typed values from a [`ConfigSource`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigError {
    /// The value of a key cannot be converted to the expected type.
    #[display("Invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// The raw value.
        value: String,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// An HTTP method name is not known.
    #[display("Unknown HTTP method '{value}'")]
    UnknownHttpMethod {
        /// The rejected method name.
        value: String,
    },
}

/// A process-wide key-value configuration provider.
///
/// Keys are dotted names such as `restcall.host` or `restcall.http.header.Accept`.
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value of a key.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns every entry whose key starts with `prefix`, with the prefix removed from
    /// the returned keys. Entries with nothing after the prefix are skipped.
    fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)>;

    /// Reads a boolean (`true`/`false`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value is not a boolean.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                expected: "a boolean",
            }),
        }
    }

    /// Reads a port number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value is not a valid port.
    fn get_u16(&self, key: &str) -> Result<Option<u16>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                expected: "a port number",
            })
    }
}

/// In-memory, insertion-ordered [`ConfigSource`].
///
/// Values can be collected from an iterator or parsed from `.properties` text:
///
/// ```rust
/// use restcall_core::{ConfigSource, Properties};
///
/// let properties = Properties::parse(
///     r"
///     # connection
///     restcall.host = www.example.com
///     restcall.port: 8080
///     ",
/// );
///
/// assert_eq!(properties.get("restcall.host").as_deref(), Some("www.example.com"));
/// assert_eq!(properties.get_u16("restcall.port"), Ok(Some(8080)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: IndexMap<String, String>,
}

impl Properties {
    /// Creates an empty set of properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `.properties` text.
    ///
    /// Each non blank line is `key = value` or `key: value`, the first separator wins.
    /// Lines starting with `#` or `!` are comments. Keys and values are trimmed. A line
    /// without separator defines a key with an empty value.
    pub fn parse(text: &str) -> Self {
        let mut result = Self::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line.split_once(['=', ':']).unwrap_or((line, ""));
            result.set(key.trim(), value.trim());
        }
        result
    }

    /// Sets a property, replacing a previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Removes a property.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.shift_remove(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there is no property.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for Properties {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(prefix)?;
                (!name.is_empty()).then(|| (name.to_string(), value.clone()))
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let values = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { values }
    }
}
