use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PoolError;

/// Ordered query-string parameters, rendered in
/// `application/x-www-form-urlencoded` form by its [`fmt::Display`] impl.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}={}", form_encode(key), form_encode(value))?;
        }

        Ok(())
    }
}

fn form_encode(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());

    for byte in input.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                encoded.push(byte as char);
            }
            b' ' => encoded.push('+'),
            _ => {
                encoded.push('%');
                encoded.push_str(&format!("{byte:02X}"));
            }
        }
    }

    encoded
}

/// The query state a batch of content is loaded for. Handlers receive it
/// in [`Handler::assemble_url`](crate::Handler::assemble_url) and fold the
/// parameters into their URLs however they see fit.
#[derive(Debug, Clone, Default)]
pub struct QueryConfig {
    pub query_string: Option<QueryParams>,
}

impl QueryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query_string(params: QueryParams) -> Self {
        Self {
            query_string: Some(params),
        }
    }

    /// Validate a configuration arriving through a serialization boundary
    /// (embedding layers hand these over as plain JSON).
    ///
    /// A `queryString` member must be an object with string values.
    /// Unknown members are ignored with a warning, so additions on the
    /// embedding side degrade gracefully rather than breaking loading.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidQueryConfig`] when `value` is not an object,
    /// [`PoolError::InvalidQueryString`] when `queryString` has the wrong
    /// type.
    pub fn from_value(value: &Value) -> Result<Self, PoolError> {
        let Value::Object(members) = value else {
            return Err(PoolError::InvalidQueryConfig {
                found: json_type_name(value),
            });
        };

        let mut config = Self::new();

        for (key, member) in members {
            if key == "queryString" {
                config.query_string = Some(query_params_from_value(member)?);
            } else {
                log::warn!("ignoring unknown query configuration member `{key}`");
            }
        }

        Ok(config)
    }
}

fn query_params_from_value(value: &Value) -> Result<QueryParams, PoolError> {
    let Value::Object(members) = value else {
        return Err(PoolError::InvalidQueryString {
            found: json_type_name(value),
        });
    };

    let mut params = QueryParams::new();

    for (key, member) in members {
        let Value::String(text) = member else {
            return Err(PoolError::InvalidQueryString {
                found: json_type_name(member),
            });
        };

        params.append(key.clone(), text.clone());
    }

    Ok(params)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
