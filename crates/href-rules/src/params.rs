//! Parameter maps and match results
//!
//! Rules speak in plain string maps. Typed parameters are layered on top with
//! serde: a struct serializes into a [`Params`] map for generation and a
//! [`Match`] deserializes back into the struct.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::RuleError;

/// Parameter name → value
///
/// Ordered so that iteration (and therefore debug output) is deterministic.
pub type Params = BTreeMap<String, String>;

/// Builds a [`Params`] map from name/value pairs
///
/// # Examples
///
/// ```
/// use href_rules::params_from_pairs;
///
/// let params = params_from_pairs(&[("accId", "123")]);
/// assert_eq!(params.get("accId").map(String::as_str), Some("123"));
/// ```
pub fn params_from_pairs(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Flattens a serializable struct into a [`Params`] map
///
/// Strings are kept, numbers and booleans are stringified, `None`/null fields
/// are left out. Nested arrays and objects are rejected.
///
/// # Examples
///
/// ```
/// use href_rules::params_from;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Account { acc_id: u32, name: Option<String> }
///
/// let params = params_from(&Account { acc_id: 7, name: None }).unwrap();
/// assert_eq!(params.get("acc_id").map(String::as_str), Some("7"));
/// assert!(!params.contains_key("name"));
/// ```
pub fn params_from<T: Serialize>(value: &T) -> Result<Params, RuleError> {
    let object = match serde_json::to_value(value)? {
        Value::Object(object) => object,
        Value::Null => return Ok(Params::new()),
        other => {
            return Err(RuleError::Params(format!(
                "expected a struct or map, got {other}"
            )))
        }
    };

    let mut params = Params::new();
    for (name, value) in object {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(RuleError::Params(format!(
                    "parameter {name:?} must be a scalar value"
                )))
            }
        };
        params.insert(name, value);
    }
    Ok(params)
}

/// A successful match: the extracted parameters and the URL they came from
///
/// `params` is always a fresh map owned by the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub params: Params,
    pub url: Url,
}

impl Match {
    pub fn new(params: Params, url: Url) -> Self {
        Self { params, url }
    }

    /// Gets a single parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Deserializes the parameters into a typed value
    ///
    /// All values are strings, so numeric fields need a string-accepting
    /// deserializer (or be declared as `String`).
    ///
    /// # Examples
    ///
    /// ```
    /// use href_rules::{Location, Rule};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Account {
    ///     #[serde(rename = "accId")]
    ///     acc_id: String,
    ///     #[serde(rename = "accName")]
    ///     acc_name: Option<String>,
    /// }
    ///
    /// let location = Location::parse("http://localhost/").unwrap();
    /// let rule = Rule::new().with_path("/:accId/:accName?");
    /// let account: Account = rule.matches(&location, "/42").unwrap().parse().unwrap();
    /// assert_eq!(account.acc_id, "42");
    /// assert!(account.acc_name.is_none());
    /// ```
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, RuleError> {
        let object = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}
