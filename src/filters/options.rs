//! Filter option records
//!
//! Filters are configured with a flat map of option names to values. Each
//! filter declares a `ConfigShape` (named, typed, defaulted options) and the
//! raw map is resolved against it before the filter is built.

use super::error::OptionError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the option every filter accepts to set its priority
pub const ORDER_OPTION: &str = "order";

/// A single option value as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Integer(_) => OptionKind::Integer,
            Self::Float(_) => OptionKind::Float,
            Self::Text(_) => OptionKind::Text,
        }
    }

    /// Parse a command-line token: booleans, then integers, then floats, else text
    #[must_use]
    pub fn parse_token(token: &str) -> Self {
        let token = token.trim();
        match token {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(i) = token.parse::<i64>() {
            return Self::Integer(i);
        }
        if let Ok(f) = token.parse::<f64>() {
            return Self::Float(f);
        }
        Self::Text(token.to_string())
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

/// Raw option map passed to the registry unmodified
pub type FilterOptions = BTreeMap<String, OptionValue>;

/// Declared type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Bool,
    Integer,
    Float,
    Text,
}

impl OptionKind {
    /// Whether a value of kind `found` is acceptable for this kind
    ///
    /// Integers are accepted where floats are expected.
    const fn accepts(self, found: Self) -> bool {
        matches!(
            (self, found),
            (Self::Bool, Self::Bool)
                | (Self::Integer, Self::Integer)
                | (Self::Float, Self::Float | Self::Integer)
                | (Self::Text, Self::Text)
        )
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Text => "string",
        };
        f.write_str(s)
    }
}

/// One declared option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigField {
    pub name: String,
    pub kind: OptionKind,
    /// `None` marks a required option
    pub default: Option<OptionValue>,
    pub description: String,
}

/// Declared configuration of a filter
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigShape {
    fields: Vec<ConfigField>,
}

impl ConfigShape {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add the `order` option with a filter-specific default
    #[must_use]
    pub fn order(self, default: i64) -> Self {
        self.optional(
            ORDER_OPTION,
            OptionKind::Integer,
            default,
            "Application priority; lower runs first",
        )
    }

    /// Add an option with a default value
    #[must_use]
    pub fn optional(
        mut self,
        name: &str,
        kind: OptionKind,
        default: impl Into<OptionValue>,
        description: &str,
    ) -> Self {
        self.fields.push(ConfigField {
            name: name.to_string(),
            kind,
            default: Some(default.into()),
            description: description.to_string(),
        });
        self
    }

    /// Add an option the caller must supply
    #[must_use]
    pub fn required(mut self, name: &str, kind: OptionKind, description: &str) -> Self {
        self.fields.push(ConfigField {
            name: name.to_string(),
            kind,
            default: None,
            description: description.to_string(),
        });
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[ConfigField] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&ConfigField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the shape itself: unique names and defaults matching their kind
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err("option with an empty name".to_string());
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(format!("option '{}' declared twice", field.name));
            }
            if let Some(default) = &field.default
                && !field.kind.accepts(default.kind())
            {
                return Err(format!(
                    "default {default} of option '{}' is not a {}",
                    field.name, field.kind
                ));
            }
        }
        Ok(())
    }

    /// Resolve a raw option map against this shape
    ///
    /// Fills in defaults, checks types and rejects undeclared keys.
    ///
    /// # Errors
    ///
    /// Returns `OptionError` for a missing required option, a wrongly typed
    /// value, or an undeclared option.
    pub fn resolve(&self, filter: &str, options: &FilterOptions) -> Result<ResolvedOptions, OptionError> {
        if let Some(unknown) = options.keys().find(|k| self.field(k).is_none()) {
            return Err(OptionError::Unknown {
                filter: filter.to_string(),
                option: unknown.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for field in &self.fields {
            let value = match (options.get(&field.name), &field.default) {
                (Some(value), _) => value.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(OptionError::Missing {
                        filter: filter.to_string(),
                        option: field.name.clone(),
                    });
                }
            };

            if !field.kind.accepts(value.kind()) {
                return Err(OptionError::WrongType {
                    filter: filter.to_string(),
                    option: field.name.clone(),
                    expected: field.kind.to_string(),
                    found: value.kind().to_string(),
                });
            }
            values.insert(field.name.clone(), value);
        }

        Ok(ResolvedOptions {
            filter: filter.to_string(),
            values,
        })
    }
}

/// Options that passed `ConfigShape::resolve`
///
/// Every declared option is present with a value of the declared kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    filter: String,
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    /// Name of the filter these options were resolved for
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn value(&self, name: &str) -> Result<&OptionValue, OptionError> {
        self.values.get(name).ok_or_else(|| OptionError::Missing {
            filter: self.filter.clone(),
            option: name.to_string(),
        })
    }

    fn wrong_type(&self, name: &str, expected: OptionKind, found: &OptionValue) -> OptionError {
        OptionError::WrongType {
            filter: self.filter.clone(),
            option: name.to_string(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns `OptionError` if the option is absent or not a bool.
    pub fn bool(&self, name: &str) -> Result<bool, OptionError> {
        match self.value(name)? {
            OptionValue::Bool(b) => Ok(*b),
            other => Err(self.wrong_type(name, OptionKind::Bool, other)),
        }
    }

    /// # Errors
    ///
    /// Returns `OptionError` if the option is absent or not an integer.
    pub fn integer(&self, name: &str) -> Result<i64, OptionError> {
        match self.value(name)? {
            OptionValue::Integer(i) => Ok(*i),
            other => Err(self.wrong_type(name, OptionKind::Integer, other)),
        }
    }

    /// # Errors
    ///
    /// Returns `OptionError` if the option is absent or not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn float(&self, name: &str) -> Result<f64, OptionError> {
        match self.value(name)? {
            OptionValue::Float(x) => Ok(*x),
            OptionValue::Integer(i) => Ok(*i as f64),
            other => Err(self.wrong_type(name, OptionKind::Float, other)),
        }
    }

    /// # Errors
    ///
    /// Returns `OptionError` if the option is absent or not a string.
    pub fn text(&self, name: &str) -> Result<&str, OptionError> {
        match self.value(name)? {
            OptionValue::Text(s) => Ok(s),
            other => Err(self.wrong_type(name, OptionKind::Text, other)),
        }
    }

    /// The `order` option narrowed to `i32`
    ///
    /// # Errors
    ///
    /// Returns `OptionError` if `order` is absent, not an integer, or out of range.
    pub fn order(&self) -> Result<i32, OptionError> {
        let order = self.integer(ORDER_OPTION)?;
        i32::try_from(order)
            .map_err(|_| OptionError::invalid(&self.filter, ORDER_OPTION, format!("{order} is out of range")))
    }

    /// A float option that must be finite and strictly positive
    ///
    /// # Errors
    ///
    /// Returns `OptionError` if the value is missing, mistyped, or not positive.
    pub fn positive_float(&self, name: &str) -> Result<f64, OptionError> {
        let value = self.float(name)?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(OptionError::invalid(&self.filter, name, format!("{value} must be a positive number")))
        }
    }

    /// An integer option that must be strictly positive
    ///
    /// # Errors
    ///
    /// Returns `OptionError` if the value is missing, mistyped, or not positive.
    pub fn positive_integer(&self, name: &str) -> Result<u64, OptionError> {
        let value = self.integer(name)?;
        u64::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| OptionError::invalid(&self.filter, name, format!("{value} must be a positive integer")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> ConfigShape {
        ConfigShape::new()
            .required("step", OptionKind::Float, "Bucket width")
            .optional("label", OptionKind::Text, "x", "Label prefix")
            .order(3)
    }

    fn options(pairs: &[(&str, OptionValue)]) -> FilterOptions {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let resolved = shape()
            .resolve("demo", &options(&[("step", OptionValue::Float(2.5))]))
            .unwrap();
        assert_eq!(resolved.float("step").unwrap(), 2.5);
        assert_eq!(resolved.text("label").unwrap(), "x");
        assert_eq!(resolved.order().unwrap(), 3);
        assert_eq!(resolved.filter(), "demo");
    }

    #[test]
    fn test_resolve_accepts_integer_for_float() {
        let resolved = shape()
            .resolve("demo", &options(&[("step", OptionValue::Integer(4))]))
            .unwrap();
        assert_eq!(resolved.float("step").unwrap(), 4.0);
    }

    #[test]
    fn test_resolve_missing_required() {
        let err = shape().resolve("demo", &FilterOptions::new()).unwrap_err();
        assert_eq!(
            err,
            OptionError::Missing {
                filter: "demo".into(),
                option: "step".into()
            }
        );
    }

    #[test]
    fn test_resolve_rejects_wrong_type() {
        let err = shape()
            .resolve("demo", &options(&[("step", OptionValue::Text("big".into()))]))
            .unwrap_err();
        assert!(matches!(err, OptionError::WrongType { ref option, .. } if option == "step"));
    }

    #[test]
    fn test_resolve_rejects_unknown_option() {
        let err = shape()
            .resolve(
                "demo",
                &options(&[("step", OptionValue::Float(1.0)), ("colour", OptionValue::Bool(true))]),
            )
            .unwrap_err();
        assert!(matches!(err, OptionError::Unknown { ref option, .. } if option == "colour"));
    }

    #[test]
    fn test_order_out_of_range() {
        let resolved = shape()
            .resolve(
                "demo",
                &options(&[("step", OptionValue::Float(1.0)), ("order", OptionValue::Integer(i64::MAX))]),
            )
            .unwrap();
        assert!(matches!(resolved.order(), Err(OptionError::Invalid { .. })));
    }

    #[test]
    fn test_positive_checks() {
        let shape = ConfigShape::new()
            .optional("n", OptionKind::Integer, 0_i64, "")
            .optional("x", OptionKind::Float, -1.0, "");
        let resolved = shape.resolve("demo", &FilterOptions::new()).unwrap();
        assert!(resolved.positive_integer("n").is_err());
        assert!(resolved.positive_float("x").is_err());
    }

    #[test]
    fn test_shape_validate() {
        assert!(shape().validate().is_ok());

        let duplicate = ConfigShape::new().order(0).order(1);
        assert!(duplicate.validate().unwrap_err().contains("declared twice"));

        let mistyped = ConfigShape::new().optional("flag", OptionKind::Bool, "yes", "");
        assert!(mistyped.validate().is_err());
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(OptionValue::parse_token("true"), OptionValue::Bool(true));
        assert_eq!(OptionValue::parse_token("42"), OptionValue::Integer(42));
        assert_eq!(OptionValue::parse_token("2.5"), OptionValue::Float(2.5));
        assert_eq!(OptionValue::parse_token("MB"), OptionValue::Text("MB".into()));
    }
}
