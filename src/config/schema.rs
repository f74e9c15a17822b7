//! Configuration schema: field descriptors and the ordered schema table
//!
//! # Overview
//!
//! A [`ConfigSchema`] is an ordered table of [`FieldDescriptor`]s. Each
//! descriptor declares:
//!
//! - the profile key and its default value
//! - whether the field belongs in a profile at all
//! - a base-profile transform applied on every base-profile reset
//! - a URL codec (encode to a query parameter, decode back) and a validator
//!
//! Every transform is a plain total function. Descriptors built with
//! [`FieldDescriptor::new`] start with an identity base transform, a URL
//! codec that returns every value unchanged (JSON text on the wire) and an
//! always-true validator, so the store never special-cases a missing
//! transform.
//!
//! The typed constructors ([`text`](FieldDescriptor::text),
//! [`number`](FieldDescriptor::number), [`toggle`](FieldDescriptor::toggle),
//! [`list`](FieldDescriptor::list), [`object`](FieldDescriptor::object))
//! install a codec and a type check matching the value shape.
//!
//! ```
//! use termprofiles::{ConfigSchema, FieldDescriptor};
//! use serde_json::json;
//!
//! let schema = ConfigSchema::new(vec![
//!     FieldDescriptor::text("shellCommand", "/bin/sh"),
//!     FieldDescriptor::number("fontSize", 14).min(1.0).max(100.0),
//!     FieldDescriptor::toggle("copyOnSelect", false),
//!     FieldDescriptor::text("userDataPath", "/tmp").not_in_profile(),
//! ]);
//!
//! assert!(schema.validate().is_ok());
//! assert_eq!(schema.profile_keys(), vec!["shellCommand", "fontSize", "copyOnSelect"]);
//! assert_eq!(schema.default_profile()["fontSize"], json!(14));
//! ```

use crate::error::{Error, Result};
use crate::profile::Profile;

use regex::Regex;
use serde_json::{Number, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Base-profile transform: previous base value to new base value
pub type BaseTransform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Encodes a field value into a URL query parameter
pub type UrlEncoder = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Decodes a URL query parameter; `None` means the parameter is malformed
pub type UrlDecoder = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// Validates a decoded field value
pub type UrlValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

// =============================================================================
// Field Types
// =============================================================================

/// Shape of a field's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldType {
    /// Any JSON value, JSON codec
    #[default]
    Any,
    /// String
    Text,
    /// Number (integer or float)
    Number,
    /// Boolean
    Toggle,
    /// List of strings
    List,
    /// JSON object (or null)
    Object,
}

impl FieldType {
    /// Whether `value` has this shape
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::Text => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Toggle => value.is_boolean(),
            FieldType::List => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldType::Object => value.is_object() || value.is_null(),
        }
    }
}

/// Numeric and textual constraints checked by the validator
#[derive(Debug, Clone, Default)]
pub struct FieldConstraints {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Regex>,
    /// Set when `pattern()` was given an invalid regex; reported by `validate()`
    invalid_pattern: Option<String>,
}

// =============================================================================
// Default transforms
// =============================================================================

fn identity_base() -> BaseTransform {
    Arc::new(|prev: &Value| prev.clone())
}

/// Values as JSON text, except strings that would not parse as JSON, which
/// stay verbatim so hand-typed parameters read naturally
fn untyped_encoder() -> UrlEncoder {
    Arc::new(|value: &Value| match value {
        Value::String(s) if serde_json::from_str::<Value>(s).is_err() => s.clone(),
        other => other.to_string(),
    })
}

/// JSON text, falling back to the raw parameter as a string
fn untyped_decoder() -> UrlDecoder {
    Arc::new(|param: &str| {
        Some(serde_json::from_str(param).unwrap_or_else(|_| Value::String(param.to_string())))
    })
}

fn text_encoder() -> UrlEncoder {
    Arc::new(|value: &Value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn text_decoder() -> UrlDecoder {
    Arc::new(|param: &str| Some(Value::String(param.to_string())))
}

fn always_valid() -> UrlValidator {
    Arc::new(|_: &Value| true)
}

fn json_encoder() -> UrlEncoder {
    Arc::new(|value: &Value| value.to_string())
}

fn json_decoder() -> UrlDecoder {
    Arc::new(|param: &str| serde_json::from_str(param).ok())
}

fn number_decoder() -> UrlDecoder {
    Arc::new(|param: &str| {
        let param = param.trim();
        if let Ok(n) = param.parse::<i64>() {
            return Some(Value::Number(n.into()));
        }
        param
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    })
}

fn toggle_decoder() -> UrlDecoder {
    Arc::new(|param: &str| {
        if param.eq_ignore_ascii_case("true") {
            Some(Value::Bool(true))
        } else if param.eq_ignore_ascii_case("false") {
            Some(Value::Bool(false))
        } else {
            None
        }
    })
}

// =============================================================================
// Field Descriptor
// =============================================================================

/// One entry of the configuration schema
#[derive(Clone)]
pub struct FieldDescriptor {
    key: String,
    field_type: FieldType,
    default: Value,
    in_profile: bool,
    constraints: FieldConstraints,
    to_base_profile: BaseTransform,
    to_url_param: UrlEncoder,
    from_url_param: UrlDecoder,
    check_url_param: UrlValidator,
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("in_profile", &self.in_profile)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}

impl FieldDescriptor {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Untyped field with a JSON codec and an always-true validator
    pub fn new(key: impl Into<String>, default: Value) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Any,
            default,
            in_profile: true,
            constraints: FieldConstraints::default(),
            to_base_profile: identity_base(),
            to_url_param: untyped_encoder(),
            from_url_param: untyped_decoder(),
            check_url_param: always_valid(),
        }
    }

    /// String field
    pub fn text(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            field_type: FieldType::Text,
            to_url_param: text_encoder(),
            from_url_param: text_decoder(),
            ..Self::new(key, Value::String(default.into()))
        }
    }

    /// Numeric field
    pub fn number(key: impl Into<String>, default: impl Into<Number>) -> Self {
        Self {
            field_type: FieldType::Number,
            from_url_param: number_decoder(),
            ..Self::new(key, Value::Number(default.into()))
        }
    }

    /// Boolean field, encoded as `true` / `false`
    pub fn toggle(key: impl Into<String>, default: bool) -> Self {
        Self {
            field_type: FieldType::Toggle,
            from_url_param: toggle_decoder(),
            ..Self::new(key, Value::Bool(default))
        }
    }

    /// List-of-strings field, encoded as JSON text
    pub fn list(key: impl Into<String>, default: &[&str]) -> Self {
        let items = default.iter().map(|s| Value::String((*s).to_string())).collect();
        Self {
            field_type: FieldType::List,
            to_url_param: json_encoder(),
            from_url_param: json_decoder(),
            ..Self::new(key, Value::Array(items))
        }
    }

    /// Object field (null allowed), encoded as JSON text
    pub fn object(key: impl Into<String>, default: Value) -> Self {
        Self {
            field_type: FieldType::Object,
            to_url_param: json_encoder(),
            from_url_param: json_decoder(),
            ..Self::new(key, default)
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Exclude this field from profiles
    #[must_use]
    pub fn not_in_profile(mut self) -> Self {
        self.in_profile = false;
        self
    }

    /// Set the transform applied to the previous base value on reset
    #[must_use]
    pub fn to_base_profile<F>(mut self, transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.to_base_profile = Arc::new(transform);
        self
    }

    /// Set the URL encode/decode pair
    #[must_use]
    pub fn url_codec<E, D>(mut self, encode: E, decode: D) -> Self
    where
        E: Fn(&Value) -> String + Send + Sync + 'static,
        D: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.to_url_param = Arc::new(encode);
        self.from_url_param = Arc::new(decode);
        self
    }

    /// Set an extra validation predicate, checked after the type and constraints
    #[must_use]
    pub fn check_url_param<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check_url_param = Arc::new(check);
        self
    }

    /// Minimum value for number fields
    #[must_use]
    pub fn min(mut self, val: f64) -> Self {
        self.constraints.min = Some(val);
        self
    }

    /// Maximum value for number fields
    #[must_use]
    pub fn max(mut self, val: f64) -> Self {
        self.constraints.max = Some(val);
        self
    }

    /// Regex that string values must match
    ///
    /// An invalid pattern rejects every value and is reported by
    /// [`ConfigSchema::validate`].
    #[must_use]
    pub fn pattern(mut self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => {
                self.constraints.pattern = Some(re);
                self.constraints.invalid_pattern = None;
            }
            Err(e) => {
                self.constraints.pattern = None;
                self.constraints.invalid_pattern = Some(format!("invalid pattern '{pattern}': {e}"));
            }
        }
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn in_profile(&self) -> bool {
        self.in_profile
    }

    pub fn constraints(&self) -> &FieldConstraints {
        &self.constraints
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Apply the base-profile transform
    pub fn base_value(&self, previous: &Value) -> Value {
        (self.to_base_profile)(previous)
    }

    /// Encode a value as a URL query parameter
    pub fn encode_param(&self, value: &Value) -> String {
        (self.to_url_param)(value)
    }

    /// Decode and validate a URL query parameter
    ///
    /// Returns `None` when the parameter is malformed or the decoded value
    /// is rejected.
    pub fn decode_param(&self, param: &str) -> Option<Value> {
        (self.from_url_param)(param).filter(|value| self.is_valid(value))
    }

    /// Whether `value` passes the type check, constraints and custom predicate
    pub fn is_valid(&self, value: &Value) -> bool {
        if !self.field_type.accepts(value) || self.constraints.invalid_pattern.is_some() {
            return false;
        }
        if let Some(n) = value.as_f64() {
            if self.constraints.min.is_some_and(|min| n < min)
                || self.constraints.max.is_some_and(|max| n > max)
            {
                return false;
            }
        }
        if let (Some(re), Some(s)) = (&self.constraints.pattern, value.as_str()) {
            if !re.is_match(s) {
                return false;
            }
        }
        (self.check_url_param)(value)
    }

    /// Check that the descriptor itself is well-formed
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`] for an empty key, an invalid pattern,
    /// `min > max`, or a default value that fails its own validation.
    pub fn validate_descriptor(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidField {
            key: self.key.clone(),
            reason,
        };

        if self.key.is_empty() {
            return Err(invalid("key cannot be empty".into()));
        }
        if let Some(reason) = &self.constraints.invalid_pattern {
            return Err(invalid(reason.clone()));
        }
        if let (Some(min), Some(max)) = (self.constraints.min, self.constraints.max) {
            if min > max {
                return Err(invalid(format!("min ({min}) cannot be greater than max ({max})")));
            }
        }
        if !self.is_valid(&self.default) {
            return Err(invalid(format!("default value {} fails validation", self.default)));
        }
        Ok(())
    }
}

// =============================================================================
// Config Schema
// =============================================================================

/// Ordered table of field descriptors
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    fields: Vec<FieldDescriptor>,
}

impl ConfigSchema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// All descriptors in declaration order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptors that belong in a profile, in declaration order
    pub fn profile_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.in_profile)
    }

    /// Keys of the profile fields, in declaration order
    pub fn profile_keys(&self) -> Vec<&str> {
        self.profile_fields().map(FieldDescriptor::key).collect()
    }

    /// Look up a descriptor by key
    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Profile built from every profile field's default value
    pub fn default_profile(&self) -> Profile {
        self.profile_fields()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }

    /// Validate every descriptor and reject duplicate keys
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::InvalidField`] found.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate_descriptor()?;
            if !seen.insert(field.key.as_str()) {
                return Err(Error::InvalidField {
                    key: field.key.clone(),
                    reason: "duplicate key".into(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<FieldDescriptor> for ConfigSchema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
