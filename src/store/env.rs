//! Environment variable overrides for the base profile
//!
//! Helper struct to encapsulate logic for overriding base-profile values via env vars.

use crate::config::{EnvSource, FieldDescriptor};

use log::warn;
use serde_json::Value;
use std::sync::Arc;

/// Handles environment variable lookups and parsing
pub(crate) struct EnvironmentHandler {
    prefix: Option<String>,
    source: Arc<dyn EnvSource>,
}

impl EnvironmentHandler {
    pub(crate) fn new(prefix: Option<String>, source: Arc<dyn EnvSource>) -> Self {
        Self { prefix, source }
    }

    /// Get the environment variable name for a field key
    ///
    /// Returns None if env var overrides are disabled.
    /// Format: {PREFIX}_{KEY} with camelCase split on humps, all uppercase
    pub(crate) fn get_env_var_name(&self, key: &str) -> Option<String> {
        self.prefix.as_ref().map(|prefix| {
            let mut env_key = String::with_capacity(key.len() + 4);
            let mut prev_lower = false;
            for c in key.chars() {
                if c.is_ascii_uppercase() && prev_lower {
                    env_key.push('_');
                }
                prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
                env_key.push(if c == '.' || c == '-' { '_' } else { c.to_ascii_uppercase() });
            }
            format!("{}_{}", prefix.to_uppercase(), env_key)
        })
    }

    /// Decoded override for `field`, if one is set and valid
    ///
    /// The raw value goes through the field's URL decoder and validator, the
    /// same trust boundary as a profile URI. Invalid overrides are ignored.
    pub(crate) fn get_env_override(&self, field: &FieldDescriptor) -> Option<Value> {
        let name = self.get_env_var_name(field.key())?;
        let raw = self.source.var(&name)?;
        let decoded = field.decode_param(&raw);
        if decoded.is_none() {
            warn!("Ignoring invalid value of {name} for field '{}'", field.key());
        }
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn handler(prefix: Option<&str>, vars: &[(&str, &str)]) -> EnvironmentHandler {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentHandler::new(prefix.map(str::to_string), Arc::new(map))
    }

    #[test]
    fn test_env_var_names() {
        let env = handler(Some("xterm"), &[]);
        assert_eq!(env.get_env_var_name("fontSize").as_deref(), Some("XTERM_FONT_SIZE"));
        assert_eq!(env.get_env_var_name("cwd").as_deref(), Some("XTERM_CWD"));
        assert_eq!(
            env.get_env_var_name("relaunchTerminalOnStartup").as_deref(),
            Some("XTERM_RELAUNCH_TERMINAL_ON_STARTUP")
        );
        assert_eq!(env.get_env_var_name("ui.theme").as_deref(), Some("XTERM_UI_THEME"));
    }

    #[test]
    fn test_disabled_without_prefix() {
        let env = handler(None, &[("XTERM_CWD", "/srv")]);
        assert!(env.get_env_override(&FieldDescriptor::text("cwd", "/")).is_none());
    }

    #[test]
    fn test_override_decoded_with_field_codec() {
        let env = handler(Some("XTERM"), &[("XTERM_FONT_SIZE", "18"), ("XTERM_COPY_ON_SELECT", "maybe")]);

        let font = FieldDescriptor::number("fontSize", 14).max(100.0);
        assert_eq!(env.get_env_override(&font), Some(json!(18)));

        let copy = FieldDescriptor::toggle("copyOnSelect", false);
        assert_eq!(env.get_env_override(&copy), None);
    }
}
