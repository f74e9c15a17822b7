//! Built-in schema for terminal launch profiles

use super::schema::{ConfigSchema, FieldDescriptor};
use serde_json::{Value, json};

const MIN_FONT_SIZE: f64 = 1.0;
const MAX_FONT_SIZE: f64 = 100.0;

fn default_shell() -> String {
    if cfg!(windows) {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    } else {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
}

fn default_cwd() -> String {
    dirs::home_dir()
        .map(|home| home.display().to_string())
        .unwrap_or_default()
}

fn default_user_data_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("x-terminal").display().to_string())
        .unwrap_or_default()
}

/// Clamp out-of-range font sizes back into the supported range
fn clamp_font_size(previous: &Value) -> Value {
    match previous.as_f64() {
        Some(size) if size < MIN_FONT_SIZE => json!(MIN_FONT_SIZE),
        Some(size) if size > MAX_FONT_SIZE => json!(MAX_FONT_SIZE),
        Some(_) => previous.clone(),
        None => json!(14),
    }
}

impl ConfigSchema {
    /// Schema describing how a terminal session is launched
    ///
    /// Shell and working directory defaults come from the environment
    /// (`$SHELL` / `%COMSPEC%` and the home directory).
    pub fn terminal() -> Self {
        Self::new(vec![
            FieldDescriptor::text("shellCommand", default_shell()),
            FieldDescriptor::list("args", &[]),
            FieldDescriptor::text("name", ""),
            FieldDescriptor::text("cwd", default_cwd()),
            FieldDescriptor::object("env", Value::Null),
            FieldDescriptor::object("setEnv", json!({})),
            FieldDescriptor::list("deleteEnv", &[]),
            FieldDescriptor::text("encoding", "").pattern(r"^[A-Za-z0-9_.:\-]*$"),
            FieldDescriptor::number("fontSize", 14)
                .min(MIN_FONT_SIZE)
                .max(MAX_FONT_SIZE)
                .to_base_profile(clamp_font_size),
            FieldDescriptor::text("fontFamily", "monospace"),
            FieldDescriptor::text("colorScheme", "default"),
            FieldDescriptor::text("title", ""),
            FieldDescriptor::toggle("leaveOpenAfterExit", true),
            FieldDescriptor::toggle("relaunchTerminalOnStartup", true),
            FieldDescriptor::toggle("promptToStartup", false),
            FieldDescriptor::toggle("copyOnSelect", false),
            FieldDescriptor::text("userDataPath", default_user_data_path()).not_in_profile(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_schema_is_valid() {
        ConfigSchema::terminal().validate().unwrap();
    }

    #[test]
    fn test_terminal_profile_keys() {
        let schema = ConfigSchema::terminal();
        let keys = schema.profile_keys();

        assert_eq!(keys.len(), 16);
        assert_eq!(keys[0], "shellCommand");
        assert!(!keys.contains(&"userDataPath"));
    }

    #[test]
    fn test_font_size_base_transform_clamps() {
        let schema = ConfigSchema::terminal();
        let field = schema.field("fontSize").unwrap();

        assert_eq!(field.base_value(&json!(500)), json!(MAX_FONT_SIZE));
        assert_eq!(field.base_value(&json!(0)), json!(MIN_FONT_SIZE));
        assert_eq!(field.base_value(&json!(12)), json!(12));
    }

    #[test]
    fn test_encoding_pattern() {
        let schema = ConfigSchema::terminal();
        let field = schema.field("encoding").unwrap();

        assert_eq!(field.decode_param("utf-8"), Some(json!("utf-8")));
        assert_eq!(field.decode_param("utf 8; rm -rf"), None);
    }
}
