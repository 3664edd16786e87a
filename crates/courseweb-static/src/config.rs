//! Course configuration loading and validation.

use std::fs;
use std::path::Path;

use minijinja::Value;

use crate::builder::BuildError;

/// Keys every course configuration must define.
pub const REQUIRED_KEYS: [&str; 7] = [
    "title",
    "dates",
    "organisation",
    "repository",
    "hackmd",
    "googleform",
    "conda_environment",
];

/// Course configuration loaded from a TOML file.
///
/// Keys beyond [`REQUIRED_KEYS`] are kept and exposed to templates as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseConfig {
    values: toml::Table,
}

impl CourseConfig {
    /// Load and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = fs::read_to_string(path).map_err(|e| BuildError::Filesystem {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config = Self::parse(&content).map_err(|e| BuildError::ConfigFormat {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        let values: toml::Table = toml::from_str(content)?;
        Ok(Self { values })
    }

    /// Required keys that are not present, in declaration order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !self.values.contains_key(*key))
            .collect()
    }

    /// Check that every required key is present.
    ///
    /// Only presence is checked; values may have any type.
    pub fn validate(&self) -> Result<(), BuildError> {
        let missing = self.missing_keys();
        if missing.is_empty() {
            return Ok(());
        }

        Err(BuildError::MissingConfigKey(
            missing.into_iter().map(String::from).collect(),
        ))
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Build the template context from the whole configuration.
    pub fn to_context(&self) -> Value {
        let values: toml::Table = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), plain_value(value)))
            .collect();

        Value::from_serialize(&values)
    }
}

/// Replace TOML datetimes with their text form so templates print them
/// like any other string.
fn plain_value(value: &toml::Value) -> toml::Value {
    match value {
        toml::Value::Datetime(dt) => toml::Value::String(dt.to_string()),
        toml::Value::Array(items) => toml::Value::Array(items.iter().map(plain_value).collect()),
        toml::Value::Table(table) => toml::Value::Table(
            table
                .iter()
                .map(|(key, value)| (key.clone(), plain_value(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const COMPLETE: &str = r#"
title = "Intro"
dates = "June 8"
organisation = "Acme"
repository = "acme/repo"
hackmd = "https://hackmd.io/x"
googleform = "https://forms.gle/y"
conda_environment = "env.yml"
"#;

    #[test]
    fn parses_complete_config() {
        let config = CourseConfig::parse(COMPLETE).unwrap();

        assert!(config.missing_keys().is_empty());
        assert!(config.validate().is_ok());
        assert_eq!(
            config.get("title").and_then(|v| v.as_str()),
            Some("Intro")
        );
    }

    #[test]
    fn keeps_extra_keys() {
        let content = format!("{COMPLETE}\nlocation = \"Ghent\"\n");
        let config = CourseConfig::parse(&content).unwrap();

        assert!(config.validate().is_ok());
        assert!(config.contains_key("location"));
        assert_eq!(config.keys().count(), REQUIRED_KEYS.len() + 1);
    }

    #[test]
    fn reports_each_missing_key() {
        for key in REQUIRED_KEYS {
            let content: String = COMPLETE
                .lines()
                .filter(|line| !line.starts_with(&format!("{key} =")))
                .collect::<Vec<_>>()
                .join("\n");
            let config = CourseConfig::parse(&content).unwrap();

            assert_eq!(config.missing_keys(), vec![key]);
            match config.validate() {
                Err(BuildError::MissingConfigKey(keys)) => assert_eq!(keys, vec![key.to_string()]),
                other => panic!("expected missing key error for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn does_not_check_value_types() {
        let content = COMPLETE.replace("dates = \"June 8\"", "dates = [8, 9, 10]");
        let config = CourseConfig::parse(&content).unwrap();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("course.toml");
        fs::write(&path, "title = \"unterminated\n").unwrap();

        let err = CourseConfig::load(&path).unwrap_err();

        assert!(matches!(err, BuildError::ConfigFormat { .. }));
    }

    #[test]
    fn missing_file_is_a_filesystem_error() {
        let temp = tempdir().unwrap();

        let err = CourseConfig::load(&temp.path().join("nope.toml")).unwrap_err();

        assert!(matches!(err, BuildError::Filesystem { .. }));
    }

    #[test]
    fn context_prints_dates_as_text() {
        let content = format!("{COMPLETE}\nstart = 2022-06-08\n");
        let config = CourseConfig::parse(&content).unwrap();

        let context = config.to_context();
        let start = context.get_attr("start").unwrap();

        assert_eq!(start.as_str(), Some("2022-06-08"));
    }

    #[test]
    fn context_keeps_nested_values() {
        let content = format!(
            "{COMPLETE}\n[[sessions]]\nname = \"Pandas\"\n\n[[sessions]]\nname = \"Xarray\"\n"
        );
        let config = CourseConfig::parse(&content).unwrap();

        let sessions = config.to_context().get_attr("sessions").unwrap();

        assert_eq!(sessions.len(), Some(2));
    }
}
