//! Loader for the bot configuration with YAML + environment overlays.
//!
//! The expected file is `wayback.yaml`; `WAYBACK_`-prefixed environment
//! variables override individual fields and `${VAR}` placeholders inside
//! string values are expanded recursively (with a depth cap, so cycles
//! terminate).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Top-level bot configuration.
#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Handle the bot answers to, without the leading `@`.
    pub handle: String,
    #[serde(default)]
    pub reply_style: ReplyStyle,
    pub twitter: TwitterSettings,
    #[serde(default)]
    pub archive: ArchiveSettings,
}

/// Whether replies open with `@<author>` or carry the message alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStyle {
    #[default]
    AtPrefix,
    Bare,
}

/// The four platform credential strings. Normally injected via `${VAR}`
/// placeholders so the YAML file itself stays secret-free.
#[derive(Debug, Deserialize)]
pub struct TwitterSettings {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveSettings {
    /// User agent for archive lookups and link resolution. Falls back to the
    /// workspace default when unset.
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_archive_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: default_archive_timeout_secs(),
        }
    }
}

fn default_archive_timeout_secs() -> u64 {
    20
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML file + env overrides).
pub struct BotConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for BotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl BotConfigLoader {
    /// Start with the default sources: `WAYBACK_` env overrides, to which a
    /// file or inline YAML can be attached.
    ///
    /// ```
    /// use wayback_config::{BotConfigLoader, ReplyStyle};
    ///
    /// let cfg = BotConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// handle: searchwayback
    /// twitter:
    ///   consumer_key: ck
    ///   consumer_secret: cs
    ///   access_token: at
    ///   access_secret: as
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.handle, "searchwayback");
    /// assert_eq!(cfg.reply_style, ReplyStyle::AtPrefix);
    /// assert_eq!(cfg.archive.timeout_secs, 20);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("WAYBACK").separator("__"));
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers the format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests, mostly).
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder, expand `${VAR}` placeholders, and deserialize
    /// into the strongly typed config.
    pub fn load(self) -> Result<BotConfig, ConfigError> {
        let cfg = self.builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: BotConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("WB_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${WB_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("WB_TEST_CITY", Some("Topeka")), ("WB_TEST_ST", Some("KS"))],
            || {
                let mut v = json!([
                    "hello-$WB_TEST_CITY",
                    { "loc": "${WB_TEST_CITY}-${WB_TEST_ST}" },
                    7,
                    false,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Topeka", { "loc": "Topeka-KS" }, 7, false, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("WB_TEST_C", Some("inner")),
                ("WB_TEST_B", Some("mid-${WB_TEST_C}")),
                ("WB_TEST_A", Some("start-${WB_TEST_B}-end")),
            ],
            || {
                let mut v = json!("X=${WB_TEST_A}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-inner-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars(
            [
                ("WB_TEST_X", Some("${WB_TEST_Y}")),
                ("WB_TEST_Y", Some("${WB_TEST_X}")),
            ],
            || {
                let mut v = json!("x=${WB_TEST_X}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${WB_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${WB_TEST_DOES_NOT_EXIST}"));
    }
}
