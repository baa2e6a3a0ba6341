use std::{fs, path::PathBuf};

use serial_test::serial;
use tempfile::TempDir;
use wayback_config::{BotConfigLoader, ReplyStyle};

/// Write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_with_env_placeholders() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
handle: searchwayback
reply_style: bare
twitter:
  consumer_key: "${WB_IT_CONSUMER_KEY}"
  consumer_secret: "cs-literal"
  access_token: "at-literal"
  access_secret: "as-literal"
archive:
  timeout_secs: 5
"#;
    let p = write_yaml(&tmp, "wayback.yaml", file_yaml);

    temp_env::with_var("WB_IT_CONSUMER_KEY", Some("ck-from-env"), || {
        let cfg = BotConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load bot config");

        assert_eq!(cfg.handle, "searchwayback");
        assert_eq!(cfg.reply_style, ReplyStyle::Bare);
        assert_eq!(cfg.twitter.consumer_key, "ck-from-env");
        assert_eq!(cfg.twitter.consumer_secret, "cs-literal");
        assert_eq!(cfg.archive.timeout_secs, 5);
        assert!(cfg.archive.user_agent.is_none());
    });
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");
    assert!(BotConfigLoader::new().with_file(&missing).load().is_err());
}
