// tests/config_load.rs
use filings_screener::config::{load_default, load_from, ScreenerConfig, ENV_CONFIG_PATH};
use filings_screener::error::ConfigError;
use std::{env, fs};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("screener.toml");
    fs::write(
        &p_toml,
        r#"
threshold = 3.0
max_picks = 10

[enrichment]
ttl_secs = 600

[markets]
nse_suffix = ".NSE"

[[categories]]
name = "order_win"
keywords = ["Order Win", "large order"]
"#,
    )
    .unwrap();
    let t = load_from(&p_toml).unwrap();
    assert_eq!(t.threshold, 3.0);
    assert_eq!(t.max_picks, Some(10));
    assert_eq!(t.enrichment.ttl_secs, 600);
    assert!(t.enrichment.enabled);
    assert_eq!(t.markets.nse_suffix.as_deref(), Some(".NSE"));
    let rules = t.validate().unwrap();
    assert_eq!(rules.rules()[0].keywords, vec!["order win", "large order"]);

    let p_json = dir.path().join("screener.json");
    fs::write(
        &p_json,
        r#"{"threshold": 5, "enrichment": {"enabled": false}}"#,
    )
    .unwrap();
    let j = load_from(&p_json).unwrap();
    assert_eq!(j.threshold, 5.0);
    assert!(!j.enrichment.enabled);
    assert_eq!(j.categories, ScreenerConfig::default().categories);
}

#[test]
fn loaded_but_invalid_config_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.toml");
    fs::write(
        &p,
        r#"
keyword_weight = 0.0
"#,
    )
    .unwrap();
    let cfg = load_from(&p).unwrap();
    assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveWeight(0.0)));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("broken.toml");
    fs::write(&p, "threshold = [").unwrap();
    assert!(load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    env::remove_var(ENV_CONFIG_PATH);

    // 1) Nothing → built-in defaults
    assert_eq!(load_default().unwrap(), ScreenerConfig::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("screener.toml"), "threshold = 7.0").unwrap();
    assert_eq!(load_default().unwrap().threshold, 7.0);

    // 3) Env wins
    let p_env = tmp.path().join("override.json");
    fs::write(&p_env, r#"{"threshold": 9.5}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(load_default().unwrap().threshold, 9.5);

    // 4) Env pointing nowhere is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    env::set_current_dir(&old).unwrap();
}
