use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::config::{CatchUpPolicy, InitMode, Settings};

/// Minimum accepted poll interval.
pub const MIN_POLL_INTERVAL_MS: u64 = 1000;

/// Environment variable naming an optional YAML settings file.
pub const CONFIG_PATH_ENV: &str = "JUICE_MONITOR_CONFIG";


/// Returns sensible defaults for all settings fields. Credentials are empty
/// and must be supplied by the file or the environment.
pub fn default_settings() -> Settings {
    Settings {
        telegram_bot_token: String::new(),
        telegram_chat_id: String::new(),
        telegram_api_url: "https://api.telegram.org".into(),
        juiceswap_graphql_url: "https://dev.ponder.juiceswap.com/graphql".into(),
        juicedollar_graphql_url: "https://dev.ponder.juicedollar.com/graphql".into(),
        poll_interval_ms: 30_000,
        citrea_explorer_url: "https://citreascan.com".into(),
        watermark_path: PathBuf::from(".watermarks.json"),
        init_mode: InitMode::Now,
        catch_up_policy: CatchUpPolicy::LogOnly,
    }
}


/// Load settings from the process environment, layered over the YAML file at
/// `path` (if given) and the defaults.
pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
    load_with(path, |key| std::env::var(key).ok())
}


/// Like `load`, but reads variables through `env` so callers (and tests)
/// control the environment.
pub fn load_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(p) => read_file(p)?,
        None => default_settings(),
    };
    apply_env(&mut settings, &env)?;
    validate(&settings)?;
    Ok(settings)
}


/// Parse a YAML settings file. Absent keys keep their defaults.
pub fn read_file(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(default_settings());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}


/// Override fields from environment variables. Empty values are ignored.
fn apply_env(
    s: &mut Settings,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let get = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(v) = get("TELEGRAM_BOT_TOKEN") {
        s.telegram_bot_token = v;
    }
    if let Some(v) = get("TELEGRAM_CHAT_ID") {
        s.telegram_chat_id = v;
    }
    if let Some(v) = get("TELEGRAM_API_URL") {
        s.telegram_api_url = v;
    }
    if let Some(v) = get("JUICESWAP_GRAPHQL_URL") {
        s.juiceswap_graphql_url = v;
    }
    if let Some(v) = get("JUICEDOLLAR_GRAPHQL_URL") {
        s.juicedollar_graphql_url = v;
    }
    if let Some(v) = get("POLL_INTERVAL_MS") {
        s.poll_interval_ms = v.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "POLL_INTERVAL_MS",
            value: v.clone(),
            reason: "must be a number >= 1000",
        })?;
    }
    if let Some(v) = get("CITREA_EXPLORER_URL") {
        s.citrea_explorer_url = v;
    }
    if let Some(v) = get("WATERMARK_PATH") {
        s.watermark_path = PathBuf::from(v);
    }
    if let Some(v) = get("INIT_MODE") {
        s.init_mode = v.parse().map_err(|_| ConfigError::Invalid {
            key: "INIT_MODE",
            value: v.clone(),
            reason: "must be \"now\" or \"genesis\"",
        })?;
    }
    if let Some(v) = get("CATCH_UP_POLICY") {
        s.catch_up_policy = v.parse().map_err(|_| ConfigError::Invalid {
            key: "CATCH_UP_POLICY",
            value: v.clone(),
            reason: "must be \"log_only\" or \"deliver\"",
        })?;
    }
    Ok(())
}


/// Check required fields and bounds.
pub fn validate(s: &Settings) -> Result<(), ConfigError> {
    if s.telegram_bot_token.trim().is_empty() {
        return Err(ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }
    if s.telegram_chat_id.trim().is_empty() {
        return Err(ConfigError::Missing("TELEGRAM_CHAT_ID"));
    }
    if s.juiceswap_graphql_url.trim().is_empty() {
        return Err(ConfigError::Missing("JUICESWAP_GRAPHQL_URL"));
    }
    if s.juicedollar_graphql_url.trim().is_empty() {
        return Err(ConfigError::Missing("JUICEDOLLAR_GRAPHQL_URL"));
    }
    if s.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigError::Invalid {
            key: "POLL_INTERVAL_MS",
            value: s.poll_interval_ms.to_string(),
            reason: "must be a number >= 1000",
        });
    }
    if s.watermark_path.as_os_str().is_empty() {
        return Err(ConfigError::Missing("WATERMARK_PATH"));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("TELEGRAM_BOT_TOKEN", "test-token"),
            ("TELEGRAM_CHAT_ID", "test-chat-id"),
        ]
    }

    fn load_env(extra: &[(&'static str, &'static str)]) -> Result<Settings, ConfigError> {
        let mut pairs = required();
        pairs.extend_from_slice(extra);
        load_with(None, env_of(&pairs))
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = load_env(&[]).unwrap();
        assert_eq!(s.poll_interval_ms, 30_000);
        assert_eq!(s.citrea_explorer_url, "https://citreascan.com");
        assert_eq!(s.watermark_path, PathBuf::from(".watermarks.json"));
        assert_eq!(s.init_mode, InitMode::Now);
        assert_eq!(s.catch_up_policy, CatchUpPolicy::LogOnly);
    }

    #[test]
    fn accepts_valid_poll_interval() {
        let s = load_env(&[("POLL_INTERVAL_MS", "30000")]).unwrap();
        assert_eq!(s.poll_interval_ms, 30000);
    }

    #[test]
    fn accepts_boundary_poll_interval() {
        let s = load_env(&[("POLL_INTERVAL_MS", "1000")]).unwrap();
        assert_eq!(s.poll_interval_ms, 1000);
    }

    #[test]
    fn rejects_poll_interval_below_minimum() {
        let err = load_env(&[("POLL_INTERVAL_MS", "999")]).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_MS"));
    }

    #[test]
    fn rejects_non_numeric_poll_interval() {
        let err = load_env(&[("POLL_INTERVAL_MS", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "POLL_INTERVAL_MS", .. }));
    }

    #[test]
    fn missing_bot_token_is_an_error() {
        let err = load_with(None, env_of(&[("TELEGRAM_CHAT_ID", "1")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn missing_chat_id_is_an_error() {
        let err = load_with(None, env_of(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_CHAT_ID")));
    }

    #[test]
    fn rejects_unknown_init_mode() {
        let err = load_env(&[("INIT_MODE", "yesterday")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "INIT_MODE", .. }));
    }

    #[test]
    fn parses_catch_up_policy() {
        let s = load_env(&[("CATCH_UP_POLICY", "deliver"), ("INIT_MODE", "genesis")]).unwrap();
        assert_eq!(s.catch_up_policy, CatchUpPolicy::Deliver);
        assert_eq!(s.init_mode, InitMode::Genesis);
    }

    #[test]
    fn yaml_file_is_layered_under_env() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("monitor.yaml");
        std::fs::write(
            &path,
            "telegram_bot_token: from-file\n\
             telegram_chat_id: \"-100\"\n\
             poll_interval_ms: 5000\n\
             init_mode: genesis\n",
        )
        .unwrap();

        let s = load_with(Some(&path), env_of(&[("POLL_INTERVAL_MS", "7000")])).unwrap();
        assert_eq!(s.telegram_bot_token, "from-file");
        assert_eq!(s.telegram_chat_id, "-100");
        assert_eq!(s.poll_interval_ms, 7000);
        assert_eq!(s.init_mode, InitMode::Genesis);
        // untouched keys keep defaults
        assert_eq!(s.citrea_explorer_url, "https://citreascan.com");
    }

    #[test]
    fn unreadable_file_is_reported() {
        let err = load_with(
            Some(Path::new("/nonexistent/monitor.yaml")),
            env_of(&required()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "poll_interval_ms: [not, a, number]\n").unwrap();
        let err = load_with(Some(&path), env_of(&required())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
