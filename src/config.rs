//! Environment configuration.

use std::env;
use std::path::PathBuf;

use transcript_store::store_root;

pub const SERVICE_ENV_VAR: &str = "SAGE_CHAT_SERVICE";
pub const HTTP_CONFIG_PATH_ENV_VAR: &str = "SAGE_CHAT_HTTP_CONFIG_PATH";
pub const STORE_DIR_ENV_VAR: &str = "SAGE_CHAT_STORE_DIR";
pub const EPHEMERAL_ENV_VAR: &str = "SAGE_CHAT_EPHEMERAL";
pub const LOG_ENV_VAR: &str = "SAGE_CHAT_LOG";

pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub service_id: Option<String>,
    pub http_config_path: Option<PathBuf>,
    pub store_dir: PathBuf,
    /// Keep the transcript in memory only; nothing survives the process.
    pub ephemeral: bool,
    pub log_filter: String,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            service_id: env_string_opt(SERVICE_ENV_VAR),
            http_config_path: env_string_opt(HTTP_CONFIG_PATH_ENV_VAR).map(PathBuf::from),
            store_dir: env_string_opt(STORE_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_store_dir),
            ephemeral: env_flag(EPHEMERAL_ENV_VAR),
            log_filter: env_string_opt(LOG_ENV_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

pub fn default_store_dir() -> PathBuf {
    let base = dirs::home_dir()
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    store_root(&base)
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let _lock = env_lock();
        let _g1 = set_env_guard(SERVICE_ENV_VAR, None);
        let _g2 = set_env_guard(HTTP_CONFIG_PATH_ENV_VAR, None);
        let _g3 = set_env_guard(STORE_DIR_ENV_VAR, None);
        let _g4 = set_env_guard(EPHEMERAL_ENV_VAR, None);
        let _g5 = set_env_guard(LOG_ENV_VAR, None);

        let config = EnvConfig::from_env();
        assert!(config.service_id.is_none());
        assert!(config.http_config_path.is_none());
        assert_eq!(config.store_dir, default_store_dir());
        assert!(config.store_dir.ends_with(".sage_chat/store"));
        assert!(!config.ephemeral);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn explicit_values_are_read() {
        let _lock = env_lock();
        let _g1 = set_env_guard(SERVICE_ENV_VAR, Some(" http "));
        let _g2 = set_env_guard(HTTP_CONFIG_PATH_ENV_VAR, Some("/etc/sage/http.json"));
        let _g3 = set_env_guard(STORE_DIR_ENV_VAR, Some("/tmp/sage-store"));
        let _g4 = set_env_guard(EPHEMERAL_ENV_VAR, Some("1"));
        let _g5 = set_env_guard(LOG_ENV_VAR, Some("sage_chat=debug"));

        let config = EnvConfig::from_env();
        assert_eq!(config.service_id.as_deref(), Some("http"));
        assert_eq!(
            config.http_config_path,
            Some(PathBuf::from("/etc/sage/http.json"))
        );
        assert_eq!(config.store_dir, PathBuf::from("/tmp/sage-store"));
        assert!(config.ephemeral);
        assert_eq!(config.log_filter, "sage_chat=debug");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let _lock = env_lock();
        let _g1 = set_env_guard(SERVICE_ENV_VAR, Some("   "));
        let _g2 = set_env_guard(LOG_ENV_VAR, Some(""));
        let _g3 = set_env_guard(EPHEMERAL_ENV_VAR, Some("yes"));

        let config = EnvConfig::from_env();
        assert!(config.service_id.is_none());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert!(!config.ephemeral);
    }
}
