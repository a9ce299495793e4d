//! Formdown Config - 통합 설정
//!
//! JSON 또는 TOML 파일에서 로드할 수 있습니다.

use crate::error::{Error, ErrorStrategy, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 기본 설정 파일명
pub const FORMDOWN_CONFIG_FILE: &str = "formdown.toml";

/// Hook 기본 타임아웃 (ms)
pub const DEFAULT_HOOK_TIMEOUT_MS: u64 = 1000;

/// 서버 검증 기본 디바운스 (ms)
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// 서버 검증 기본 타임아웃 (ms)
pub const DEFAULT_SERVER_TIMEOUT_MS: u64 = 5000;

// ============================================================================
// Formdown Config (통합)
// ============================================================================

/// Formdown 통합 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormdownConfig {
    /// 확장 시스템 설정
    #[serde(default)]
    pub extensions: ExtensionConfig,

    /// 검증 설정
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl FormdownConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 파일에서 로드 (확장자로 형식 판단: `.json` 또는 `.toml`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            Some("toml") => Self::from_toml(&content),
            other => Err(Error::Config(format!(
                "Unsupported config format: {:?} ({})",
                other,
                path.display()
            ))),
        }
    }

    /// 파일이 있으면 로드, 없으면 기본값
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// JSON 문자열에서 파싱
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// TOML 문자열에서 파싱
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: FormdownConfig) {
        self.extensions.merge(other.extensions);
        self.validation.merge(other.validation);
    }
}

// ============================================================================
// Extension Config
// ============================================================================

/// 확장 시스템 설정 (HookManager / PluginManager / ExtensionManager)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionConfig {
    /// Hook 실행 타임아웃 (None이면 타임아웃 없음)
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_ms: Option<u64>,

    /// Hook 실행 에러 처리 전략
    #[serde(default)]
    pub hook_error_strategy: ErrorStrategy,

    /// 플러그인 라이프사이클 에러 처리 전략
    #[serde(default)]
    pub plugin_error_strategy: ErrorStrategy,

    /// initialize() 시 코어 플러그인 자동 등록
    #[serde(default = "default_true")]
    pub register_core_plugin: bool,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            hook_timeout_ms: default_hook_timeout(),
            hook_error_strategy: ErrorStrategy::default(),
            plugin_error_strategy: ErrorStrategy::default(),
            register_core_plugin: true,
        }
    }
}

impl ExtensionConfig {
    fn merge(&mut self, other: ExtensionConfig) {
        if other.hook_timeout_ms != default_hook_timeout() {
            self.hook_timeout_ms = other.hook_timeout_ms;
        }
        if other.hook_error_strategy != ErrorStrategy::default() {
            self.hook_error_strategy = other.hook_error_strategy;
        }
        if other.plugin_error_strategy != ErrorStrategy::default() {
            self.plugin_error_strategy = other.plugin_error_strategy;
        }
        self.register_core_plugin = other.register_core_plugin;
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn hook_timeout(mut self, timeout_ms: Option<u64>) -> Self {
        self.hook_timeout_ms = timeout_ms;
        self
    }

    pub fn hook_error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.hook_error_strategy = strategy;
        self
    }

    pub fn plugin_error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.plugin_error_strategy = strategy;
        self
    }

    pub fn register_core_plugin(mut self, enabled: bool) -> Self {
        self.register_core_plugin = enabled;
        self
    }
}

// ============================================================================
// Validation Config
// ============================================================================

/// 검증 매니저 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    /// 서버 검증 디바운스 (ms)
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// 서버 검증 타임아웃 (ms)
    #[serde(default = "default_server_timeout")]
    pub server_timeout_ms: u64,

    /// 결과 캐시 사용 여부
    #[serde(default = "default_true")]
    pub enable_cache: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            server_timeout_ms: DEFAULT_SERVER_TIMEOUT_MS,
            enable_cache: true,
        }
    }
}

impl ValidationConfig {
    fn merge(&mut self, other: ValidationConfig) {
        if other.debounce_ms != DEFAULT_DEBOUNCE_MS {
            self.debounce_ms = other.debounce_ms;
        }
        if other.server_timeout_ms != DEFAULT_SERVER_TIMEOUT_MS {
            self.server_timeout_ms = other.server_timeout_ms;
        }
        self.enable_cache = other.enable_cache;
    }
}

fn default_hook_timeout() -> Option<u64> {
    Some(DEFAULT_HOOK_TIMEOUT_MS)
}

fn default_debounce() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_server_timeout() -> u64 {
    DEFAULT_SERVER_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormdownConfig::default();
        assert_eq!(config.extensions.hook_timeout_ms, Some(1000));
        assert_eq!(config.extensions.hook_error_strategy, ErrorStrategy::Warn);
        assert!(config.extensions.register_core_plugin);
        assert_eq!(config.validation.debounce_ms, 500);
        assert!(config.validation.enable_cache);
    }

    #[test]
    fn test_from_json_partial() {
        let config = FormdownConfig::from_json(
            r#"{ "extensions": { "hookErrorStrategy": "throw" }, "validation": { "debounceMs": 50 } }"#,
        )
        .unwrap();

        assert_eq!(config.extensions.hook_error_strategy, ErrorStrategy::Throw);
        assert_eq!(config.extensions.hook_timeout_ms, Some(1000));
        assert_eq!(config.validation.debounce_ms, 50);
        assert_eq!(config.validation.server_timeout_ms, 5000);
    }

    #[test]
    fn test_from_toml() {
        let config = FormdownConfig::from_toml(
            r#"
            [extensions]
            hookTimeoutMs = 250
            pluginErrorStrategy = "ignore"
            registerCorePlugin = false
            "#,
        )
        .unwrap();

        assert_eq!(config.extensions.hook_timeout_ms, Some(250));
        assert_eq!(config.extensions.plugin_error_strategy, ErrorStrategy::Ignore);
        assert!(!config.extensions.register_core_plugin);
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = FormdownConfig::default();
        let mut other = FormdownConfig::default();
        other.extensions.hook_error_strategy = ErrorStrategy::Ignore;
        other.validation.debounce_ms = 10;

        base.merge(other);
        assert_eq!(base.extensions.hook_error_strategy, ErrorStrategy::Ignore);
        assert_eq!(base.validation.debounce_ms, 10);
        assert_eq!(base.extensions.hook_timeout_ms, Some(1000));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("formdown.json");
        std::fs::write(&path, r#"{ "validation": { "enableCache": false } }"#).unwrap();

        let config = FormdownConfig::load(&path).unwrap();
        assert!(!config.validation.enable_cache);

        let bad = dir.path().join("formdown.yaml");
        std::fs::write(&bad, "x: 1").unwrap();
        assert!(matches!(FormdownConfig::load(&bad), Err(Error::Config(_))));

        let missing = FormdownConfig::load_or_default(dir.path().join("nope.toml")).unwrap();
        assert_eq!(missing, FormdownConfig::default());
    }
}
