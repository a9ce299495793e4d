//! Error types for Formdown
//!
//! 모든 에러를 중앙에서 관리
//!
//! 에러는 크게 세 종류로 나뉩니다:
//! - 등록 에러 (중복 플러그인, 누락된 의존성, 중복 필드 타입): 항상 호출자에게 즉시 반환
//! - 실행 에러 (Hook/Plugin/Rule 실패): 설정된 [`ErrorStrategy`]에 따라 처리
//! - 기타 (설정, IO, 직렬화)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Formdown 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 등록 관련
    // ========================================================================
    #[error("Plugin '{0}' is already registered")]
    DuplicatePlugin(String),

    #[error("Plugin '{plugin}' requires dependency '{dependency}'")]
    MissingDependency { plugin: String, dependency: String },

    #[error("Field type '{0}' is already registered")]
    DuplicateType(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Hook '{hook}' failed: {message}")]
    Hook { hook: String, message: String },

    #[error("Hook '{hook}' timed out after {timeout_ms}ms")]
    HookTimeout { hook: String, timeout_ms: u64 },

    #[error("Plugin '{plugin}' error: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 일반
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 등록 단계에서 발생한 구조적 에러인지 확인
    ///
    /// 등록 에러는 에러 전략을 거치지 않고 항상 호출자에게 반환됩니다.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicatePlugin(_) | Error::MissingDependency { .. } | Error::DuplicateType(_)
        )
    }

    /// 재시도 가능한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::HookTimeout { .. })
    }

    /// Hook 에러 생성 헬퍼
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hook {
            hook: hook.into(),
            message: message.into(),
        }
    }

    /// Plugin 에러 생성 헬퍼
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

// ============================================================================
// ErrorStrategy - 실행 에러 처리 전략
// ============================================================================

/// 실행 에러 처리 전략
///
/// Hook 핸들러, 플러그인 라이프사이클 콜백 실패 시 적용됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStrategy {
    /// 조용히 무시
    Ignore,
    /// 경고 로그 후 계속 진행
    #[default]
    Warn,
    /// 호출자에게 전파 (해당 호출의 나머지 항목 중단)
    Throw,
}

impl ErrorStrategy {
    /// 전략에 따라 에러 처리
    ///
    /// `Throw`인 경우에만 `Err`를 반환합니다.
    pub fn handle(&self, error: Error, source: &str) -> Result<()> {
        match self {
            ErrorStrategy::Ignore => Ok(()),
            ErrorStrategy::Warn => {
                tracing::warn!(source = source, "{}", error);
                Ok(())
            }
            ErrorStrategy::Throw => Err(error),
        }
    }
}

impl std::fmt::Display for ErrorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::Warn => write!(f, "warn"),
            Self::Throw => write!(f, "throw"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_messages() {
        let err = Error::MissingDependency {
            plugin: "child".into(),
            dependency: "parent".into(),
        };
        assert!(err.to_string().contains("requires dependency"));
        assert!(err.is_registration_error());

        let err = Error::DuplicatePlugin("dup".into());
        assert!(err.to_string().contains("already registered"));

        let err = Error::DuplicateType("range".into());
        assert!(err.to_string().contains("is already registered"));
    }

    #[test]
    fn test_error_strategy_handle() {
        assert!(ErrorStrategy::Ignore
            .handle(Error::Cancelled, "test")
            .is_ok());
        assert!(ErrorStrategy::Warn.handle(Error::Cancelled, "test").is_ok());
        assert!(matches!(
            ErrorStrategy::Throw.handle(Error::Cancelled, "test"),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn test_error_strategy_serde() {
        let s: ErrorStrategy = serde_json::from_str("\"throw\"").unwrap();
        assert_eq!(s, ErrorStrategy::Throw);
        assert_eq!(serde_json::to_string(&ErrorStrategy::Ignore).unwrap(), "\"ignore\"");
    }
}
