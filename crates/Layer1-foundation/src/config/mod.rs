//! Config - 통합 설정 관리
//!
//! - `formdown.rs` - FormdownConfig 통합 설정 (확장 시스템 + 검증)

mod formdown;

pub use formdown::{
    ExtensionConfig, FormdownConfig, ValidationConfig, DEFAULT_DEBOUNCE_MS,
    DEFAULT_HOOK_TIMEOUT_MS, DEFAULT_SERVER_TIMEOUT_MS, FORMDOWN_CONFIG_FILE,
};
