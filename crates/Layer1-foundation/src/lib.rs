//! # formdown-foundation
//!
//! Foundation layer for Formdown:
//! - Error: 에러 타입 및 실행 에러 처리 전략 (ignore / warn / throw)
//! - Event: 진단/라이프사이클 이벤트 이미터
//! - Config: 통합 설정 (확장 시스템, 검증)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  ExtensionManager (formdown-core)                        │
//! │  ├── HookManager ──────┐                                 │
//! │  ├── PluginManager ────┼──► EventEmitter (이벤트 발행)   │
//! │  └── FieldTypeRegistry │                                 │
//! │                        ▼                                 │
//! │          Error / ErrorStrategy / FormdownConfig          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, ErrorStrategy, Result};

// ============================================================================
// Event (이벤트 시스템)
// ============================================================================
pub use event::{EventEmitter, Listener, ListenerId};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ExtensionConfig, FormdownConfig, ValidationConfig, DEFAULT_DEBOUNCE_MS,
    DEFAULT_HOOK_TIMEOUT_MS, DEFAULT_SERVER_TIMEOUT_MS, FORMDOWN_CONFIG_FILE,
};
