//! # Extension
//!
//! 확장 시스템 최상위 파사드와 문서 파이프라인
//!
//! ```text
//! ExtensionManager
//! ├── EventEmitter        진단 이벤트
//! ├── HookManager         확장 지점
//! ├── PluginManager       플러그인 라이프사이클
//! └── FieldTypeRegistry   필드 타입
//! ```

mod document;
mod global;
mod manager;

pub use global::{get_or_init, init_with_config};
pub use manager::{ExtensionManager, ExtensionStats, PluginSummary};
