//! formdown-core: Formdown 파서 / 확장 런타임
//!
//! Layer2 - 문서 파이프라인과 확장 시스템
//!
//! # 주요 모듈
//!
//! - `field`: 필드 정의, 파싱 결과, Hook 컨텍스트
//! - `hook`: 우선순위 기반 Hook 시스템 (pre-parse ... post-generate)
//! - `registry`: 필드 타입 레지스트리 (parser / generator / validator / schema)
//! - `plugin`: 플러그인 라이프사이클 (의존성, 원자적 등록)
//! - `builtin`: 기본 필드 타입 (`range`, `toggle`, 표준 HTML 타입)
//! - `extension`: 위 구성요소를 묶은 `ExtensionManager`
//!
//! # 사용 예시
//!
//! ```ignore
//! use formdown_core::{ExtensionManager, HookContext};
//!
//! let manager = ExtensionManager::new();
//! manager.initialize().await?;
//!
//! let result = manager.parse("@volume: [range max=11]").await?;
//! let html = manager.generate(&result, HookContext::new()).await?;
//! let schema = manager.generate_schema(&result);
//! ```

pub mod builtin;
pub mod extension;
pub mod field;
pub mod hook;
pub mod plugin;
pub mod registry;

// Re-exports: Foundation
pub use formdown_foundation::{Error, ErrorStrategy, EventEmitter, ExtensionConfig, Result};

// Re-exports: Field
pub use field::{
    tokenize_attributes, AttributeToken, Attributes, ContentNode, Field, FieldRule, FormData,
    HookContext, ParseResult,
};

// Re-exports: Hook
pub use hook::{AsyncHookFn, Hook, HookHandler, HookManager, HookManagerConfig, HookPoint};

// Re-exports: Registry
pub use registry::{DataCheck, DataOperation, DataProcessor, FieldTypePlugin, FieldTypeRegistry};

// Re-exports: Plugin
pub use plugin::{
    Plugin, PluginManager, PluginMetadata, RendererPlugin, ThemePlugin, ValidationPlugin,
};

// Re-exports: Builtin
pub use builtin::{core_plugin, CorePlugin, CORE_PLUGIN_NAME};

// Re-exports: Extension
pub use extension::{ExtensionManager, ExtensionStats, PluginSummary};
