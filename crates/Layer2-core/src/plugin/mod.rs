//! # Plugin System
//!
//! 이름/버전이 있는 확장 묶음을 등록하고 라이프사이클을 관리합니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PluginManager                           │
//! │  ┌────────────┬────────────┬────────────────────┐           │
//! │  │ Plugin A   │ Plugin B   │ Plugin C           │           │
//! │  └────────────┴────────────┴────────────────────┘           │
//! │        │ hooks            │ field types                     │
//! │        ▼                  ▼                                 │
//! │   HookManager      FieldTypeRegistry     validators/        │
//! │   (공유)            (공유)                renderers/themes   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! struct StarsPlugin;
//!
//! #[async_trait]
//! impl Plugin for StarsPlugin {
//!     fn metadata(&self) -> PluginMetadata {
//!         PluginMetadata::new("stars", "1.0.0").with_dependency("formdown-core")
//!     }
//!
//!     fn field_types(&self) -> Vec<FieldTypePlugin> {
//!         vec![FieldTypePlugin::new("stars").with_parser(parse_stars)]
//!     }
//! }
//!
//! manager.register(Arc::new(StarsPlugin)).await?;
//! ```

mod manager;
mod traits;

pub use manager::PluginManager;
pub use traits::{
    Plugin, PluginMetadata, RenderFn, RendererPlugin, ThemePlugin, ValidationPlugin, NamedValidatorFn,
};
