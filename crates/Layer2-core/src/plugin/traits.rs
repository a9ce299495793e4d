//! Plugin traits - 핵심 플러그인 인터페이스

use crate::field::FormData;
use crate::hook::Hook;
use crate::registry::FieldTypePlugin;
use async_trait::async_trait;
use formdown_foundation::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

// ============================================================================
// PluginMetadata
// ============================================================================

/// 플러그인 메타데이터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// 고유 이름
    pub name: String,

    /// 버전
    pub version: String,

    /// 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 먼저 등록되어 있어야 하는 플러그인 이름
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }
}

// ============================================================================
// 플러그인이 기여하는 항목
// ============================================================================

/// 이름 붙은 값 검증기 시그니처
///
/// `Ok(None)` 통과, `Ok(Some(message))` 실패, `Err` 검증기 자체 오류
pub type NamedValidatorFn = dyn Fn(&Value, &FormData) -> Result<Option<String>> + Send + Sync;

/// 검증기 플러그인
#[derive(Clone)]
pub struct ValidationPlugin {
    pub name: String,
    pub validator: Arc<NamedValidatorFn>,
}

impl ValidationPlugin {
    pub fn new<F>(name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Result<Option<String>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
        }
    }

    pub fn validate(&self, value: &Value, form_data: &FormData) -> Result<Option<String>> {
        (self.validator)(value, form_data)
    }
}

impl std::fmt::Debug for ValidationPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationPlugin")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 렌더러 시그니처 (템플릿 데이터 → HTML)
pub type RenderFn = dyn Fn(&Value) -> String + Send + Sync;

/// 렌더러 플러그인 (템플릿 이름으로 식별)
#[derive(Clone)]
pub struct RendererPlugin {
    pub template: String,
    pub render: Arc<RenderFn>,
}

impl RendererPlugin {
    pub fn new<F>(template: impl Into<String>, render: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        Self {
            template: template.into(),
            render: Arc::new(render),
        }
    }

    pub fn render(&self, data: &Value) -> String {
        (self.render)(data)
    }
}

impl std::fmt::Debug for RendererPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererPlugin")
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

/// 테마 플러그인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePlugin {
    pub name: String,

    #[serde(default)]
    pub styles: String,

    /// CSS 변수 (`--fd-accent` → `#0af`)
    #[serde(default)]
    pub variables: Map<String, Value>,
}

impl ThemePlugin {
    pub fn new(name: impl Into<String>, styles: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            styles: styles.into(),
            variables: Map::new(),
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), Value::String(value.into()));
        self
    }
}

// ============================================================================
// Plugin Trait
// ============================================================================

/// 플러그인 트레이트
///
/// 기여 항목 메서드는 등록 시 한 번 호출되며, 매니저가 그 결과를 보관했다가
/// 해제 시 정확히 같은 항목을 제거합니다.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// 메타데이터
    fn metadata(&self) -> PluginMetadata;

    /// Hook 목록
    fn hooks(&self) -> Vec<Hook> {
        vec![]
    }

    /// 필드 타입 목록
    fn field_types(&self) -> Vec<FieldTypePlugin> {
        vec![]
    }

    /// 검증기 목록
    fn validators(&self) -> Vec<ValidationPlugin> {
        vec![]
    }

    /// 렌더러 목록
    fn renderers(&self) -> Vec<RendererPlugin> {
        vec![]
    }

    /// 테마 목록
    fn themes(&self) -> Vec<ThemePlugin> {
        vec![]
    }

    /// 초기화 (매니저 초기화 시 또는 초기화 이후 등록 시)
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// 정리 (해제 또는 매니저 종료 시)
    async fn destroy(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Bare;

    #[async_trait]
    impl Plugin for Bare {
        fn metadata(&self) -> PluginMetadata {
            PluginMetadata::new("bare", "0.1.0").with_dependency("formdown-core")
        }
    }

    #[tokio::test]
    async fn test_default_contributions_are_empty() {
        let plugin = Bare;
        assert!(plugin.hooks().is_empty());
        assert!(plugin.field_types().is_empty());
        assert!(plugin.validators().is_empty());
        assert!(plugin.initialize().await.is_ok());
        assert!(plugin.destroy().await.is_ok());
        assert_eq!(plugin.metadata().dependencies, vec!["formdown-core"]);
    }

    #[test]
    fn test_validation_plugin_call() {
        let even = ValidationPlugin::new("even", |value, _| {
            Ok((value.as_i64().unwrap_or(1) % 2 != 0).then(|| "must be even".to_string()))
        });
        let data = FormData::new();

        assert_eq!(even.validate(&json!(4), &data).unwrap(), None);
        assert_eq!(
            even.validate(&json!(3), &data).unwrap().as_deref(),
            Some("must be even")
        );
    }

    #[test]
    fn test_metadata_serialization_skips_empty() {
        let json = serde_json::to_value(PluginMetadata::new("a", "1.0.0")).unwrap();
        assert_eq!(json, json!({ "name": "a", "version": "1.0.0" }));
    }
}
