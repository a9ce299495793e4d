//! FieldTypeRegistry - 타입 키 → FieldTypePlugin
//!
//! 파서 시도 순서는 우선순위가 아닌 등록 순서입니다.

use super::field_type::{DataCheck, DataOperation, FieldTypePlugin};
use crate::field::{Field, FieldRule, HookContext};
use formdown_foundation::{Error, Result};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Default)]
struct RegistryInner {
    /// 등록 순서
    order: Vec<String>,

    plugins: HashMap<String, Arc<FieldTypePlugin>>,

    /// 타입별 CSS 캐시
    styles: HashMap<String, String>,

    /// 타입별 스크립트 캐시
    scripts: HashMap<String, String>,
}

/// 필드 타입 레지스트리
#[derive(Default)]
pub struct FieldTypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl FieldTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // 등록 / 해제
    // ========================================================================

    /// 타입 등록 (이미 있으면 DuplicateType, 덮어쓰지 않음)
    pub fn register(&self, plugin: FieldTypePlugin) -> Result<()> {
        let mut inner = self.inner.write();
        let key = plugin.field_type.clone();

        if inner.plugins.contains_key(&key) {
            return Err(Error::DuplicateType(key));
        }

        if let Some(styles) = &plugin.styles {
            inner.styles.insert(key.clone(), styles.clone());
        }
        if let Some(script) = &plugin.client_script {
            inner.scripts.insert(key.clone(), script.clone());
        }
        inner.order.push(key.clone());
        inner.plugins.insert(key.clone(), Arc::new(plugin));

        debug!(field_type = %key, "Registered field type");
        Ok(())
    }

    /// 타입 해제 (없으면 false)
    pub fn unregister(&self, field_type: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.plugins.remove(field_type).is_none() {
            return false;
        }

        inner.styles.remove(field_type);
        inner.scripts.remove(field_type);
        inner.order.retain(|t| t != field_type);

        debug!(field_type, "Unregistered field type");
        true
    }

    /// 전체 제거
    pub fn clear(&self) {
        *self.inner.write() = RegistryInner::default();
    }

    // ========================================================================
    // 조회
    // ========================================================================

    pub fn get(&self, field_type: &str) -> Option<Arc<FieldTypePlugin>> {
        self.inner.read().plugins.get(field_type).cloned()
    }

    pub fn has(&self, field_type: &str) -> bool {
        self.inner.read().plugins.contains_key(field_type)
    }

    /// 등록 순서대로 타입 키 목록
    pub fn types(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 등록 순서대로 플러그인 스냅샷
    fn ordered(&self) -> Vec<Arc<FieldTypePlugin>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|t| inner.plugins.get(t).cloned())
            .collect()
    }

    // ========================================================================
    // 디스패치
    // ========================================================================

    /// 선언 한 줄 파싱
    ///
    /// 첫 번째로 인식한 플러그인의 결과를 사용하며, 속성은 기본 속성 위에 파서 결과를 덮어씁니다.
    pub fn parse_field(&self, content: &str, ctx: &mut HookContext) -> Option<Field> {
        for plugin in self.ordered() {
            let Some(mut field) = plugin.parse(content, ctx) else {
                continue;
            };

            let mut attributes = plugin.default_attributes.clone();
            for (key, value) in std::mem::take(&mut field.attributes) {
                attributes.insert(key, value);
            }
            field.attributes = attributes;

            trace!(field = %field.name, field_type = %plugin.field_type, "Parsed field");
            return Some(field);
        }
        None
    }

    /// 필드 HTML 생성 (타입/generator 없으면 None)
    pub fn generate_field_html(&self, field: &Field, ctx: &HookContext) -> Option<String> {
        let plugin = self.get(&field.field_type)?;
        let generator = plugin.generator.as_ref()?;
        Some(generator(field, ctx))
    }

    /// 검증 규칙 (없으면 빈 목록)
    pub fn validate_field(&self, field: &Field, value: &Value) -> Vec<FieldRule> {
        self.get(&field.field_type)
            .map(|plugin| plugin.validate(field, value))
            .unwrap_or_default()
    }

    /// 데이터 변환 (없으면 값 그대로)
    pub fn process_field_data(&self, field: &Field, value: &Value, operation: DataOperation) -> Value {
        match self.get(&field.field_type) {
            Some(plugin) => plugin.process(field, value, operation),
            None => value.clone(),
        }
    }

    /// 데이터 형식 검증 (없으면 valid)
    pub fn validate_field_data(&self, field: &Field, value: &Value) -> DataCheck {
        self.get(&field.field_type)
            .and_then(|plugin| {
                plugin
                    .data_processor
                    .as_ref()
                    .map(|processor| processor.validate(field, value))
            })
            .unwrap_or_else(DataCheck::valid)
    }

    /// JSON Schema 조각 (없으면 None)
    pub fn generate_field_schema(&self, field: &Field) -> Option<Value> {
        let plugin = self.get(&field.field_type)?;
        let generator = plugin.schema_generator.as_ref()?;
        Some(generator(field))
    }

    /// 등록 순서대로 모든 CSS 연결 (중복 제거 없음)
    pub fn get_all_styles(&self) -> String {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|t| inner.styles.get(t).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 등록 순서대로 모든 스크립트 연결 (중복 제거 없음)
    pub fn get_all_scripts(&self) -> String {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|t| inner.scripts.get(t).map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTypeRegistry")
            .field("types", &self.types())
            .finish()
    }
}
