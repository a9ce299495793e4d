//! FieldTypePlugin - 필드 타입 하나의 동작 묶음
//!
//! 모든 동작은 선택 사항이며, 레지스트리는 없는 동작에 대해 안전한 기본값을 사용합니다.

use crate::field::{display_value, Attributes, Field, FieldRule, HookContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// 동작 시그니처
// ============================================================================

/// 선언 한 줄 → Field (인식하지 못하면 None)
pub type ParserFn = dyn Fn(&str, &mut HookContext) -> Option<Field> + Send + Sync;

/// Field → HTML 조각
pub type GeneratorFn = dyn Fn(&Field, &HookContext) -> String + Send + Sync;

/// (Field, 값) → 위반 규칙 목록
pub type ValidatorFn = dyn Fn(&Field, &Value) -> Vec<FieldRule> + Send + Sync;

/// Field → JSON Schema 조각
pub type SchemaFn = dyn Fn(&Field) -> Value + Send + Sync;

// ============================================================================
// DataProcessor
// ============================================================================

/// 데이터 변환 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOperation {
    /// 값 → 문자열
    Serialize,
    /// 문자열 → 값
    Deserialize,
    /// 입력 원시값 → 타입 값
    Input,
    /// 타입 값 → 출력 값
    Output,
}

/// 데이터 검증 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCheck {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl DataCheck {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// 필드 타입별 데이터 변환기
///
/// 구현하지 않은 메서드는 값을 그대로 통과시킵니다.
pub trait DataProcessor: Send + Sync {
    /// 값 → 문자열
    fn serialize(&self, value: &Value) -> String {
        display_value(value)
    }

    /// 문자열 → 값
    fn deserialize(&self, raw: &str) -> Value {
        Value::String(raw.to_string())
    }

    /// 입력 원시값을 타입 값으로 변환
    fn process_input(&self, _field: &Field, value: &Value) -> Value {
        value.clone()
    }

    /// 타입 값을 출력 값으로 변환
    fn process_output(&self, _field: &Field, value: &Value) -> Value {
        value.clone()
    }

    /// 데이터 형식 검증
    fn validate(&self, _field: &Field, _value: &Value) -> DataCheck {
        DataCheck::valid()
    }
}

// ============================================================================
// FieldTypePlugin
// ============================================================================

/// 필드 타입 플러그인
#[derive(Clone)]
pub struct FieldTypePlugin {
    /// 타입 키 (레지스트리 내 고유)
    pub field_type: String,

    pub parser: Option<Arc<ParserFn>>,
    pub generator: Option<Arc<GeneratorFn>>,
    pub validator: Option<Arc<ValidatorFn>>,
    pub data_processor: Option<Arc<dyn DataProcessor>>,
    pub schema_generator: Option<Arc<SchemaFn>>,

    /// 파서 결과 아래에 깔리는 기본 속성
    pub default_attributes: Attributes,

    /// CSS
    pub styles: Option<String>,

    /// 클라이언트 스크립트
    pub client_script: Option<String>,
}

impl FieldTypePlugin {
    pub fn new(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            parser: None,
            generator: None,
            validator: None,
            data_processor: None,
            schema_generator: None,
            default_attributes: Attributes::new(),
            styles: None,
            client_script: None,
        }
    }

    pub fn with_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&str, &mut HookContext) -> Option<Field> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn with_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Field, &HookContext) -> String + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Field, &Value) -> Vec<FieldRule> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_data_processor(mut self, processor: impl DataProcessor + 'static) -> Self {
        self.data_processor = Some(Arc::new(processor));
        self
    }

    pub fn with_schema_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Field) -> Value + Send + Sync + 'static,
    {
        self.schema_generator = Some(Arc::new(generator));
        self
    }

    pub fn with_default_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.default_attributes.insert(key.into(), value);
        self
    }

    pub fn with_styles(mut self, styles: impl Into<String>) -> Self {
        self.styles = Some(styles.into());
        self
    }

    pub fn with_client_script(mut self, script: impl Into<String>) -> Self {
        self.client_script = Some(script.into());
        self
    }

    // ========================================================================
    // 동작 호출 (없는 동작은 기본값)
    // ========================================================================

    /// 파서 실행
    pub fn parse(&self, content: &str, ctx: &mut HookContext) -> Option<Field> {
        self.parser.as_ref().and_then(|parser| parser(content, ctx))
    }

    /// 검증 규칙 생성 (validator 없으면 빈 목록)
    pub fn validate(&self, field: &Field, value: &Value) -> Vec<FieldRule> {
        self.validator
            .as_ref()
            .map(|validator| validator(field, value))
            .unwrap_or_default()
    }

    /// 데이터 변환 (processor 없으면 그대로)
    pub fn process(&self, field: &Field, value: &Value, operation: DataOperation) -> Value {
        let Some(processor) = &self.data_processor else {
            return value.clone();
        };

        match operation {
            DataOperation::Serialize => Value::String(processor.serialize(value)),
            DataOperation::Deserialize => match value {
                Value::String(raw) => processor.deserialize(raw),
                other => other.clone(),
            },
            DataOperation::Input => processor.process_input(field, value),
            DataOperation::Output => processor.process_output(field, value),
        }
    }
}

impl std::fmt::Debug for FieldTypePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTypePlugin")
            .field("field_type", &self.field_type)
            .field("parser", &self.parser.is_some())
            .field("generator", &self.generator.is_some())
            .field("validator", &self.validator.is_some())
            .field("data_processor", &self.data_processor.is_some())
            .field("schema_generator", &self.schema_generator.is_some())
            .field("default_attributes", &self.default_attributes)
            .finish()
    }
}
