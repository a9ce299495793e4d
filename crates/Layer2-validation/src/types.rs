//! 검증 데이터 모델
//!
//! - [`FieldType`]: 검증/값 추출 관점의 필드 타입
//! - [`FieldContext`] / [`FieldConstraints`]: 검증 대상 필드 선언
//! - [`ValidationError`] / [`ValidationResult`]: 검증 결과

use formdown_core::Field;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ============================================================================
// 에러 코드
// ============================================================================

pub mod codes {
    pub const REQUIRED: &str = "required";
    pub const EMAIL: &str = "email";
    pub const URL: &str = "url";
    pub const NUMBER: &str = "number";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const TEL: &str = "tel";
    pub const DATE: &str = "date";
    pub const PATTERN: &str = "pattern";
    pub const MIN_LENGTH: &str = "minlength";
    pub const MAX_LENGTH: &str = "maxlength";
    pub const CUSTOM: &str = "custom";
    pub const SERVER_ERROR: &str = "server_error";
    pub const SERVER_TIMEOUT: &str = "server_timeout";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const CROSS_FIELD: &str = "cross_field";
}

// ============================================================================
// FieldType
// ============================================================================

/// 필드 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    #[default]
    Text,
    Email,
    Password,
    Number,
    Tel,
    Url,
    Date,
    Time,
    DatetimeLocal,
    Month,
    Week,
    Color,
    File,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Hidden,
    Range,
    Toggle,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Tel => "tel",
            Self::Url => "url",
            Self::Date => "date",
            Self::Time => "time",
            Self::DatetimeLocal => "datetime-local",
            Self::Month => "month",
            Self::Week => "week",
            Self::Color => "color",
            Self::File => "file",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Hidden => "hidden",
            Self::Range => "range",
            Self::Toggle => "toggle",
        }
    }

    /// 네이티브 `type` 속성 값에서 변환 (알 수 없으면 `Text`)
    pub fn from_type_attr(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Self::Email,
            "password" => Self::Password,
            "number" => Self::Number,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime-local" => Self::DatetimeLocal,
            "month" => Self::Month,
            "week" => Self::Week,
            "color" => Self::Color,
            "file" => Self::File,
            "textarea" => Self::Textarea,
            "select" | "select-one" | "select-multiple" => Self::Select,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "hidden" => Self::Hidden,
            "range" => Self::Range,
            "toggle" => Self::Toggle,
            _ => Self::Text,
        }
    }

    /// 숫자형 (number, range)
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Range)
    }

    /// 날짜/시간 계열
    pub fn is_date_like(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::DatetimeLocal | Self::Month | Self::Week
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// FieldConstraints / FieldContext
// ============================================================================

/// 서버 검증 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerValidation {
    /// 검증 엔드포인트
    pub endpoint: String,

    /// 필드별 디바운스 (없으면 매니저 설정값)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl ServerValidation {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            debounce_ms: None,
        }
    }

    pub fn with_debounce(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = Some(debounce_ms);
        self
    }
}

/// 필드 제약 조건
///
/// `min` / `max`는 숫자 필드면 숫자, 날짜 필드면 `YYYY-MM-DD` 문자열입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraints {
    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// 등록된 커스텀 검증기 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_validator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_validation: Option<ServerValidation>,
}

impl FieldConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_min(mut self, min: Value) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: Value) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_custom_validator(mut self, name: impl Into<String>) -> Self {
        self.custom_validator = Some(name.into());
        self
    }

    pub fn with_server_validation(mut self, server: ServerValidation) -> Self {
        self.server_validation = Some(server);
        self
    }

    /// 파싱된 필드 선언에서 제약 조건 추출
    pub fn from_field(field: &Field) -> Self {
        let length = |key: &str| {
            field
                .attr_f64(key)
                .filter(|n| *n >= 0.0)
                .map(|n| n as usize)
        };

        Self {
            required: field.required,
            min: field.attr("min").cloned(),
            max: field.attr("max").cloned(),
            min_length: length("minlength"),
            max_length: length("maxlength"),
            pattern: field.attr_str("pattern").map(str::to_string),
            custom_validator: field.attr_str("validator").map(str::to_string),
            server_validation: None,
        }
    }
}

/// 검증 대상 필드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub field_name: String,
    pub field_type: FieldType,

    /// 메시지에 쓰이는 표시 이름 (없으면 필드 이름)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub constraints: FieldConstraints,
}

impl FieldContext {
    pub fn new(field_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            label: None,
            constraints: FieldConstraints::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_constraints(mut self, constraints: FieldConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.field_name)
    }
}

impl From<&Field> for FieldContext {
    fn from(field: &Field) -> Self {
        Self {
            field_name: field.name.clone(),
            field_type: FieldType::from_type_attr(&field.field_type),
            label: Some(field.label.clone()),
            constraints: FieldConstraints::from_field(field),
        }
    }
}

// ============================================================================
// ValidationError / ValidationResult
// ============================================================================

/// 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// 단일 검증 오류
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(field, code, message)
        }
    }
}

/// 검증 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationError>,

    /// 새 호출에 밀려 판정을 건너뛴 규칙이 있음 (캐시 대상 아님)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub superseded: bool,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            superseded: false,
        }
    }

    /// 밀려난 규칙의 결과 (통과로 취급)
    pub fn superseded() -> Self {
        Self {
            superseded: true,
            ..Self::valid()
        }
    }

    pub fn failure(error: ValidationError) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            superseded: false,
        }
    }

    /// 오류 목록으로 생성 (비어 있으면 유효)
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings: Vec::new(),
            superseded: false,
        }
    }

    pub fn with_warning(mut self, warning: ValidationError) -> Self {
        self.warnings.push(warning);
        self
    }

    /// 다른 결과 병합 (필드가 비어 있는 항목은 `field`로 귀속)
    pub fn merge(&mut self, other: ValidationResult, field: &str) {
        let attribute = |mut e: ValidationError| {
            if e.field.is_empty() {
                e.field = field.to_string();
            }
            e
        };
        let other_valid = other.is_valid;
        self.superseded |= other.superseded;
        self.errors.extend(other.errors.into_iter().map(attribute));
        self.warnings.extend(other.warnings.into_iter().map(attribute));
        self.is_valid = self.is_valid && other_valid && self.errors.is_empty();
    }

    /// 오류 메시지 목록
    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}
