//! Field 모델 - 파싱된 폼 필드 선언
//!
//! `@name(label): [type attr=value ...]` 한 줄이 하나의 [`Field`]가 됩니다.

mod attrs;
mod context;
mod format;

pub use attrs::{tokenize_attributes, AttributeToken};
pub use context::{ContentNode, HookContext, ParseResult};
pub use format::{compile_pattern, is_valid_email, is_valid_url};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 폼 데이터 (필드 이름 → 값)
pub type FormData = Map<String, Value>;

/// 필드 속성 (삽입 순서 유지)
pub type Attributes = Map<String, Value>;

// ============================================================================
// Field
// ============================================================================

/// 파싱된 폼 필드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// 폼 내 고유 키
    pub name: String,

    /// FieldTypeRegistry 디스패치 키
    #[serde(rename = "type")]
    pub field_type: String,

    /// 표시 텍스트
    pub label: String,

    /// 필수 여부
    #[serde(default)]
    pub required: bool,

    /// 타입별 속성
    #[serde(default)]
    pub attributes: Attributes,
}

impl Field {
    /// 새 필드 생성 (label은 name에서 유도)
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: label_from_name(&name),
            name,
            field_type: field_type.into(),
            required: false,
            attributes: Attributes::new(),
        }
    }

    /// 라벨 지정
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// 필수 필드로 지정
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// 속성 추가
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// 속성 조회
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// 숫자 속성 조회
    pub fn attr_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(value_as_f64)
    }

    /// 문자열 속성 조회
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// 불리언 속성 조회 (없으면 false)
    pub fn attr_bool(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

// ============================================================================
// FieldRule - 필드 타입 검증 결과 규칙
// ============================================================================

/// 필드 타입 플러그인의 validator가 반환하는 위반 규칙
///
/// 카테고리(`required`, `type`, `min`, `max`, `step` ...)당 최대 하나씩 생성됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// 규칙 카테고리
    #[serde(rename = "type")]
    pub rule_type: String,

    /// 위반된 제약 값 (예: step 5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// 사용자 메시지
    pub message: String,
}

impl FieldRule {
    pub fn new(rule_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            value: None,
            message: message.into(),
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }
}

// ============================================================================
// 헬퍼 함수
// ============================================================================

/// snake_case / kebab-case 이름을 Title Case 라벨로 변환
///
/// `first_name` → `First Name`, `volume` → `Volume`
pub fn label_from_name(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// f64를 JSON 숫자로 변환 (정수면 정수 표현 유지)
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// JSON 값을 f64로 해석 (숫자 또는 숫자 문자열)
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// 값이 비어 있는지 확인 (null, 빈 문자열, 빈 배열)
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// 값을 표시용 문자열로 변환 (문자열은 따옴표 없이)
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// HTML 특수문자 이스케이프
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_from_name() {
        assert_eq!(label_from_name("volume"), "Volume");
        assert_eq!(label_from_name("first_name"), "First Name");
        assert_eq!(label_from_name("dark-mode"), "Dark Mode");
        assert_eq!(label_from_name("__x"), "X");
    }

    #[test]
    fn test_number_value_keeps_integers() {
        assert_eq!(number_value(50.0), json!(50));
        assert_eq!(number_value(0.5), json!(0.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    #[test]
    fn test_value_as_f64() {
        assert_eq!(value_as_f64(&json!(3)), Some(3.0));
        assert_eq!(value_as_f64(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(value_as_f64(&json!("abc")), None);
        assert_eq!(value_as_f64(&json!(true)), None);
    }

    #[test]
    fn test_field_serializes_type_key() {
        let field = Field::new("email", "email").required(true);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "email");
        assert_eq!(json["label"], "Email");
        assert_eq!(json["required"], true);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }
}
