//! # Field Processor
//!
//! 추상 요소/컨테이너에서 필드 값을 추출하고 간단히 검증하는 순수 함수 모음
//!
//! `radio` / `checkbox` 그룹의 "기타" 항목은 생성기가 출력하는 규칙을 따릅니다:
//! - `{name}_other_radio` / `{name}_other_checkbox`: 빈 value를 가진 센티널 항목
//! - `{name}_other_input`: 자유 입력 텍스트 박스

mod element;
mod selector;
mod snapshot;

pub use element::{ElementContainer, FieldElement};
pub use selector::Selector;
pub use snapshot::{ElementSnapshot, SnapshotContainer};

use crate::checks::{char_len, compile_pattern, is_valid_email, is_valid_tel, is_valid_url};
use crate::types::{FieldConstraints, FieldType};
use formdown_core::field::{display_value, is_empty_value, number_value, value_as_f64};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 그룹 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub success: bool,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ProcessResult {
    pub fn ok(value: Value) -> Self {
        Self {
            success: true,
            value,
            errors: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: Value::Null,
            errors: vec![message.into()],
        }
    }
}

/// "기타" 입력란의 trim된 값
fn other_input_value(field_name: &str, container: &dyn ElementContainer) -> Option<String> {
    container
        .query_selector(&format!("#{field_name}_other_input"))
        .map(|input| input.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 체크박스 그룹 처리
///
/// 체크박스가 하나뿐이고 value가 `"true"`이면 단일 불리언 체크박스로 취급합니다.
pub fn process_checkbox_group(field_name: &str, container: &dyn ElementContainer) -> ProcessResult {
    let boxes =
        container.query_selector_all(&format!(r#"input[type="checkbox"][name="{field_name}"]"#));

    if boxes.is_empty() {
        return ProcessResult::error(format!("No checkboxes found for field '{field_name}'"));
    }

    if let [single] = boxes.as_slice() {
        if single.value() == "true" {
            return ProcessResult::ok(Value::Bool(single.checked()));
        }
    }

    let mut values = Vec::new();
    for checkbox in boxes.iter().filter(|c| c.checked()) {
        if checkbox.id().contains("_other_checkbox") && checkbox.value().is_empty() {
            if let Some(other) = other_input_value(field_name, container) {
                values.push(Value::String(other));
            }
        } else {
            values.push(Value::String(checkbox.value().to_string()));
        }
    }

    ProcessResult::ok(Value::Array(values))
}

/// 라디오 그룹 처리 (선택 없음은 `null`)
pub fn process_radio_group(field_name: &str, container: &dyn ElementContainer) -> ProcessResult {
    let selected = container
        .query_selector(&format!(r#"input[type="radio"][name="{field_name}"]:checked"#));

    let Some(radio) = selected else {
        return ProcessResult::ok(Value::Null);
    };

    if radio.id().contains("_other_radio") && radio.value().is_empty() {
        return ProcessResult::ok(
            other_input_value(field_name, container)
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
    }

    ProcessResult::ok(Value::String(radio.value().to_string()))
}

/// 요소 값 추출
pub fn extract_field_value(element: &dyn FieldElement, field_type: FieldType) -> Value {
    if element.is_content_editable() {
        return json!(element.text_content().unwrap_or_default().trim());
    }

    let raw = element.value();
    match field_type {
        FieldType::Number | FieldType::Range => {
            let n = raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0);
            json!(n)
        }
        FieldType::File => {
            let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
            json!(base)
        }
        _ => json!(raw),
    }
}

/// 단순 동기 검증 (오류 메시지 목록)
pub fn validate_field_value(value: &Value, field_type: FieldType, constraints: &FieldConstraints) -> Vec<String> {
    let mut errors = Vec::new();

    if is_empty_value(value) {
        if constraints.required {
            errors.push("This field is required".to_string());
        }
        return errors;
    }

    let text = display_value(value);
    match field_type {
        FieldType::Email if !is_valid_email(&text) => {
            errors.push("Please enter a valid email address".to_string())
        }
        FieldType::Url if !is_valid_url(&text) => errors.push("Please enter a valid URL".to_string()),
        FieldType::Tel if !is_valid_tel(&text) => {
            errors.push("Please enter a valid phone number".to_string())
        }
        FieldType::Number | FieldType::Range => match value_as_f64(value) {
            None => errors.push("Please enter a valid number".to_string()),
            Some(n) => {
                if let Some(min) = constraints.min.as_ref().and_then(value_as_f64) {
                    if n < min {
                        errors.push(format!("Value must be at least {}", display_value(&number_value(min))));
                    }
                }
                if let Some(max) = constraints.max.as_ref().and_then(value_as_f64) {
                    if n > max {
                        errors.push(format!("Value must be at most {}", display_value(&number_value(max))));
                    }
                }
            }
        },
        _ => {}
    }

    if let Some(pattern) = &constraints.pattern {
        match compile_pattern(pattern) {
            Ok(re) if !re.is_match(&text) => errors.push("Please match the requested format".to_string()),
            Ok(_) => {}
            Err(_) => errors.push(format!("Invalid pattern '{pattern}'")),
        }
    }

    let len = char_len(&text);
    if let Some(min) = constraints.min_length.filter(|min| len < *min) {
        errors.push(format!("Must be at least {min} characters"));
    }
    if let Some(max) = constraints.max_length.filter(|max| len > *max) {
        errors.push(format!("Must be at most {max} characters"));
    }

    errors
}

/// 요소의 네이티브 `type`으로 필드 타입 판별 (없으면 태그, 그것도 아니면 `Text`)
pub fn get_field_type(element: &dyn FieldElement) -> FieldType {
    match element.element_type() {
        Some(t) if !t.trim().is_empty() => FieldType::from_type_attr(t),
        _ => FieldType::from_type_attr(element.tag_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interests(checked: [bool; 3]) -> SnapshotContainer {
        ["sports", "music", "travel"]
            .into_iter()
            .zip(checked)
            .enumerate()
            .map(|(i, (value, on))| {
                ElementSnapshot::input("checkbox", "interests")
                    .with_id(format!("interests_{i}"))
                    .with_value(value)
                    .with_checked(on)
            })
            .collect()
    }

    #[test]
    fn test_checkbox_group_values() {
        let result = process_checkbox_group("interests", &interests([true, false, true]));
        assert_eq!(result, ProcessResult::ok(json!(["sports", "travel"])));
    }

    #[test]
    fn test_single_boolean_checkbox() {
        let container = SnapshotContainer::new().with_element(
            ElementSnapshot::input("checkbox", "agree")
                .with_value("true")
                .with_checked(true),
        );
        let result = process_checkbox_group("agree", &container);
        assert!(result.success);
        assert_eq!(result.value, json!(true));
    }

    #[test]
    fn test_checkbox_other_substitution() {
        let container = interests([false, true, false])
            .with_element(
                ElementSnapshot::input("checkbox", "interests")
                    .with_id("interests_other_checkbox")
                    .with_checked(true),
            )
            .with_element(
                ElementSnapshot::input("text", "interests_other")
                    .with_id("interests_other_input")
                    .with_value("  chess "),
            );

        let result = process_checkbox_group("interests", &container);
        assert_eq!(result.value, json!(["music", "chess"]));

        let missing = process_checkbox_group("nothing", &container);
        assert!(!missing.success);
        assert_eq!(missing.errors.len(), 1);
    }

    #[test]
    fn test_radio_group() {
        let mut container: SnapshotContainer = ["s", "m"]
            .into_iter()
            .map(|v| ElementSnapshot::input("radio", "size").with_value(v))
            .collect();
        assert_eq!(process_radio_group("size", &container).value, Value::Null);

        container.push(
            ElementSnapshot::input("radio", "size")
                .with_id("size_other_radio")
                .with_checked(true),
        );
        container.push(
            ElementSnapshot::input("text", "size_other")
                .with_id("size_other_input")
                .with_value(" XXL "),
        );
        assert_eq!(process_radio_group("size", &container).value, json!("XXL"));

        container.elements[0].checked = true;
        container.elements[2].checked = false;
        assert_eq!(process_radio_group("size", &container).value, json!("s"));
    }

    #[test]
    fn test_extract_field_value() {
        let number = ElementSnapshot::input("number", "n").with_value("4.5");
        assert_eq!(extract_field_value(&number, FieldType::Number), json!(4.5));

        let garbage = ElementSnapshot::input("range", "r").with_value("loud");
        assert_eq!(extract_field_value(&garbage, FieldType::Range), json!(0.0));

        let file = ElementSnapshot::input("file", "f").with_value(r"C:\fakepath\resume.pdf");
        assert_eq!(extract_field_value(&file, FieldType::File), json!("resume.pdf"));

        let date = ElementSnapshot::input("date", "d").with_value("2024-05-01");
        assert_eq!(extract_field_value(&date, FieldType::Date), json!("2024-05-01"));

        let editable = ElementSnapshot::new("div")
            .with_attribute("contenteditable", "true")
            .with_text("  Hello  ");
        assert_eq!(extract_field_value(&editable, FieldType::Number), json!("Hello"));
    }

    #[test]
    fn test_validate_field_value() {
        let required = FieldConstraints::new().required(true);
        assert_eq!(
            validate_field_value(&json!(""), FieldType::Text, &required),
            vec!["This field is required"]
        );
        assert!(validate_field_value(&json!(""), FieldType::Email, &FieldConstraints::new()).is_empty());

        assert_eq!(
            validate_field_value(&json!("nope"), FieldType::Email, &FieldConstraints::new()).len(),
            1
        );

        let range = FieldConstraints::new().with_min(json!(1)).with_max(json!(10));
        assert_eq!(
            validate_field_value(&json!(11), FieldType::Number, &range),
            vec!["Value must be at most 10"]
        );

        let code = FieldConstraints::new()
            .with_pattern("[A-Z]+")
            .with_length(Some(3), Some(4));
        assert_eq!(
            validate_field_value(&json!("ab"), FieldType::Text, &code),
            vec!["Please match the requested format", "Must be at least 3 characters"]
        );
    }

    #[test]
    fn test_get_field_type() {
        assert_eq!(get_field_type(&ElementSnapshot::input("email", "e")), FieldType::Email);
        assert_eq!(get_field_type(&ElementSnapshot::input("search", "q")), FieldType::Text);
        assert_eq!(get_field_type(&ElementSnapshot::new("textarea")), FieldType::Textarea);
        assert_eq!(get_field_type(&ElementSnapshot::new("div")), FieldType::Text);
    }
}
