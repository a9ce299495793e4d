//! `toggle` 필드 타입 - on/off 스위치
//!
//! ```text
//! @dark_mode: [toggle checked]
//! ```

use super::declaration::Declaration;
use super::markup::{self, Attrs};
use crate::field::{escape_html, Field, FieldRule, HookContext};
use crate::registry::{DataCheck, DataProcessor, FieldTypePlugin};
use serde_json::{json, Value};

pub const TOGGLE_TYPE: &str = "toggle";

const KNOWN: &[&str] = &["checked"];

const STYLES: &str = ".formdown-toggle-label{display:inline-flex;align-items:center;gap:.5rem;cursor:pointer}\
.formdown-toggle-label input{appearance:none;width:2.5rem;height:1.4rem;border-radius:1rem;background:#ccc;transition:background .2s}\
.formdown-toggle-label input:checked{background:#2563eb}";

const CLIENT_SCRIPT: &str = "document.querySelectorAll('.formdown-toggle input[role=switch]').forEach(function(el){\
el.setAttribute('aria-checked',el.checked);el.addEventListener('change',function(){el.setAttribute('aria-checked',el.checked);});});";

/// toggle 필드 타입 플러그인
pub fn toggle_field_type() -> FieldTypePlugin {
    FieldTypePlugin::new(TOGGLE_TYPE)
        .with_default_attribute("checked", json!(false))
        .with_parser(parse)
        .with_generator(generate)
        .with_validator(validate)
        .with_data_processor(BooleanProcessor)
        .with_schema_generator(|_| json!({ "type": "boolean" }))
        .with_styles(STYLES)
        .with_client_script(CLIENT_SCRIPT)
}

fn parse(content: &str, _ctx: &mut HookContext) -> Option<Field> {
    let decl = Declaration::parse_keyword(content, TOGGLE_TYPE)?;

    let mut field = decl
        .field(TOGGLE_TYPE)
        .with_attribute("checked", json!(decl.flag("checked")));
    for (key, value) in decl.extra(KNOWN) {
        field.attributes.insert(key.to_string(), value);
    }
    Some(field)
}

/// required면 켜져 있어야 하고, 값은 불리언(또는 불리언 문자열)이어야 함
fn validate(field: &Field, value: &Value) -> Vec<FieldRule> {
    let Some(on) = as_bool(value) else {
        if value.is_null() {
            return required_rule(field, false);
        }
        return vec![FieldRule::new("type", format!("{} must be on or off", field.label))];
    };
    required_rule(field, on)
}

fn required_rule(field: &Field, on: bool) -> Vec<FieldRule> {
    if field.required && !on {
        vec![FieldRule::new("required", format!("{} must be turned on", field.label))]
    } else {
        vec![]
    }
}

fn generate(field: &Field, ctx: &HookContext) -> String {
    let input = Attrs::new()
        .attr("type", "checkbox")
        .attr("role", "switch")
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr("value", "true")
        .flag("checked", field.attr_bool("checked"))
        .flag("required", field.required)
        .flag("disabled", field.attr_bool("disabled"))
        .form(ctx)
        .build();

    markup::wrap(
        field,
        &format!(
            r#"<label class="formdown-toggle-label" for="{}"><input{}><span class="formdown-toggle-text">{}</span></label>"#,
            escape_html(&field.name),
            input,
            escape_html(&field.label)
        ),
    )
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "on" | "1" | "yes" => Some(true),
            "false" | "off" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        _ => None,
    }
}

// ============================================================================
// DataProcessor
// ============================================================================

/// 불리언 변환기 (실패 없이 false로 수렴)
pub(crate) struct BooleanProcessor;

impl DataProcessor for BooleanProcessor {
    fn serialize(&self, value: &Value) -> String {
        as_bool(value).unwrap_or(false).to_string()
    }

    fn deserialize(&self, raw: &str) -> Value {
        Value::Bool(raw == "true")
    }

    fn process_input(&self, _field: &Field, value: &Value) -> Value {
        let on = match value {
            Value::Bool(b) => *b,
            Value::String(s) => matches!(s.as_str(), "true" | "on" | "1" | "yes"),
            _ => false,
        };
        Value::Bool(on)
    }

    fn process_output(&self, _field: &Field, value: &Value) -> Value {
        Value::Bool(as_bool(value).unwrap_or(false))
    }

    fn validate(&self, _field: &Field, value: &Value) -> DataCheck {
        if value.is_null() || as_bool(value).is_some() {
            DataCheck::valid()
        } else {
            DataCheck::invalid(vec!["value is not a boolean".to_string()])
        }
    }
}
