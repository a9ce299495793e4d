//! `range` 필드 타입 - 슬라이더
//!
//! ```text
//! @volume(Volume level): [range min=0 max=11 step=1 unit="dB" hideValue]
//! ```

use super::declaration::Declaration;
use super::markup::{self, Attrs};
use crate::field::{
    display_value, escape_html, is_empty_value, number_value, value_as_f64, Field, FieldRule,
    HookContext,
};
use crate::registry::{DataCheck, DataProcessor, FieldTypePlugin};
use serde_json::{json, Map, Value};

pub const RANGE_TYPE: &str = "range";

const DEFAULT_MIN: f64 = 0.0;
const DEFAULT_MAX: f64 = 100.0;
const DEFAULT_STEP: f64 = 1.0;

/// step 배수 판정 허용 오차
const STEP_EPSILON: f64 = 1e-9;

const KNOWN: &[&str] = &["min", "max", "step", "value", "unit", "hideValue", "showValue"];

const STYLES: &str = ".formdown-range-container{display:flex;align-items:center;gap:.5rem}\
.formdown-range-container input[type=range]{flex:1}\
.formdown-range-value{min-width:3ch;font-variant-numeric:tabular-nums}";

const CLIENT_SCRIPT: &str = "document.querySelectorAll('.formdown-range input[type=range]').forEach(function(el){\
var out=el.parentElement.querySelector('output');if(!out)return;var unit=out.dataset.unit||'';\
el.addEventListener('input',function(){out.textContent=el.value+unit;});});";

/// range 필드 타입 플러그인
pub fn range_field_type() -> FieldTypePlugin {
    FieldTypePlugin::new(RANGE_TYPE)
        .with_parser(parse)
        .with_generator(generate)
        .with_validator(validate)
        .with_data_processor(NumericProcessor)
        .with_schema_generator(schema)
        .with_styles(STYLES)
        .with_client_script(CLIENT_SCRIPT)
}

// ============================================================================
// Parser
// ============================================================================

fn parse(content: &str, _ctx: &mut HookContext) -> Option<Field> {
    let decl = Declaration::parse_keyword(content, RANGE_TYPE)?;

    let min = decl.number("min").unwrap_or(DEFAULT_MIN);
    let max = decl.number("max").unwrap_or(DEFAULT_MAX);
    let step = decl.number("step").unwrap_or(DEFAULT_STEP);
    let value = decl.number("value").unwrap_or((min + max) / 2.0);

    let mut field = decl
        .field(RANGE_TYPE)
        .with_attribute("min", number_value(min))
        .with_attribute("max", number_value(max))
        .with_attribute("step", number_value(step))
        .with_attribute("value", number_value(value))
        .with_attribute("showValue", json!(!decl.flag("hideValue")))
        .with_attribute("unit", json!(decl.string("unit").unwrap_or_default()));

    for (key, value) in decl.extra(KNOWN) {
        field.attributes.insert(key.to_string(), value);
    }
    Some(field)
}

// ============================================================================
// Validator
// ============================================================================

/// required, type은 조기 반환하고 min/max/step은 각각 독립적으로 최대 하나씩 생성
fn validate(field: &Field, value: &Value) -> Vec<FieldRule> {
    if is_empty_value(value) {
        if field.required {
            return vec![FieldRule::new("required", format!("{} is required", field.label))];
        }
        return vec![];
    }

    let Some(n) = value_as_f64(value) else {
        return vec![FieldRule::new("type", format!("{} must be a number", field.label))];
    };

    let min = field.attr_f64("min").unwrap_or(DEFAULT_MIN);
    let max = field.attr_f64("max").unwrap_or(DEFAULT_MAX);
    let mut rules = Vec::new();

    if n < min {
        rules.push(
            FieldRule::new("min", format!("{} must be at least {}", field.label, min))
                .with_value(number_value(min)),
        );
    }
    if n > max {
        rules.push(
            FieldRule::new("max", format!("{} must be at most {}", field.label, max))
                .with_value(number_value(max)),
        );
    }
    if let Some(step) = field.attr_f64("step").filter(|s| *s > 0.0) {
        let steps = (n - min) / step;
        if (steps - steps.round()).abs() > STEP_EPSILON {
            rules.push(
                FieldRule::new(
                    "step",
                    format!("{} must be in increments of {}", field.label, step),
                )
                .with_value(number_value(step)),
            );
        }
    }
    rules
}

// ============================================================================
// Generator
// ============================================================================

fn generate(field: &Field, ctx: &HookContext) -> String {
    let input = Attrs::new()
        .attr("type", "range")
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr_opt("min", field.attr("min"))
        .attr_opt("max", field.attr("max"))
        .attr_opt("step", field.attr("step"))
        .attr_opt("value", field.attr("value"))
        .flag("required", field.required)
        .flag("disabled", field.attr_bool("disabled"))
        .form(ctx)
        .build();

    let output = if field.attr_bool("showValue") {
        let unit = field.attr_str("unit").unwrap_or_default();
        let value = field.attr("value").map(display_value).unwrap_or_default();
        format!(
            r#"<output for="{name}" class="formdown-range-value" data-unit="{unit}">{value}{unit}</output>"#,
            name = escape_html(&field.name),
            unit = escape_html(unit),
            value = escape_html(&value),
        )
    } else {
        String::new()
    };

    markup::wrap(
        field,
        &format!(
            r#"{}<div class="formdown-range-container"><input{}>{}</div>"#,
            markup::label(field),
            input,
            output
        ),
    )
}

// ============================================================================
// Schema
// ============================================================================

fn schema(field: &Field) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), json!("number"));
    schema.insert(
        "minimum".into(),
        number_value(field.attr_f64("min").unwrap_or(DEFAULT_MIN)),
    );
    schema.insert(
        "maximum".into(),
        number_value(field.attr_f64("max").unwrap_or(DEFAULT_MAX)),
    );
    if let Some(step) = field.attr_f64("step") {
        schema.insert("multipleOf".into(), number_value(step));
    }
    Value::Object(schema)
}

// ============================================================================
// DataProcessor
// ============================================================================

/// 숫자형 변환기 (파싱 실패 시 null)
pub(crate) struct NumericProcessor;

impl DataProcessor for NumericProcessor {
    fn serialize(&self, value: &Value) -> String {
        display_value(value)
    }

    fn deserialize(&self, raw: &str) -> Value {
        parse_number(&Value::String(raw.to_string()))
    }

    fn process_input(&self, _field: &Field, value: &Value) -> Value {
        parse_number(value)
    }

    fn validate(&self, _field: &Field, value: &Value) -> DataCheck {
        if is_empty_value(value) || value_as_f64(value).is_some() {
            DataCheck::valid()
        } else {
            DataCheck::invalid(vec![format!("'{}' is not a number", display_value(value))])
        }
    }
}

fn parse_number(value: &Value) -> Value {
    value_as_f64(value).map(number_value).unwrap_or(Value::Null)
}
