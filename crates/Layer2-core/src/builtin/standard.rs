//! 표준 HTML 필드 타입
//!
//! 모든 표준 타입은 같은 선언 문법과 속성 집합을 공유하며, 생성기만 종류별로 다릅니다.
//!
//! ```text
//! @email: [email required placeholder="you@example.com"]
//! @color: [radio options="red,green,blue" other]
//! @bio: [textarea rows=4 maxlength=500]
//! ```

use super::declaration::Declaration;
use super::markup::{self, Attrs};
use super::range::NumericProcessor;
use super::toggle::BooleanProcessor;
use crate::field::{
    compile_pattern, display_value, escape_html, is_empty_value, is_valid_email, is_valid_url,
    number_value, value_as_f64, Field, FieldRule, HookContext,
};
use crate::registry::{DataProcessor, FieldTypePlugin};
use serde_json::{json, Map, Value};

/// 표준 타입 목록 (등록 순서)
pub const STANDARD_TYPES: &[&str] = &[
    "text",
    "email",
    "password",
    "number",
    "tel",
    "url",
    "date",
    "time",
    "datetime-local",
    "month",
    "week",
    "color",
    "file",
    "textarea",
    "select",
    "radio",
    "checkbox",
    "hidden",
];

const NUMERIC_ATTRS: &[&str] = &["min", "max", "step", "minlength", "maxlength", "rows"];
const FLAG_ATTRS: &[&str] = &["multiple", "readonly", "disabled", "other"];
const KNOWN: &[&str] = &[
    "min",
    "max",
    "step",
    "minlength",
    "maxlength",
    "rows",
    "multiple",
    "readonly",
    "disabled",
    "other",
    "options",
];

const STYLES: &str = ".formdown-field{display:flex;flex-direction:column;gap:.25rem;margin-bottom:1rem}\
.formdown-required{color:#dc2626}\
.formdown-options{display:flex;flex-wrap:wrap;gap:.75rem;border:0;padding:0}";

/// 표준 타입 하나의 플러그인
///
/// 공통 CSS는 `text`에만 실어 한 번만 수집되도록 합니다.
pub fn standard_field_type(keyword: &'static str) -> FieldTypePlugin {
    let mut plugin = FieldTypePlugin::new(keyword)
        .with_parser(move |content, _ctx| parse(content, keyword))
        .with_generator(generate)
        .with_validator(validate)
        .with_schema_generator(schema);

    match keyword {
        "number" => plugin = plugin.with_data_processor(NumericProcessor),
        "checkbox" => plugin = plugin.with_data_processor(CheckboxProcessor),
        _ => {}
    }
    if keyword == "text" {
        plugin = plugin.with_styles(STYLES);
    }
    plugin
}

/// 전체 표준 타입 플러그인
pub fn standard_field_types() -> Vec<FieldTypePlugin> {
    STANDARD_TYPES
        .iter()
        .map(|keyword| standard_field_type(*keyword))
        .collect()
}

// ============================================================================
// Parser
// ============================================================================

fn parse(content: &str, keyword: &str) -> Option<Field> {
    let decl = Declaration::parse_keyword(content, keyword)?;
    let mut field = decl.field(keyword);

    for (key, value) in decl.extra(KNOWN) {
        field.attributes.insert(key.to_string(), value);
    }
    for key in NUMERIC_ATTRS {
        if let Some(n) = decl.number(key) {
            field.attributes.insert(key.to_string(), number_value(n));
        }
    }
    for key in FLAG_ATTRS {
        if decl.flag(key) {
            field.attributes.insert(key.to_string(), json!(true));
        }
    }
    if let Some(options) = decl.list("options") {
        field.attributes.insert("options".into(), json!(options));
    }
    Some(field)
}

fn options(field: &Field) -> Vec<String> {
    field
        .attr("options")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(display_value).collect())
        .unwrap_or_default()
}

// ============================================================================
// Generator
// ============================================================================

fn generate(field: &Field, ctx: &HookContext) -> String {
    let body = match field.field_type.as_str() {
        "textarea" => textarea(field, ctx),
        "select" => select(field, ctx),
        "radio" => choice_group(field, ctx, "radio"),
        "checkbox" if field.attr("options").is_some() => choice_group(field, ctx, "checkbox"),
        "checkbox" => single_checkbox(field, ctx),
        "hidden" => return format!("<input{}>", input_attrs(field, ctx).build()),
        _ => format!("{}<input{}>", markup::label(field), input_attrs(field, ctx).build()),
    };
    markup::wrap(field, &body)
}

fn input_attrs(field: &Field, ctx: &HookContext) -> Attrs {
    Attrs::new()
        .attr("type", &field.field_type)
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr_opt("placeholder", field.attr("placeholder"))
        .attr_opt("pattern", field.attr("pattern"))
        .attr_opt("min", field.attr("min"))
        .attr_opt("max", field.attr("max"))
        .attr_opt("step", field.attr("step"))
        .attr_opt("minlength", field.attr("minlength"))
        .attr_opt("maxlength", field.attr("maxlength"))
        .attr_opt("value", field.attr("value"))
        .flag("multiple", field.attr_bool("multiple"))
        .flag("readonly", field.attr_bool("readonly"))
        .flag("disabled", field.attr_bool("disabled"))
        .flag("required", field.required)
        .form(ctx)
}

fn textarea(field: &Field, ctx: &HookContext) -> String {
    let attrs = Attrs::new()
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr_opt("rows", field.attr("rows"))
        .attr_opt("placeholder", field.attr("placeholder"))
        .attr_opt("minlength", field.attr("minlength"))
        .attr_opt("maxlength", field.attr("maxlength"))
        .flag("readonly", field.attr_bool("readonly"))
        .flag("disabled", field.attr_bool("disabled"))
        .flag("required", field.required)
        .form(ctx)
        .build();
    let value = field.attr("value").map(display_value).unwrap_or_default();
    format!(
        "{}<textarea{}>{}</textarea>",
        markup::label(field),
        attrs,
        escape_html(&value)
    )
}

fn select(field: &Field, ctx: &HookContext) -> String {
    let attrs = Attrs::new()
        .attr("id", &field.name)
        .attr("name", &field.name)
        .flag("multiple", field.attr_bool("multiple"))
        .flag("disabled", field.attr_bool("disabled"))
        .flag("required", field.required)
        .form(ctx)
        .build();
    let selected = field.attr("value").map(display_value);

    let mut html = format!("{}<select{}>", markup::label(field), attrs);
    if let Some(placeholder) = field.attr_str("placeholder") {
        html.push_str(&format!(
            r#"<option value="" disabled{}>{}</option>"#,
            if selected.is_none() { " selected" } else { "" },
            escape_html(placeholder)
        ));
    }
    for option in options(field) {
        let attrs = Attrs::new()
            .attr("value", &option)
            .flag("selected", selected.as_deref() == Some(option.as_str()))
            .build();
        html.push_str(&format!("<option{}>{}</option>", attrs, escape_html(&option)));
    }
    html.push_str("</select>");
    html
}

/// radio / checkbox 그룹 (`other` 플래그면 자유 입력 항목 추가)
fn choice_group(field: &Field, ctx: &HookContext, kind: &str) -> String {
    let name = &field.name;
    let mut html = format!(
        r#"<fieldset class="formdown-options"><legend>{}{}</legend>"#,
        escape_html(&field.label),
        if field.required {
            r#" <span class="formdown-required">*</span>"#
        } else {
            ""
        }
    );

    for (i, option) in options(field).iter().enumerate() {
        let id = format!("{name}_{i}");
        let input = Attrs::new()
            .attr("type", kind)
            .attr("id", &id)
            .attr("name", name)
            .attr("value", option)
            .flag("required", field.required && kind == "radio" && i == 0)
            .form(ctx)
            .build();
        html.push_str(&format!(
            r#"<label for="{}"><input{}> {}</label>"#,
            escape_html(&id),
            input,
            escape_html(option)
        ));
    }

    if field.attr_bool("other") {
        let sentinel = format!("{name}_other_{kind}");
        let sentinel_input = Attrs::new()
            .attr("type", kind)
            .attr("id", &sentinel)
            .attr("name", name)
            .attr("value", "")
            .form(ctx)
            .build();
        let text_input = Attrs::new()
            .attr("type", "text")
            .attr("id", format!("{name}_other_input"))
            .attr("name", format!("{name}_other"))
            .attr("placeholder", "Other")
            .form(ctx)
            .build();
        html.push_str(&format!(
            r#"<label for="{}"><input{}> Other</label><input{}>"#,
            escape_html(&sentinel),
            sentinel_input,
            text_input
        ));
    }

    html.push_str("</fieldset>");
    html
}

/// 옵션 없는 단일 체크박스 (`value="true"`, 불리언)
fn single_checkbox(field: &Field, ctx: &HookContext) -> String {
    let input = Attrs::new()
        .attr("type", "checkbox")
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr("value", "true")
        .flag("checked", field.attr_bool("checked"))
        .flag("disabled", field.attr_bool("disabled"))
        .flag("required", field.required)
        .form(ctx)
        .build();
    format!(
        r#"<label for="{}"><input{}> {}</label>"#,
        escape_html(&field.name),
        input,
        escape_html(&field.label)
    )
}

// ============================================================================
// Validator
// ============================================================================

/// 카테고리별 최대 하나: required / type / min / max / minlength / maxlength / pattern
fn validate(field: &Field, value: &Value) -> Vec<FieldRule> {
    let unchecked = field.field_type == "checkbox" && value == &Value::Bool(false);
    if is_empty_value(value) || unchecked {
        if field.required {
            return vec![FieldRule::new("required", format!("{} is required", field.label))];
        }
        return vec![];
    }

    let label = &field.label;
    let mut rules = Vec::new();

    match field.field_type.as_str() {
        "number" => {
            let Some(n) = value_as_f64(value) else {
                return vec![FieldRule::new("type", format!("{label} must be a number"))];
            };
            if let Some(min) = field.attr_f64("min").filter(|min| n < *min) {
                rules.push(
                    FieldRule::new("min", format!("{label} must be at least {min}"))
                        .with_value(number_value(min)),
                );
            }
            if let Some(max) = field.attr_f64("max").filter(|max| n > *max) {
                rules.push(
                    FieldRule::new("max", format!("{label} must be at most {max}"))
                        .with_value(number_value(max)),
                );
            }
            return rules;
        }
        "email" => {
            let valid = value.as_str().is_some_and(is_valid_email);
            if !valid {
                return vec![FieldRule::new(
                    "type",
                    format!("{label} must be a valid email address"),
                )];
            }
        }
        "url" => {
            let valid = value.as_str().is_some_and(is_valid_url);
            if !valid {
                return vec![FieldRule::new("type", format!("{label} must be a valid URL"))];
            }
        }
        _ => {}
    }

    if let Value::String(s) = value {
        let len = s.chars().count() as f64;
        if let Some(min) = field.attr_f64("minlength").filter(|min| len < *min) {
            rules.push(
                FieldRule::new(
                    "minlength",
                    format!("{label} must be at least {min} characters"),
                )
                .with_value(number_value(min)),
            );
        }
        if let Some(max) = field.attr_f64("maxlength").filter(|max| len > *max) {
            rules.push(
                FieldRule::new(
                    "maxlength",
                    format!("{label} must be at most {max} characters"),
                )
                .with_value(number_value(max)),
            );
        }
        if let Some(pattern) = field.attr_str("pattern") {
            let matched = compile_pattern(pattern)
                .map(|re| re.is_match(s))
                .unwrap_or(true);
            if !matched {
                rules.push(
                    FieldRule::new("pattern", format!("{label} has an invalid format"))
                        .with_value(json!(pattern)),
                );
            }
        }
    }
    rules
}

// ============================================================================
// Schema
// ============================================================================

fn schema(field: &Field) -> Value {
    let mut schema = Map::new();
    let options = options(field);

    match field.field_type.as_str() {
        "number" => {
            schema.insert("type".into(), json!("number"));
            for (attr, key) in [("min", "minimum"), ("max", "maximum"), ("step", "multipleOf")] {
                if let Some(n) = field.attr_f64(attr) {
                    schema.insert(key.into(), number_value(n));
                }
            }
        }
        "checkbox" if options.is_empty() => {
            schema.insert("type".into(), json!("boolean"));
        }
        "checkbox" => {
            schema.insert("type".into(), json!("array"));
            let mut items = json!({ "type": "string" });
            if !field.attr_bool("other") {
                items["enum"] = json!(options);
            }
            schema.insert("items".into(), items);
        }
        "select" | "radio" => {
            schema.insert("type".into(), json!("string"));
            if !options.is_empty() && !field.attr_bool("other") {
                schema.insert("enum".into(), json!(options));
            }
        }
        other => {
            schema.insert("type".into(), json!("string"));
            let format = match other {
                "email" => Some("email"),
                "url" => Some("uri"),
                "date" => Some("date"),
                "time" => Some("time"),
                "datetime-local" => Some("date-time"),
                "file" => Some("binary"),
                _ => None,
            };
            if let Some(format) = format {
                schema.insert("format".into(), json!(format));
            }
            if let Some(n) = field.attr_f64("minlength") {
                schema.insert("minLength".into(), number_value(n));
            }
            if let Some(n) = field.attr_f64("maxlength") {
                schema.insert("maxLength".into(), number_value(n));
            }
            if let Some(pattern) = field.attr("pattern") {
                schema.insert("pattern".into(), pattern.clone());
            }
        }
    }
    Value::Object(schema)
}

// ============================================================================
// DataProcessor
// ============================================================================

/// checkbox: 옵션 그룹이면 배열, 단일이면 불리언
struct CheckboxProcessor;

impl DataProcessor for CheckboxProcessor {
    fn serialize(&self, value: &Value) -> String {
        match value {
            Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
            other => BooleanProcessor.serialize(other),
        }
    }

    fn deserialize(&self, raw: &str) -> Value {
        match raw {
            "true" | "false" => BooleanProcessor.deserialize(raw),
            "" => json!([]),
            list => json!(list.split(',').map(str::trim).collect::<Vec<_>>()),
        }
    }

    fn process_input(&self, field: &Field, value: &Value) -> Value {
        match value {
            Value::Array(_) => value.clone(),
            other if field.attr("options").is_none() => BooleanProcessor.process_input(field, other),
            Value::Null => json!([]),
            other => json!([display_value(other)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DataOperation;

    fn parsed(line: &str, keyword: &'static str) -> Field {
        parse(line, keyword).unwrap()
    }

    #[test]
    fn test_parse_common_attributes() {
        let field = parsed(
            r#"@bio(About you): [textarea rows=4 maxlength=500 placeholder="Tell us" required]"#,
            "textarea",
        );
        assert!(field.required);
        assert_eq!(field.label, "About you");
        assert_eq!(field.attributes["rows"], json!(4));
        assert_eq!(field.attributes["maxlength"], json!(500));
        assert_eq!(field.attributes["placeholder"], json!("Tell us"));
        assert!(!field.attributes.contains_key("required"));
    }

    #[test]
    fn test_parse_options_list() {
        let field = parsed(r#"@color: [radio options="red, green,blue" other]"#, "radio");
        assert_eq!(field.attributes["options"], json!(["red", "green", "blue"]));
        assert_eq!(field.attributes["other"], json!(true));
        assert!(parse("@color: [radio]", "select").is_none());
    }

    #[test]
    fn test_choice_group_sentinels() {
        let field = parsed(r#"@topics: [checkbox options="a,b" other]"#, "checkbox");
        let html = generate(&field, &HookContext::new());
        assert!(html.contains(r#"id="topics_0""#));
        assert!(html.contains(r#"<input type="checkbox" id="topics_other_checkbox" name="topics" value="">"#));
        assert!(html.contains(r#"id="topics_other_input""#));

        let field = parsed(r#"@size: [radio options="s,m" other]"#, "radio");
        let html = generate(&field, &HookContext::new());
        assert!(html.contains(r#"id="size_other_radio""#));
    }

    #[test]
    fn test_single_checkbox_is_boolean() {
        let field = parsed("@agree: [checkbox required]", "checkbox");
        let html = generate(&field, &HookContext::new());
        assert!(html.contains(r#"value="true" required"#));
        assert_eq!(schema(&field), json!({ "type": "boolean" }));

        let plugin = standard_field_type("checkbox");
        assert_eq!(plugin.process(&field, &json!("on"), DataOperation::Input), json!(true));
        assert_eq!(validate(&field, &json!(false))[0].rule_type, "required");
    }

    #[test]
    fn test_input_attribute_order() {
        let field = parsed(
            r#"@age: [number min=18 max=99 placeholder="Age" required]"#,
            "number",
        );
        let ctx = HookContext::new().with_metadata("formId", json!("signup"));
        let html = generate(&field, &ctx);
        assert!(html.contains(
            r#"<input type="number" id="age" name="age" placeholder="Age" min="18" max="99" required form="signup">"#
        ));
    }

    #[test]
    fn test_validate_categories() {
        let email = parsed("@email: [email required]", "email");
        assert_eq!(validate(&email, &json!(""))[0].rule_type, "required");
        assert_eq!(validate(&email, &json!("nope"))[0].rule_type, "type");
        assert!(validate(&email, &json!("a@b.co")).is_empty());

        let age = parsed("@age: [number min=18 max=99]", "number");
        assert_eq!(validate(&age, &json!(10))[0].rule_type, "min");
        assert_eq!(validate(&age, &json!("x"))[0].rule_type, "type");
        assert!(validate(&age, &Value::Null).is_empty());

        let code = parsed(r#"@code: [text pattern="[A-Z]{3}" minlength=3]"#, "text");
        let kinds: Vec<_> = validate(&code, &json!("ab"))
            .into_iter()
            .map(|r| r.rule_type)
            .collect();
        assert_eq!(kinds, vec!["minlength", "pattern"]);
    }

    #[test]
    fn test_schema_shapes() {
        let email = parsed("@email: [email maxlength=80]", "email");
        assert_eq!(
            schema(&email),
            json!({ "type": "string", "format": "email", "maxLength": 80 })
        );

        let color = parsed(r#"@color: [select options="red,blue"]"#, "select");
        assert_eq!(
            schema(&color),
            json!({ "type": "string", "enum": ["red", "blue"] })
        );
    }

    #[test]
    fn test_all_standard_types_parse_their_keyword() {
        for keyword in STANDARD_TYPES {
            let plugin = standard_field_type(*keyword);
            let line = format!("@f: [{keyword}]");
            let field = plugin.parse(&line, &mut HookContext::new()).unwrap();
            assert_eq!(field.field_type, *keyword);
        }
    }

    #[test]
    fn test_regex_pattern_attribute_validates() {
        let zip = parsed(r#"@zip: [text pattern="\d{5}"]"#, "text");
        assert_eq!(zip.attributes["pattern"], json!(r"\d{5}"));
        assert!(validate(&zip, &json!("12345")).is_empty());
        assert_eq!(validate(&zip, &json!("1234"))[0].rule_type, "pattern");
        assert_eq!(schema(&zip)["pattern"], json!(r"\d{5}"));
    }

    #[test]
    fn test_url_requires_absolute_address() {
        let site = parsed("@site: [url]", "url");
        assert!(validate(&site, &json!("https://formdown.dev")).is_empty());
        assert!(validate(&site, &json!("ftp://files.formdown.dev")).is_empty());
        assert_eq!(validate(&site, &json!("https://"))[0].rule_type, "type");
        assert_eq!(validate(&site, &json!("formdown.dev"))[0].rule_type, "type");
    }
}
