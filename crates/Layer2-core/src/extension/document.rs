//! 문서 파이프라인 - parse / generate / schema / validate
//!
//! ```text
//! source ─► pre-parse ─► 줄 단위 parse_field ─► field-parse ─► post-parse ─► ParseResult
//! ParseResult ─► pre-generate ─► field-render | generator | fallback ─► post-generate ─► HTML
//! ```

use super::manager::ExtensionManager;
use crate::builtin::markup::{self, Attrs};
use crate::field::{ContentNode, Field, FieldRule, HookContext, ParseResult};
use crate::hook::HookPoint;
use formdown_foundation::Result;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

impl ExtensionManager {
    // ========================================================================
    // Parse
    // ========================================================================

    /// 문서 파싱
    pub async fn parse(&self, source: &str) -> Result<ParseResult> {
        self.parse_with(source, HookContext::new()).await
    }

    /// 컨텍스트(메타데이터)를 지정해 문서 파싱
    ///
    /// 인식되지 않은 줄은 원문 그대로 `Text` 노드가 됩니다.
    pub async fn parse_with(&self, source: &str, mut ctx: HookContext) -> Result<ParseResult> {
        ctx.input = Some(source.to_string());
        let replaced = self.hooks.execute(&HookPoint::PreParse, &mut ctx, &[]).await?;
        let input = last_string(&replaced)
            .or_else(|| ctx.input.clone())
            .unwrap_or_default();

        let mut result = ParseResult::new();
        let mut seen = HashSet::new();

        for line in input.lines() {
            let trimmed = line.trim();
            let parsed = if trimmed.starts_with('@') {
                self.registry.parse_field(trimmed, &mut ctx)
            } else {
                None
            };

            let Some(field) = parsed else {
                result.push_text(line);
                continue;
            };

            ctx.field = Some(field);
            self.hooks
                .execute(&HookPoint::FieldParse, &mut ctx, &[])
                .await?;

            // field-parse Hook이 필드를 제거하면 원문 유지
            match ctx.field.take() {
                Some(field) => {
                    if !seen.insert(field.name.clone()) {
                        warn!(field = %field.name, "Duplicate field name in document");
                    }
                    result.push_field(field);
                }
                None => result.push_text(line),
            }
        }

        debug!(fields = result.fields.len(), "Parsed document");

        ctx.parse_result = Some(result);
        self.hooks
            .execute(&HookPoint::PostParse, &mut ctx, &[])
            .await?;
        Ok(ctx.parse_result.take().unwrap_or_default())
    }

    // ========================================================================
    // Generate
    // ========================================================================

    /// HTML 생성
    ///
    /// 필드마다 `field-render` Hook이 처음 반환한 문자열이 있으면 그것을 사용하고,
    /// 없으면 타입 generator, 그것도 없으면 일반 text input을 출력합니다.
    pub async fn generate(&self, result: &ParseResult, mut ctx: HookContext) -> Result<String> {
        ctx.parse_result = Some(result.clone());
        self.hooks
            .execute(&HookPoint::PreGenerate, &mut ctx, &[])
            .await?;
        let document = ctx.parse_result.take().unwrap_or_else(|| result.clone());

        let mut parts = Vec::with_capacity(document.content.len());
        for node in &document.content {
            match node {
                ContentNode::Text { text } => parts.push(text.clone()),
                ContentNode::Field { index } => {
                    let Some(field) = document.fields.get(*index) else {
                        continue;
                    };
                    ctx.field = Some(field.clone());
                    let overrides = self
                        .hooks
                        .execute(&HookPoint::FieldRender, &mut ctx, &[])
                        .await?;

                    let html = overrides
                        .iter()
                        .find_map(|v| v.as_str().map(str::to_string))
                        .or_else(|| self.registry.generate_field_html(field, &ctx))
                        .unwrap_or_else(|| fallback_html(field, &ctx));
                    parts.push(html);
                }
            }
        }
        ctx.field = None;
        ctx.parse_result = Some(document);

        let html = parts.join("\n");
        let replaced = self
            .hooks
            .execute(&HookPoint::PostGenerate, &mut ctx, &[json!(html)])
            .await?;
        Ok(last_string(&replaced).unwrap_or(html))
    }

    /// 모든 필드 타입의 CSS / 스크립트를 포함한 독립 HTML 문서
    pub async fn generate_document(&self, result: &ParseResult, ctx: HookContext) -> Result<String> {
        let body = self.generate(result, ctx).await?;
        let styles = self.registry.get_all_styles();
        let scripts = self.registry.get_all_scripts();

        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        if !styles.is_empty() {
            html.push_str(&format!("<style>\n{styles}\n</style>\n"));
        }
        html.push_str("</head>\n<body>\n");
        html.push_str(&body);
        html.push('\n');
        if !scripts.is_empty() {
            html.push_str(&format!("<script>\n{scripts}\n</script>\n"));
        }
        html.push_str("</body>\n</html>\n");
        Ok(html)
    }

    // ========================================================================
    // Schema
    // ========================================================================

    /// 문서 전체 JSON Schema
    pub fn generate_schema(&self, result: &ParseResult) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &result.fields {
            let mut schema = self
                .registry
                .generate_field_schema(field)
                .unwrap_or_else(|| json!({ "type": "string" }));
            if let Some(object) = schema.as_object_mut() {
                object
                    .entry("title")
                    .or_insert_with(|| json!(field.label));
            }
            properties.insert(field.name.clone(), schema);
            if field.required {
                required.push(json!(field.name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    // ========================================================================
    // Validate
    // ========================================================================

    /// 필드 값 검증
    ///
    /// 타입 validator 규칙 뒤에 `field-validate` Hook이 반환한 규칙(단일 객체 또는 배열)을 덧붙입니다.
    pub async fn validate_field(&self, field: &Field, value: &Value) -> Result<Vec<FieldRule>> {
        let mut rules = self.registry.validate_field(field, value);

        let mut ctx = HookContext::new().with_field(field.clone());
        let extra = self
            .hooks
            .execute(&HookPoint::FieldValidate, &mut ctx, &[value.clone()])
            .await?;

        for item in extra {
            let items = match item {
                Value::Array(items) => items,
                other => vec![other],
            };
            for item in items {
                match serde_json::from_value::<FieldRule>(item) {
                    Ok(rule) => rules.push(rule),
                    Err(e) => debug!(field = %field.name, error = %e, "Ignoring malformed rule"),
                }
            }
        }
        Ok(rules)
    }
}

/// 마지막 문자열 결과
fn last_string(results: &[Value]) -> Option<String> {
    results
        .iter()
        .rev()
        .find_map(|v| v.as_str().map(str::to_string))
}

/// generator가 없는 타입의 기본 출력
fn fallback_html(field: &Field, ctx: &HookContext) -> String {
    let input = Attrs::new()
        .attr("type", "text")
        .attr("id", &field.name)
        .attr("name", &field.name)
        .attr("data-type", &field.field_type)
        .flag("required", field.required)
        .form(ctx)
        .build();
    markup::wrap(field, &format!("{}<input{}>", markup::label(field), input))
}
