//! 서브커맨드 구현

use anyhow::{bail, Context, Result};
use formdown_core::{ExtensionManager, HookContext, ParseResult};
use formdown_foundation::FormdownConfig;
use formdown_validation::{FieldContext, ValidationError, ValidationManager, ValidationResult};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

/// 설정된 ExtensionManager 생성 및 초기화
pub async fn extensions(config: &FormdownConfig) -> Result<ExtensionManager> {
    let manager = ExtensionManager::with_config(config.extensions.clone());
    manager
        .initialize()
        .await
        .context("Failed to initialize extension system")?;
    Ok(manager)
}

async fn parse_file(manager: &ExtensionManager, path: &Path) -> Result<ParseResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let result = manager
        .parse(&source)
        .await
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), fields = result.fields.len(), "Parsed document");
    Ok(result)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `formdown parse`
pub async fn parse(config: &FormdownConfig, path: &Path) -> Result<()> {
    let manager = extensions(config).await?;
    let result = parse_file(&manager, path).await?;
    print_json(&result)
}

/// `formdown html`
pub async fn html(
    config: &FormdownConfig,
    path: &Path,
    form_id: Option<String>,
    standalone: bool,
) -> Result<()> {
    let manager = extensions(config).await?;
    let result = parse_file(&manager, path).await?;

    let mut ctx = HookContext::new();
    if let Some(id) = form_id {
        ctx = ctx.with_metadata("formId", json!(id));
    }

    let html = if standalone {
        manager.generate_document(&result, ctx).await?
    } else {
        manager.generate(&result, ctx).await?
    };
    println!("{html}");
    Ok(())
}

/// `formdown schema`
pub async fn schema(config: &FormdownConfig, path: &Path) -> Result<()> {
    let manager = extensions(config).await?;
    let result = parse_file(&manager, path).await?;
    print_json(&manager.generate_schema(&result))
}

/// `formdown validate` - 데이터 파일(JSON 객체)을 문서 필드로 검증
///
/// 하나라도 실패하면 오류로 종료합니다.
pub async fn validate(config: &FormdownConfig, path: &Path, data: &Path) -> Result<()> {
    let manager = extensions(config).await?;
    let result = parse_file(&manager, path).await?;

    let raw = std::fs::read_to_string(data)
        .with_context(|| format!("Failed to read {}", data.display()))?;
    let form_data = match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => map,
        _ => bail!("{} must contain a JSON object", data.display()),
    };

    let validation = ValidationManager::with_config(config.validation.clone());
    validation.register_plugin_validators(manager.plugins().get_validators().into_values());

    let mut report = ValidationResult::valid();
    for field in &result.fields {
        let value = form_data.get(&field.name).cloned().unwrap_or(Value::Null);

        let ctx = FieldContext::from(field);
        let outcome = validation.validate_async(&ctx, &value, &form_data).await;

        // 공통 규칙을 통과한 경우에만 필드 타입 고유 규칙(step 등)을 추가
        if outcome.is_valid {
            for rule in manager.validate_field(field, &value).await? {
                report.merge(
                    ValidationResult::failure(ValidationError::new(
                        &field.name,
                        rule.rule_type,
                        rule.message,
                    )),
                    &field.name,
                );
            }
        }
        report.merge(outcome, &field.name);
    }

    print_json(&report)?;
    if !report.is_valid {
        bail!("{} validation error(s)", report.errors.len());
    }
    info!(fields = result.fields.len(), "Form data is valid");
    Ok(())
}

/// `formdown stats`
pub async fn stats(config: &FormdownConfig) -> Result<()> {
    let manager = extensions(config).await?;
    print_json(&manager.get_stats())
}
