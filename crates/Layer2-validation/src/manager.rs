//! Validation Manager - 규칙 구성, 파이프라인 실행, 캐시, 서버 검증

use crate::checks::{char_len, compile_pattern, is_valid_email, is_valid_tel, is_valid_url, parse_date};
use crate::pipeline::{
    CrossFieldRule, RuleOutcome, SyncRuleFn, ValidationPipeline, ValidationRule,
};
use crate::server::{ServerDispatcher, ServerValidator};
use crate::types::{
    codes, FieldContext, FieldType, ServerValidation, ValidationError, ValidationResult,
};
use formdown_core::field::{display_value, is_empty_value, value_as_f64};
use formdown_core::{FormData, ValidationPlugin};
use formdown_foundation::{Error, Result, ValidationConfig};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 검증 매니저
///
/// 캐시와 디바운스 타이머는 인스턴스 소유입니다. drop 시 `dispose()`가 호출됩니다.
pub struct ValidationManager {
    config: ValidationConfig,
    custom_validators: RwLock<HashMap<String, Arc<SyncRuleFn>>>,
    cache: Mutex<HashMap<String, ValidationResult>>,
    server: Arc<ServerDispatcher>,
}

impl ValidationManager {
    pub fn new() -> Self {
        Self::with_config(ValidationConfig::default())
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        let server = ServerDispatcher::new(
            Duration::from_millis(config.debounce_ms),
            Duration::from_millis(config.server_timeout_ms),
        );
        Self {
            config,
            custom_validators: RwLock::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            server: Arc::new(server),
        }
    }

    /// 서버 검증 전송 계층 지정
    pub fn with_server_validator(mut self, validator: Arc<dyn ServerValidator>) -> Self {
        // 생성 직후에는 다른 참조가 없음
        if let Some(server) = Arc::get_mut(&mut self.server) {
            server.set_validator(validator);
        }
        self
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    // ========================================================================
    // 커스텀 검증기
    // ========================================================================

    /// 커스텀 검증기 등록 (같은 이름이면 덮어씀)
    pub fn register_custom_validator<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value, &FormData) -> Result<RuleOutcome> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .custom_validators
            .write()
            .insert(name.clone(), Arc::new(validator))
            .is_some()
        {
            debug!(validator = %name, "Replaced custom validator");
        }
    }

    pub fn has_custom_validator(&self, name: &str) -> bool {
        self.custom_validators.read().contains_key(name)
    }

    /// 플러그인이 기여한 검증기 가져오기
    pub fn register_plugin_validators(&self, validators: impl IntoIterator<Item = ValidationPlugin>) {
        let mut count = 0usize;
        for plugin in validators {
            let name = plugin.name.clone();
            self.register_custom_validator(name, move |value, form_data| {
                Ok(match plugin.validate(value, form_data)? {
                    None => RuleOutcome::Pass,
                    Some(message) => RuleOutcome::Fail(message),
                })
            });
            count += 1;
        }
        info!(count, "Imported plugin validators");
    }

    // ========================================================================
    // 파이프라인
    // ========================================================================

    /// fail-fast / skip_on_error 파이프라인 생성
    pub fn create_validation_pipeline(&self, rules: Vec<ValidationRule>) -> ValidationPipeline {
        ValidationPipeline::new(rules)
    }

    /// 파이프라인 실행 (규칙 에러는 `validation_error`로 변환)
    pub async fn execute_validation_pipeline(
        &self,
        pipeline: &ValidationPipeline,
        field: &str,
        value: &Value,
        form_data: &FormData,
    ) -> ValidationResult {
        pipeline.execute(field, value, form_data).await
    }

    /// 필드 선언에서 규칙 목록 구성
    ///
    /// 순서: required, 타입 규칙, pattern, length, 커스텀 검증기, 서버 검증
    pub fn build_validation_rules(&self, ctx: &FieldContext) -> Vec<ValidationRule> {
        let mut rules = Vec::new();
        let constraints = &ctx.constraints;

        if constraints.required {
            rules.push(required_rule(ctx));
        }
        if let Some(rule) = type_rule(ctx) {
            rules.push(rule);
        }
        if let Some(pattern) = &constraints.pattern {
            rules.push(pattern_rule(ctx, pattern.clone()));
        }
        if constraints.min_length.is_some() || constraints.max_length.is_some() {
            rules.push(length_rule(ctx));
        }
        if let Some(name) = &constraints.custom_validator {
            match self.custom_validators.read().get(name) {
                Some(validator) => {
                    let validator = Arc::clone(validator);
                    rules.push(ValidationRule::new(codes::CUSTOM, move |value, form_data| {
                        if is_empty_value(value) {
                            return Ok(RuleOutcome::Pass);
                        }
                        validator(value, form_data)
                    }));
                }
                None => warn!(field = %ctx.field_name, validator = %name, "Unknown custom validator"),
            }
        }
        if let Some(server) = &constraints.server_validation {
            rules.push(self.server_rule(ctx, server.clone()));
        }

        rules
    }

    fn server_rule(&self, ctx: &FieldContext, config: ServerValidation) -> ValidationRule {
        let dispatcher = Arc::clone(&self.server);
        let field = ctx.field_name.clone();
        ValidationRule::new_async("server", move |value, form_data| {
            let dispatcher = Arc::clone(&dispatcher);
            let field = field.clone();
            let config = config.clone();
            async move {
                if is_empty_value(&value) {
                    return Ok(RuleOutcome::Pass);
                }
                let result = dispatcher.dispatch(&field, value, form_data, &config).await?;
                Ok(RuleOutcome::Result(result))
            }
            .boxed()
        })
    }

    // ========================================================================
    // 검증
    // ========================================================================

    /// 필드 검증 (캐시 사용, fail-fast)
    pub async fn validate_async(
        &self,
        ctx: &FieldContext,
        value: &Value,
        form_data: &FormData,
    ) -> ValidationResult {
        let key = cache_key(&ctx.field_name, value);
        if self.config.enable_cache {
            if let Some(hit) = self.cache.lock().get(&key) {
                debug!(field = %ctx.field_name, "Validation cache hit");
                return hit.clone();
            }
        }

        let pipeline = self.create_validation_pipeline(self.build_validation_rules(ctx));
        let result = self
            .execute_validation_pipeline(&pipeline, &ctx.field_name, value, form_data)
            .await;

        if result.superseded {
            debug!(field = %ctx.field_name, "Superseded result not cached");
        } else if self.config.enable_cache {
            self.cache.lock().insert(key, result.clone());
        }
        result
    }

    /// 서버 검증 직접 호출 (디바운스 적용)
    ///
    /// 같은 필드의 새 호출에 밀려나면 `Error::Cancelled`를 반환합니다.
    pub async fn validate_on_server(
        &self,
        field: &str,
        value: &Value,
        form_data: &FormData,
        config: &ServerValidation,
    ) -> Result<ValidationResult> {
        self.server
            .dispatch(field, value.clone(), form_data.clone(), config)
            .await
    }

    /// 교차 필드 검증
    pub fn validate_cross_fields(&self, form_data: &FormData, rules: &[CrossFieldRule]) -> ValidationResult {
        let mut result = ValidationResult::valid();

        for rule in rules {
            let primary = rule.primary_field();
            match (rule.validator)(form_data) {
                Ok(RuleOutcome::Pass) => {}
                Ok(RuleOutcome::Fail(message)) => {
                    result.merge(
                        ValidationResult::failure(ValidationError::new(
                            primary,
                            codes::CROSS_FIELD,
                            message,
                        )),
                        primary,
                    );
                }
                Ok(RuleOutcome::Result(own)) => result.merge(own, primary),
                Err(e) => {
                    warn!(rule = %rule.name, error = %e, "Cross-field rule failed");
                    result.merge(
                        ValidationResult::failure(ValidationError::new(
                            primary,
                            codes::VALIDATION_ERROR,
                            format!("Validation rule '{}' failed: {}", rule.name, e),
                        )),
                        primary,
                    );
                }
            }
        }

        result
    }

    // ========================================================================
    // 캐시 / 정리
    // ========================================================================

    /// 캐시 비우기 (필드 지정 시 해당 필드만)
    pub fn clear_cache(&self, field: Option<&str>) {
        let mut cache = self.cache.lock();
        match field {
            Some(name) => {
                let prefix = format!("{name}:");
                cache.retain(|key, _| !key.starts_with(&prefix));
            }
            None => cache.clear(),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// 대기 중인 서버 검증 수
    pub fn pending_server_validations(&self) -> usize {
        self.server.pending_count()
    }

    /// 모든 디바운스 타이머 취소 및 캐시 제거
    pub fn dispose(&self) {
        self.server.cancel_all();
        self.cache.lock().clear();
    }
}

impl Default for ValidationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ValidationManager {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn cache_key(field: &str, value: &Value) -> String {
    format!("{field}:{value}")
}

// ============================================================================
// 내장 규칙
// ============================================================================

fn required_rule(ctx: &FieldContext) -> ValidationRule {
    let message = format!("{} is required", ctx.display_name());
    let checkbox = ctx.field_type == FieldType::Checkbox;
    ValidationRule::new(codes::REQUIRED, move |value, _| {
        let missing = is_empty_value(value) || (checkbox && *value == Value::Bool(false));
        Ok(if missing {
            RuleOutcome::Fail(message.clone())
        } else {
            RuleOutcome::Pass
        })
    })
}

/// 타입별 규칙 (빈 값은 통과)
fn type_rule(ctx: &FieldContext) -> Option<ValidationRule> {
    let field = ctx.field_name.clone();
    let constraints = ctx.constraints.clone();

    let rule = match ctx.field_type {
        FieldType::Email => string_rule(codes::EMAIL, |s| {
            (!is_valid_email(s)).then(|| "Please enter a valid email address".to_string())
        }),
        FieldType::Url => string_rule(codes::URL, |s| {
            (!is_valid_url(s)).then(|| "Please enter a valid URL".to_string())
        }),
        FieldType::Tel => string_rule(codes::TEL, |s| {
            (!is_valid_tel(s)).then(|| "Please enter a valid phone number".to_string())
        }),
        FieldType::Number | FieldType::Range => {
            let min = constraints.min.as_ref().and_then(value_as_f64);
            let max = constraints.max.as_ref().and_then(value_as_f64);
            ValidationRule::new(codes::NUMBER, move |value, _| {
                if is_empty_value(value) {
                    return Ok(RuleOutcome::Pass);
                }
                let Some(n) = value_as_f64(value) else {
                    return Ok(RuleOutcome::Fail("Please enter a valid number".to_string()));
                };
                Ok(bounds(&field, n < min.unwrap_or(f64::NEG_INFINITY), n > max.unwrap_or(f64::INFINITY), &constraints))
            })
        }
        FieldType::Date => {
            let min = constraints.min.as_ref().and_then(|v| parse_date(&display_value(v)));
            let max = constraints.max.as_ref().and_then(|v| parse_date(&display_value(v)));
            ValidationRule::new(codes::DATE, move |value, _| {
                if is_empty_value(value) {
                    return Ok(RuleOutcome::Pass);
                }
                let Some(date) = parse_date(&display_value(value)) else {
                    return Ok(RuleOutcome::Fail("Please enter a valid date".to_string()));
                };
                Ok(bounds(
                    &field,
                    min.is_some_and(|m| date < m),
                    max.is_some_and(|m| date > m),
                    &constraints,
                ))
            })
        }
        _ => return None,
    };
    Some(rule)
}

fn string_rule<F>(code: &'static str, check: F) -> ValidationRule
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    ValidationRule::new(code, move |value, _| {
        if is_empty_value(value) {
            return Ok(RuleOutcome::Pass);
        }
        Ok(match check(&display_value(value)) {
            Some(message) => RuleOutcome::Fail(message),
            None => RuleOutcome::Pass,
        })
    })
}

/// min/max 위반 결과 (코드는 `min` / `max`)
fn bounds(field: &str, below: bool, above: bool, constraints: &crate::types::FieldConstraints) -> RuleOutcome {
    let shown = |v: &Option<Value>| v.as_ref().map(display_value).unwrap_or_default();
    if below {
        RuleOutcome::Result(ValidationResult::failure(ValidationError::new(
            field,
            codes::MIN,
            format!("Value must be at least {}", shown(&constraints.min)),
        )))
    } else if above {
        RuleOutcome::Result(ValidationResult::failure(ValidationError::new(
            field,
            codes::MAX,
            format!("Value must be at most {}", shown(&constraints.max)),
        )))
    } else {
        RuleOutcome::Pass
    }
}

fn pattern_rule(ctx: &FieldContext, pattern: String) -> ValidationRule {
    let compiled = compile_pattern(&pattern);
    let field = ctx.field_name.clone();
    ValidationRule::new(codes::PATTERN, move |value, _| {
        if is_empty_value(value) {
            return Ok(RuleOutcome::Pass);
        }
        let re = compiled.as_ref().map_err(|e| {
            Error::InvalidInput(format!("Invalid pattern '{pattern}' for '{field}': {e}"))
        })?;
        Ok(if re.is_match(&display_value(value)) {
            RuleOutcome::Pass
        } else {
            RuleOutcome::Fail("Please match the requested format".to_string())
        })
    })
}

fn length_rule(ctx: &FieldContext) -> ValidationRule {
    let field = ctx.field_name.clone();
    let min = ctx.constraints.min_length;
    let max = ctx.constraints.max_length;
    ValidationRule::new("length", move |value, _| {
        if is_empty_value(value) {
            return Ok(RuleOutcome::Pass);
        }
        let len = char_len(&display_value(value));
        let error = match (min, max) {
            (Some(min), _) if len < min => Some(ValidationError::new(
                &field,
                codes::MIN_LENGTH,
                format!("Must be at least {min} characters"),
            )),
            (_, Some(max)) if len > max => Some(ValidationError::new(
                &field,
                codes::MAX_LENGTH,
                format!("Must be at most {max} characters"),
            )),
            _ => None,
        };
        Ok(error
            .map(|e| RuleOutcome::Result(ValidationResult::failure(e)))
            .unwrap_or(RuleOutcome::Pass))
    })
}
