//! Validation Pipeline - 규칙 목록 + 실행 전략
//!
//! ```text
//! fail-fast   : 순차 실행, 첫 실패에서 중단 (skip_on_error)
//! sequential  : 순차 실행, 모든 오류 수집
//! parallel    : 동시 실행, 결과는 규칙 선언 순서로 재조립
//! ```

use crate::types::{codes, Severity, ValidationError, ValidationResult};
use formdown_core::FormData;
use formdown_foundation::{Error, Result};
use futures::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// RuleOutcome
// ============================================================================

/// 규칙 검증 결과
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// 통과
    Pass,
    /// 실패 메시지 (코드는 규칙 이름)
    Fail(String),
    /// 완전한 결과 (필드/코드를 직접 지정)
    Result(ValidationResult),
}

impl RuleOutcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// 통과 여부
    pub fn passed(&self) -> bool {
        match self {
            Self::Pass => true,
            Self::Fail(_) => false,
            Self::Result(result) => result.is_valid,
        }
    }
}

impl From<bool> for RuleOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail("Validation failed".to_string())
        }
    }
}

impl From<ValidationResult> for RuleOutcome {
    fn from(result: ValidationResult) -> Self {
        Self::Result(result)
    }
}

// ============================================================================
// RuleValidator
// ============================================================================

/// 동기 검증 함수
pub type SyncRuleFn = dyn Fn(&Value, &FormData) -> Result<RuleOutcome> + Send + Sync;

/// 비동기 검증 함수 (소유권을 넘겨받아 `'static` future 반환)
pub type AsyncRuleFn =
    dyn Fn(Value, FormData) -> BoxFuture<'static, Result<RuleOutcome>> + Send + Sync;

/// 규칙 검증기
#[derive(Clone)]
pub enum RuleValidator {
    Sync(Arc<SyncRuleFn>),
    Async(Arc<AsyncRuleFn>),
}

impl RuleValidator {
    async fn run(&self, value: &Value, form_data: &FormData) -> Result<RuleOutcome> {
        match self {
            Self::Sync(f) => f(value, form_data),
            Self::Async(f) => f(value.clone(), form_data.clone()).await,
        }
    }
}

impl std::fmt::Debug for RuleValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("RuleValidator::Sync"),
            Self::Async(_) => f.write_str("RuleValidator::Async"),
        }
    }
}

// ============================================================================
// ValidationRule
// ============================================================================

/// 검증 규칙
#[derive(Debug, Clone)]
pub struct ValidationRule {
    /// 규칙 이름 (`Fail` 결과의 에러 코드)
    pub name: String,

    /// 실패 시 심각도 (`Warning`이면 결과를 무효화하지 않음)
    pub severity: Severity,

    pub validator: RuleValidator,
}

impl ValidationRule {
    /// 동기 규칙
    pub fn new<F>(name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Result<RuleOutcome> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            severity: Severity::Error,
            validator: RuleValidator::Sync(Arc::new(validator)),
        }
    }

    /// 비동기 규칙
    pub fn new_async<F>(name: impl Into<String>, validator: F) -> Self
    where
        F: Fn(Value, FormData) -> BoxFuture<'static, Result<RuleOutcome>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            severity: Severity::Error,
            validator: RuleValidator::Async(Arc::new(validator)),
        }
    }

    /// 경고 규칙으로 전환
    pub fn as_warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    /// 규칙 하나 실행 (에러는 `validation_error`로 변환)
    pub(crate) async fn evaluate(&self, field: &str, value: &Value, form_data: &FormData) -> ValidationResult {
        match self.validator.run(value, form_data).await {
            Ok(RuleOutcome::Pass) => ValidationResult::valid(),
            Ok(RuleOutcome::Fail(message)) => {
                let error = ValidationError::new(field, self.name.as_str(), message);
                self.report(error)
            }
            Ok(RuleOutcome::Result(result)) => {
                let mut merged = ValidationResult::valid();
                merged.merge(result, field);
                if self.severity == Severity::Warning {
                    let demoted = std::mem::take(&mut merged.errors);
                    merged.warnings.extend(demoted.into_iter().map(|mut e| {
                        e.severity = Severity::Warning;
                        e
                    }));
                    merged.is_valid = true;
                }
                merged
            }
            Err(Error::Cancelled) => {
                debug!(field, rule = %self.name, "Rule superseded, treating as pass");
                ValidationResult::superseded()
            }
            Err(e) => {
                warn!(field, rule = %self.name, error = %e, "Validation rule failed");
                self.report(ValidationError::new(
                    field,
                    codes::VALIDATION_ERROR,
                    format!("Validation rule '{}' failed: {}", self.name, e),
                ))
            }
        }
    }

    fn report(&self, mut error: ValidationError) -> ValidationResult {
        match self.severity {
            Severity::Error => ValidationResult::failure(error),
            Severity::Warning => {
                error.severity = Severity::Warning;
                ValidationResult::valid().with_warning(error)
            }
        }
    }
}

// ============================================================================
// ValidationPipeline
// ============================================================================

/// 실행 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecuteOrder {
    #[default]
    FailFast,
    Sequential,
    Parallel,
}

/// 검증 파이프라인
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    pub rules: Vec<ValidationRule>,
    pub execute_order: ExecuteOrder,
    pub skip_on_error: bool,
}

impl ValidationPipeline {
    /// fail-fast + skip_on_error 기본값
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self {
            rules,
            execute_order: ExecuteOrder::FailFast,
            skip_on_error: true,
        }
    }

    pub fn with_order(mut self, order: ExecuteOrder) -> Self {
        self.execute_order = order;
        self
    }

    pub fn skip_on_error(mut self, skip: bool) -> Self {
        self.skip_on_error = skip;
        self
    }

    /// 파이프라인 실행
    pub async fn execute(&self, field: &str, value: &Value, form_data: &FormData) -> ValidationResult {
        let mut result = ValidationResult::valid();

        match self.execute_order {
            ExecuteOrder::FailFast | ExecuteOrder::Sequential => {
                let stop_early = self.execute_order == ExecuteOrder::FailFast && self.skip_on_error;
                for rule in &self.rules {
                    let outcome = rule.evaluate(field, value, form_data).await;
                    let failed = !outcome.is_valid;
                    result.merge(outcome, field);
                    if failed && stop_early {
                        debug!(field, rule = %rule.name, "Fail-fast stop");
                        break;
                    }
                }
            }
            ExecuteOrder::Parallel => {
                let outcomes = join_all(
                    self.rules
                        .iter()
                        .map(|rule| rule.evaluate(field, value, form_data)),
                )
                .await;
                for outcome in outcomes {
                    result.merge(outcome, field);
                }
            }
        }

        result
    }
}

// ============================================================================
// CrossFieldRule
// ============================================================================

/// 교차 필드 검증 함수
pub type CrossFieldFn = dyn Fn(&FormData) -> Result<RuleOutcome> + Send + Sync;

/// 여러 필드에 걸친 규칙 (실패는 `fields[0]`에 귀속)
#[derive(Clone)]
pub struct CrossFieldRule {
    pub name: String,
    pub fields: Vec<String>,
    pub validator: Arc<CrossFieldFn>,
}

impl CrossFieldRule {
    pub fn new<F>(name: impl Into<String>, fields: &[&str], validator: F) -> Self
    where
        F: Fn(&FormData) -> Result<RuleOutcome> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            validator: Arc::new(validator),
        }
    }

    /// 귀속 대상 필드
    pub fn primary_field(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }
}

impl std::fmt::Debug for CrossFieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossFieldRule")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn spy(name: &str, calls: &Arc<AtomicUsize>, outcome: RuleOutcome) -> ValidationRule {
        let calls = Arc::clone(calls);
        ValidationRule::new(name, move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(outcome.clone())
        })
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_failure() {
        let fail_calls = Arc::new(AtomicUsize::new(0));
        let never_calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ValidationPipeline::new(vec![
            spy("always_fail", &fail_calls, RuleOutcome::fail("nope")),
            spy("never_run", &never_calls, RuleOutcome::Pass),
        ]);

        let result = pipeline.execute("name", &json!("x"), &FormData::new()).await;

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, "always_fail");
        assert_eq!(fail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(never_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_sequential_collects_everything() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ValidationPipeline::new(vec![
            spy("a", &calls, RuleOutcome::fail("first")),
            spy("b", &calls, RuleOutcome::Pass),
            spy("c", &calls, RuleOutcome::fail("third")),
        ])
        .with_order(ExecuteOrder::Sequential);

        let result = pipeline.execute("f", &json!(1), &FormData::new()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.messages(), vec!["first", "third"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_keeps_declaration_order() {
        let slow = ValidationRule::new_async("slow", |_, _| {
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(RuleOutcome::fail("slow failed"))
            }
            .boxed()
        });
        let fast = ValidationRule::new("fast", |_, _| Ok(RuleOutcome::fail("fast failed")));

        let pipeline =
            ValidationPipeline::new(vec![slow, fast]).with_order(ExecuteOrder::Parallel);
        let result = pipeline.execute("f", &json!(1), &FormData::new()).await;

        assert_eq!(result.messages(), vec!["slow failed", "fast failed"]);
    }

    #[tokio::test]
    async fn test_rule_errors_become_validation_errors() {
        let pipeline = ValidationPipeline::new(vec![
            ValidationRule::new("broken", |_, _| Err(Error::Internal("boom".into()))),
            ValidationRule::new("cancelled", |_, _| Err(Error::Cancelled)),
        ])
        .with_order(ExecuteOrder::Sequential);

        let result = pipeline.execute("f", &Value::Null, &FormData::new()).await;
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, codes::VALIDATION_ERROR);
        assert!(result.errors[0].message.contains("boom"));
    }

    #[tokio::test]
    async fn test_warnings_accumulate_without_failing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = ValidationPipeline::new(vec![
            spy("weak", &calls, RuleOutcome::fail("consider a longer value")).as_warning(),
            spy("strict", &calls, RuleOutcome::fail("invalid")),
            spy("after", &calls, RuleOutcome::Pass),
        ]);

        let result = pipeline.execute("pw", &json!("abc"), &FormData::new()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, Severity::Warning);
        assert_eq!(result.errors.len(), 1);
    }
}
