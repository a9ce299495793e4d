//! formdown-validation: 검증 파이프라인과 필드 값 처리
//!
//! Layer2 - formdown-core 위의 검증 레이어
//!
//! # 주요 모듈
//!
//! - `types`: FieldContext, FieldConstraints, ValidationResult
//! - `pipeline`: 규칙 + 실행 전략 (fail-fast / sequential / parallel)
//! - `manager`: ValidationManager (규칙 구성, 캐시, 서버 검증 디바운스)
//! - `processor`: 추상 요소에서 값 추출 (checkbox / radio 그룹, 기타 입력)
//!
//! # 사용 예시
//!
//! ```ignore
//! use formdown_validation::{FieldContext, FieldType, FieldConstraints, ValidationManager};
//!
//! let manager = ValidationManager::new();
//! let ctx = FieldContext::new("email", FieldType::Email)
//!     .with_constraints(FieldConstraints::new().required(true));
//!
//! let result = manager.validate_async(&ctx, &json!("user@example.com"), &FormData::new()).await;
//! assert!(result.is_valid);
//! ```

mod checks;
pub mod manager;
pub mod pipeline;
pub mod processor;
mod server;
pub mod types;

// Re-exports: Types
pub use types::{
    codes, FieldConstraints, FieldContext, FieldType, ServerValidation, Severity,
    ValidationError, ValidationResult,
};

// Re-exports: Pipeline
pub use pipeline::{
    AsyncRuleFn, CrossFieldFn, CrossFieldRule, ExecuteOrder, RuleOutcome, RuleValidator,
    SyncRuleFn, ValidationPipeline, ValidationRule,
};

// Re-exports: Manager
pub use manager::ValidationManager;
pub use server::{ServerRequest, ServerValidator};

// Re-exports: Processor
pub use processor::{
    extract_field_value, get_field_type, process_checkbox_group, process_radio_group,
    validate_field_value, ElementContainer, ElementSnapshot, FieldElement, ProcessResult,
    Selector, SnapshotContainer,
};
