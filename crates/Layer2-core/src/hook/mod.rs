//! # Hook System
//!
//! 이름 붙은 확장 지점에 우선순위 기반 핸들러를 등록/실행합니다.
//!
//! ## 확장 지점
//!
//! - `pre-parse`: 파싱 전 입력 텍스트 변환
//! - `field-parse`: 필드 하나가 파싱된 직후
//! - `post-parse`: 전체 파싱 결과 수정
//! - `field-validate`: 추가 검증 규칙 반환
//! - `field-render`: 필드 HTML 대체
//! - `pre-generate` / `post-generate`: 문서 생성 전후
//! - 그 외 이름은 플러그인 정의 지점 (`HookPoint::Custom`)
//!
//! ## 예시
//!
//! ```ignore
//! let hooks = HookManager::new();
//! hooks.register(
//!     Hook::sync("post-parse", |ctx, _| {
//!         if let Some(result) = ctx.parse_result.as_mut() {
//!             for field in &mut result.fields {
//!                 field.attributes.insert("class".into(), json!("fd-field"));
//!             }
//!         }
//!         Ok(None)
//!     })
//!     .with_priority(10),
//! );
//!
//! let results = hooks.execute(&HookPoint::PostParse, &mut ctx, &[]).await?;
//! ```

mod manager;
mod types;

pub use manager::{HookManager, HookManagerConfig};
pub use types::{AsyncHookFn, Hook, HookHandler, HookPoint, SyncHookFn};
