//! Hook 타입 정의
//!
//! 확장 지점([`HookPoint`]), 핸들러([`HookHandler`]), 등록 단위([`Hook`])

use crate::field::HookContext;
use async_trait::async_trait;
use formdown_foundation::Result;
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// HookPoint - 확장 지점
// ============================================================================

/// Hook 확장 지점
///
/// 관례적으로 고정된 집합이지만 플러그인이 임의 이름을 정의할 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    /// 파싱 전 (입력 텍스트 변환)
    PreParse,
    /// 파싱 후 (전체 결과 수정)
    PostParse,
    /// 필드 하나가 파싱된 직후
    FieldParse,
    /// 필드 검증 시 (추가 규칙 반환)
    FieldValidate,
    /// 필드 HTML 렌더링 시 (HTML 대체)
    FieldRender,
    /// 문서 생성 전
    PreGenerate,
    /// 문서 생성 후 (출력 변환)
    PostGenerate,
    /// 플러그인 정의 지점
    Custom(String),
}

impl HookPoint {
    /// 지점 이름
    pub fn as_str(&self) -> &str {
        match self {
            Self::PreParse => "pre-parse",
            Self::PostParse => "post-parse",
            Self::FieldParse => "field-parse",
            Self::FieldValidate => "field-validate",
            Self::FieldRender => "field-render",
            Self::PreGenerate => "pre-generate",
            Self::PostGenerate => "post-generate",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HookPoint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "pre-parse" => Self::PreParse,
            "post-parse" => Self::PostParse,
            "field-parse" => Self::FieldParse,
            "field-validate" => Self::FieldValidate,
            "field-render" => Self::FieldRender,
            "pre-generate" => Self::PreGenerate,
            "post-generate" => Self::PostGenerate,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl From<&str> for HookPoint {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(point) => point,
            Err(never) => match never {},
        }
    }
}

// ============================================================================
// HookHandler - 핸들러
// ============================================================================

/// 동기 핸들러 시그니처
///
/// `Ok(None)`은 결과 배열에 아무것도 추가하지 않습니다.
pub type SyncHookFn =
    dyn Fn(&mut HookContext, &[Value]) -> Result<Option<Value>> + Send + Sync;

/// 비동기 핸들러 trait
#[async_trait]
pub trait AsyncHookFn: Send + Sync {
    /// Hook 실행
    async fn call(&self, ctx: &mut HookContext, args: &[Value]) -> Result<Option<Value>>;
}

/// Hook 핸들러 (동기 클로저 또는 비동기 trait 객체)
///
/// 해제는 핸들러 참조(포인터) 동일성으로 판단합니다.
#[derive(Clone)]
pub enum HookHandler {
    Sync(Arc<SyncHookFn>),
    Async(Arc<dyn AsyncHookFn>),
}

impl HookHandler {
    /// 동기 클로저 핸들러
    pub fn sync<F>(handler: F) -> Self
    where
        F: Fn(&mut HookContext, &[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(handler))
    }

    /// 비동기 핸들러
    pub fn from_async(handler: impl AsyncHookFn + 'static) -> Self {
        Self::Async(Arc::new(handler))
    }

    /// 비동기 핸들러인지
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// 같은 핸들러 참조인지 확인
    pub fn ptr_eq(&self, other: &HookHandler) -> bool {
        match (self, other) {
            (Self::Sync(a), Self::Sync(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            (Self::Async(a), Self::Async(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for HookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(h) => write!(f, "HookHandler::Sync({:p})", Arc::as_ptr(h)),
            Self::Async(h) => write!(f, "HookHandler::Async({:p})", Arc::as_ptr(h)),
        }
    }
}

// ============================================================================
// Hook - 등록 단위
// ============================================================================

/// 등록된 Hook
#[derive(Debug, Clone)]
pub struct Hook {
    /// 확장 지점
    pub name: HookPoint,

    /// 우선순위 (높을수록 먼저 실행)
    pub priority: i32,

    /// 핸들러
    pub handler: HookHandler,
}

impl Hook {
    /// 새 Hook 생성 (우선순위 0)
    pub fn new(name: impl Into<HookPoint>, handler: HookHandler) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            handler,
        }
    }

    /// 동기 클로저로 생성
    pub fn sync<F>(name: impl Into<HookPoint>, handler: F) -> Self
    where
        F: Fn(&mut HookContext, &[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        Self::new(name, HookHandler::sync(handler))
    }

    /// 우선순위 지정
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl From<String> for HookPoint {
    fn from(s: String) -> Self {
        HookPoint::from(s.as_str())
    }
}
