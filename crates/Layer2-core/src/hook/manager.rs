//! Hook Manager - 우선순위 기반 Hook 등록/실행
//!
//! - 같은 이름의 Hook은 우선순위 내림차순, 동순위는 등록 순서로 실행
//! - 실패한 Hook 하나가 체인 전체를 중단시키지 않음 (`throw` 전략 제외)
//! - 비동기 Hook은 매니저 단위 타임아웃과 경쟁

use super::types::{Hook, HookHandler, HookPoint};
use crate::field::HookContext;
use formdown_foundation::{Error, ErrorStrategy, EventEmitter, ExtensionConfig, Result};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

// ============================================================================
// HookManagerConfig
// ============================================================================

/// Hook 매니저 설정
#[derive(Debug, Clone)]
pub struct HookManagerConfig {
    /// 비동기 Hook 타임아웃 (None이면 무제한)
    pub timeout: Option<Duration>,

    /// 에러 처리 전략
    pub error_strategy: ErrorStrategy,
}

impl Default for HookManagerConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_millis(
                formdown_foundation::DEFAULT_HOOK_TIMEOUT_MS,
            )),
            error_strategy: ErrorStrategy::default(),
        }
    }
}

impl From<&ExtensionConfig> for HookManagerConfig {
    fn from(config: &ExtensionConfig) -> Self {
        Self {
            timeout: config.hook_timeout_ms.map(Duration::from_millis),
            error_strategy: config.hook_error_strategy,
        }
    }
}

// ============================================================================
// HookManager
// ============================================================================

/// 훅 매니저
pub struct HookManager {
    /// 지점별 Hook 목록 (항상 우선순위 내림차순 정렬 상태)
    hooks: RwLock<HashMap<HookPoint, Vec<Hook>>>,

    /// 설정
    config: HookManagerConfig,

    /// 이벤트 이미터
    events: Arc<EventEmitter>,
}

impl HookManager {
    pub fn new() -> Self {
        Self::with_config(HookManagerConfig::default(), Arc::new(EventEmitter::new()))
    }

    pub fn with_config(config: HookManagerConfig, events: Arc<EventEmitter>) -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            config,
            events,
        }
    }

    /// 설정 참조
    pub fn config(&self) -> &HookManagerConfig {
        &self.config
    }

    // ========================================================================
    // 등록 / 해제
    // ========================================================================

    /// Hook 등록
    pub fn register(&self, hook: Hook) {
        let name = hook.name.clone();
        let priority = hook.priority;

        {
            let mut hooks = self.hooks.write();
            let bucket = hooks.entry(name.clone()).or_default();
            bucket.push(hook);
            // 안정 정렬: 동순위는 등록 순서 유지
            bucket.sort_by(|a, b| b.priority.cmp(&a.priority));
        }

        debug!(hook = %name, priority, "Registered hook");
        self.events.emit(
            "hook-registered",
            &json!({ "name": name.to_string(), "priority": priority }),
        );
    }

    /// 핸들러 참조가 같은 Hook 제거 (없으면 no-op)
    ///
    /// 제거된 개수를 반환합니다.
    pub fn unregister(&self, name: &HookPoint, handler: &HookHandler) -> usize {
        let removed = {
            let mut hooks = self.hooks.write();
            let Some(bucket) = hooks.get_mut(name) else {
                return 0;
            };
            let before = bucket.len();
            bucket.retain(|h| !h.handler.ptr_eq(handler));
            let removed = before - bucket.len();
            if bucket.is_empty() {
                hooks.remove(name);
            }
            removed
        };

        if removed > 0 {
            debug!(hook = %name, removed, "Unregistered hook");
            self.events
                .emit("hook-unregistered", &json!({ "name": name.to_string() }));
        }
        removed
    }

    /// 특정 지점 또는 전체 Hook 제거
    pub fn clear(&self, name: Option<&HookPoint>) {
        {
            let mut hooks = self.hooks.write();
            match name {
                Some(point) => {
                    hooks.remove(point);
                }
                None => hooks.clear(),
            }
        }

        self.events.emit(
            "hooks-cleared",
            &json!({ "name": name.map(|n| n.to_string()) }),
        );
    }

    // ========================================================================
    // 실행
    // ========================================================================

    /// 비동기 실행
    ///
    /// `None`을 반환한 Hook은 결과에 포함되지 않습니다. 실패/타임아웃은 에러 전략으로 처리되며
    /// `throw`일 때만 나머지 Hook을 중단하고 에러를 반환합니다.
    pub async fn execute(
        &self,
        name: &HookPoint,
        ctx: &mut HookContext,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        let hooks = self.hooks(name);
        self.emit_executing(name, hooks.len());

        let mut results = Vec::new();
        for hook in &hooks {
            let outcome = match &hook.handler {
                HookHandler::Sync(handler) => handler(ctx, args),
                HookHandler::Async(handler) => match self.config.timeout {
                    Some(timeout) => {
                        match tokio::time::timeout(timeout, handler.call(ctx, args)).await {
                            Ok(outcome) => outcome,
                            Err(_) => Err(Error::HookTimeout {
                                hook: name.to_string(),
                                timeout_ms: timeout.as_millis() as u64,
                            }),
                        }
                    }
                    None => handler.call(ctx, args).await,
                },
            };

            self.collect(name, hook, outcome, &mut results)?;
        }

        self.emit_completed(name, results.len());
        Ok(results)
    }

    /// 동기 실행 (타임아웃 없음)
    ///
    /// 비동기 핸들러는 실행할 수 없으므로 Hook 에러로 처리됩니다.
    pub fn execute_sync(
        &self,
        name: &HookPoint,
        ctx: &mut HookContext,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        let hooks = self.hooks(name);
        self.emit_executing(name, hooks.len());

        let mut results = Vec::new();
        for hook in &hooks {
            let outcome = match &hook.handler {
                HookHandler::Sync(handler) => handler(ctx, args),
                HookHandler::Async(_) => Err(Error::hook(
                    name.to_string(),
                    "async handler cannot run in synchronous execution",
                )),
            };

            self.collect(name, hook, outcome, &mut results)?;
        }

        self.emit_completed(name, results.len());
        Ok(results)
    }

    /// 단일 Hook 결과 처리
    fn collect(
        &self,
        name: &HookPoint,
        hook: &Hook,
        outcome: Result<Option<Value>>,
        results: &mut Vec<Value>,
    ) -> Result<()> {
        match outcome {
            Ok(value) => {
                trace!(hook = %name, priority = hook.priority, "Hook executed");
                self.events.emit(
                    "hook-executed",
                    &json!({ "name": name.to_string(), "priority": hook.priority }),
                );
                if let Some(value) = value {
                    results.push(value);
                }
                Ok(())
            }
            Err(error) => {
                self.events.emit(
                    "hook-error",
                    &json!({
                        "name": name.to_string(),
                        "priority": hook.priority,
                        "error": error.to_string(),
                    }),
                );
                self.config.error_strategy.handle(error, name.as_str())
            }
        }
    }

    fn emit_executing(&self, name: &HookPoint, count: usize) {
        trace!(hook = %name, count, "Executing hooks");
        self.events.emit(
            "hooks-executing",
            &json!({ "name": name.to_string(), "count": count }),
        );
    }

    fn emit_completed(&self, name: &HookPoint, results: usize) {
        self.events.emit(
            "hooks-completed",
            &json!({ "name": name.to_string(), "results": results }),
        );
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 특정 지점의 Hook 스냅샷 (실행 순서)
    pub fn hooks(&self, name: &HookPoint) -> Vec<Hook> {
        self.hooks.read().get(name).cloned().unwrap_or_default()
    }

    /// 특정 지점의 Hook 수
    pub fn count(&self, name: &HookPoint) -> usize {
        self.hooks.read().get(name).map(|b| b.len()).unwrap_or(0)
    }

    /// 전체 Hook 수
    pub fn total_count(&self) -> usize {
        self.hooks.read().values().map(|b| b.len()).sum()
    }

    /// Hook이 등록된 지점 목록 (이름순)
    pub fn registered_points(&self) -> Vec<HookPoint> {
        let mut points: Vec<HookPoint> = self.hooks.read().keys().cloned().collect();
        points.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        points
    }
}

impl Default for HookManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::AsyncHookFn;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager(strategy: ErrorStrategy) -> HookManager {
        HookManager::with_config(
            HookManagerConfig {
                timeout: Some(Duration::from_millis(1000)),
                error_strategy: strategy,
            },
            Arc::new(EventEmitter::new()),
        )
    }

    fn returning(priority: i32) -> Hook {
        Hook::sync("pre-parse", move |_, _| Ok(Some(json!(priority)))).with_priority(priority)
    }

    struct SlowHook {
        delay: Duration,
    }

    #[async_trait]
    impl AsyncHookFn for SlowHook {
        async fn call(&self, ctx: &mut HookContext, _args: &[Value]) -> Result<Option<Value>> {
            tokio::time::sleep(self.delay).await;
            ctx.metadata.insert("slow".into(), json!(true));
            Ok(Some(json!("slow")))
        }
    }

    #[tokio::test]
    async fn test_priority_order() {
        let hooks = manager(ErrorStrategy::Warn);
        hooks.register(returning(5));
        hooks.register(returning(15));
        hooks.register(returning(10));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap();
        assert_eq!(results, vec![json!(15), json!(10), json!(5)]);

        let sync_results = hooks
            .execute_sync(&HookPoint::PreParse, &mut ctx, &[])
            .unwrap();
        assert_eq!(sync_results, results);
    }

    #[tokio::test]
    async fn test_equal_priority_keeps_registration_order() {
        let hooks = manager(ErrorStrategy::Warn);
        for tag in ["first", "second", "third"] {
            hooks.register(Hook::sync("post-parse", move |_, _| Ok(Some(json!(tag)))));
        }
        hooks.register(Hook::sync("post-parse", |_, _| Ok(Some(json!("top")))).with_priority(1));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PostParse, &mut ctx, &[])
            .await
            .unwrap();
        assert_eq!(
            results,
            vec![json!("top"), json!("first"), json!("second"), json!("third")]
        );
    }

    #[tokio::test]
    async fn test_none_results_are_skipped_and_context_is_mutable() {
        let hooks = manager(ErrorStrategy::Warn);
        hooks.register(Hook::sync("field-parse", |ctx, _| {
            ctx.metadata.insert("touched".into(), json!(true));
            Ok(None)
        }));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::FieldParse, &mut ctx, &[])
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(ctx.metadata["touched"], json!(true));
    }

    #[tokio::test]
    async fn test_ignore_strategy_swallows_errors() {
        let hooks = manager(ErrorStrategy::Ignore);
        hooks.register(Hook::sync("pre-parse", |_, _| Err(Error::hook("pre-parse", "boom"))));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_warn_strategy_continues_chain() {
        let hooks = manager(ErrorStrategy::Warn);
        hooks.register(Hook::sync("pre-parse", |_, _| Err(Error::hook("pre-parse", "boom"))).with_priority(10));
        hooks.register(returning(1));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap();
        assert_eq!(results, vec![json!(1)]);
    }

    #[tokio::test]
    async fn test_throw_strategy_aborts_remaining() {
        let hooks = manager(ErrorStrategy::Throw);
        let later = Arc::new(AtomicUsize::new(0));

        hooks.register(Hook::sync("pre-parse", |_, _| Err(Error::hook("pre-parse", "boom"))).with_priority(10));
        let counter = Arc::clone(&later);
        hooks.register(Hook::sync("pre-parse", move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }));

        let mut ctx = HookContext::new();
        let err = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_hook_timeout() {
        let hooks = manager(ErrorStrategy::Ignore);
        hooks.register(Hook::new(
            "pre-parse",
            HookHandler::from_async(SlowHook {
                delay: Duration::from_secs(5),
            }),
        ));
        hooks.register(returning(-1));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap();
        assert_eq!(results, vec![json!(-1)]);
        assert!(!ctx.metadata.contains_key("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_async_hook_within_timeout() {
        let hooks = manager(ErrorStrategy::Throw);
        hooks.register(Hook::new(
            "pre-parse",
            HookHandler::from_async(SlowHook {
                delay: Duration::from_millis(10),
            }),
        ));

        let mut ctx = HookContext::new();
        let results = hooks
            .execute(&HookPoint::PreParse, &mut ctx, &[])
            .await
            .unwrap();
        assert_eq!(results, vec![json!("slow")]);
        assert_eq!(ctx.metadata["slow"], json!(true));
    }

    #[test]
    fn test_execute_sync_rejects_async_handler() {
        let hooks = manager(ErrorStrategy::Throw);
        hooks.register(Hook::new(
            "pre-parse",
            HookHandler::from_async(SlowHook {
                delay: Duration::from_millis(1),
            }),
        ));

        let mut ctx = HookContext::new();
        let result = hooks.execute_sync(&HookPoint::PreParse, &mut ctx, &[]);
        assert!(matches!(result, Err(Error::Hook { .. })));
    }

    #[test]
    fn test_unregister_by_handler_reference() {
        let hooks = manager(ErrorStrategy::Warn);
        let hook = returning(1);
        let handler = hook.handler.clone();
        hooks.register(hook);
        hooks.register(returning(2));

        assert_eq!(hooks.unregister(&HookPoint::PreParse, &handler), 1);
        assert_eq!(hooks.count(&HookPoint::PreParse), 1);
        assert_eq!(hooks.unregister(&HookPoint::PreParse, &handler), 0);
        assert_eq!(hooks.unregister(&HookPoint::PostParse, &handler), 0);
    }

    #[test]
    fn test_clear_and_events() {
        let events = Arc::new(EventEmitter::new());
        let registered = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&registered);
        events.on("hook-registered", move |_| {
            r.fetch_add(1, Ordering::SeqCst);
        });

        let hooks = HookManager::with_config(HookManagerConfig::default(), Arc::clone(&events));
        hooks.register(returning(1));
        hooks.register(Hook::sync("post-parse", |_, _| Ok(None)));
        assert_eq!(registered.load(Ordering::SeqCst), 2);
        assert_eq!(hooks.total_count(), 2);
        assert_eq!(
            hooks.registered_points(),
            vec![HookPoint::PostParse, HookPoint::PreParse]
        );

        hooks.clear(Some(&HookPoint::PreParse));
        assert_eq!(hooks.total_count(), 1);
        hooks.clear(None);
        assert_eq!(hooks.total_count(), 0);
    }
}
