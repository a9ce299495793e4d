//! Plugin Manager - 플러그인 라이프사이클 관리
//!
//! - 등록은 all-or-nothing: 중복 이름, 누락된 의존성, 필드 타입 충돌을 먼저 모두 확인
//! - 플러그인이 기여한 Hook/필드 타입은 공유 HookManager/FieldTypeRegistry로 전달
//! - 해제 시 등록 당시 보관한 항목을 정확히 같은 참조로 제거
//! - 라이프사이클 실패는 플러그인 에러 전략으로 처리

use super::traits::{Plugin, PluginMetadata, RendererPlugin, ThemePlugin, ValidationPlugin};
use crate::hook::{Hook, HookManager};
use crate::registry::{FieldTypePlugin, FieldTypeRegistry};
use formdown_foundation::{Error, ErrorStrategy, EventEmitter, Result};
use futures::future::join_all;
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// 내부 상태
// ============================================================================

/// 등록된 플러그인과 그 기여 항목
struct RegisteredPlugin {
    plugin: Arc<dyn Plugin>,
    metadata: PluginMetadata,

    /// HookManager에 실제로 등록한 Hook (해제 시 참조 비교용)
    hooks: Vec<Hook>,

    field_types: Vec<String>,
    validators: Vec<String>,
    renderers: Vec<String>,
    themes: Vec<String>,
}

#[derive(Default)]
struct PluginState {
    /// 등록 순서
    order: Vec<String>,
    plugins: HashMap<String, RegisteredPlugin>,

    field_types: Vec<FieldTypePlugin>,
    validators: HashMap<String, ValidationPlugin>,
    renderers: HashMap<String, RendererPlugin>,
    themes: HashMap<String, ThemePlugin>,
}

// ============================================================================
// PluginManager
// ============================================================================

/// 플러그인 매니저
pub struct PluginManager {
    state: RwLock<PluginState>,

    /// 공유 Hook 매니저
    hooks: Arc<HookManager>,

    /// 공유 필드 타입 레지스트리
    registry: Arc<FieldTypeRegistry>,

    /// 이벤트 이미터
    events: Arc<EventEmitter>,

    /// 라이프사이클 에러 처리 전략
    error_strategy: ErrorStrategy,

    /// 일괄 초기화 완료 여부
    initialized: AtomicBool,
}

impl PluginManager {
    pub fn new(
        hooks: Arc<HookManager>,
        registry: Arc<FieldTypeRegistry>,
        events: Arc<EventEmitter>,
        error_strategy: ErrorStrategy,
    ) -> Self {
        Self {
            state: RwLock::new(PluginState::default()),
            hooks,
            registry,
            events,
            error_strategy,
            initialized: AtomicBool::new(false),
        }
    }

    /// 독립 실행용 매니저 (자체 HookManager/Registry 보유)
    pub fn standalone() -> Self {
        let events = Arc::new(EventEmitter::new());
        Self::new(
            Arc::new(HookManager::with_config(
                Default::default(),
                Arc::clone(&events),
            )),
            Arc::new(FieldTypeRegistry::new()),
            events,
            ErrorStrategy::default(),
        )
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // ========================================================================
    // 등록 / 해제
    // ========================================================================

    /// 플러그인 등록
    ///
    /// 매니저가 이미 초기화된 상태면 즉시 `initialize()`를 호출합니다.
    /// 그 실패는 에러 전략으로 처리되며 등록은 유지됩니다.
    pub async fn register(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let metadata = plugin.metadata();
        let name = metadata.name.clone();

        // 이벤트 리스너가 매니저를 조회할 수 있도록 Hook 등록은 잠금 해제 후 수행
        let hooks = self.attach(&plugin, metadata)?;
        for hook in hooks {
            self.hooks.register(hook);
        }

        info!("Registered plugin: {}", name);
        self.events.emit("plugin-registered", &json!({ "name": name }));

        if self.is_initialized() {
            if let Err(e) = plugin.initialize().await {
                self.handle_error(&name, e)?;
            }
        }

        Ok(())
    }

    /// 검증 후 기여 항목 연결 → HookManager에 등록할 Hook 목록 반환
    fn attach(&self, plugin: &Arc<dyn Plugin>, metadata: PluginMetadata) -> Result<Vec<Hook>> {
        let name = metadata.name.clone();
        let mut state = self.state.write();

        // 1. 검증 (변경 전)
        if state.plugins.contains_key(&name) {
            return Err(Error::DuplicatePlugin(name));
        }
        if let Some(missing) = metadata
            .dependencies
            .iter()
            .find(|dep| !state.plugins.contains_key(dep.as_str()))
        {
            return Err(Error::MissingDependency {
                plugin: name,
                dependency: missing.clone(),
            });
        }

        let field_types = plugin.field_types();
        for (i, ft) in field_types.iter().enumerate() {
            if field_types[..i].iter().any(|other| other.field_type == ft.field_type) {
                return Err(Error::DuplicateType(ft.field_type.clone()));
            }
        }

        // 2. 필드 타입 (레지스트리 충돌 시 앞서 등록한 타입 롤백)
        let mut registered_types: Vec<String> = Vec::with_capacity(field_types.len());
        for ft in &field_types {
            if let Err(e) = self.registry.register(ft.clone()) {
                for t in &registered_types {
                    self.registry.unregister(t);
                }
                debug!(plugin = %name, field_type = %ft.field_type, "Rolled back field types");
                return Err(e);
            }
            registered_types.push(ft.field_type.clone());
        }
        state.field_types.extend(field_types);

        // 3. Hook (등록은 호출자가 잠금 해제 후 수행)
        let hooks = plugin.hooks();

        // 4. 검증기 / 렌더러 / 테마
        let mut validators = Vec::new();
        for validator in plugin.validators() {
            validators.push(validator.name.clone());
            state.validators.insert(validator.name.clone(), validator);
        }
        let mut renderers = Vec::new();
        for renderer in plugin.renderers() {
            renderers.push(renderer.template.clone());
            state.renderers.insert(renderer.template.clone(), renderer);
        }
        let mut themes = Vec::new();
        for theme in plugin.themes() {
            themes.push(theme.name.clone());
            state.themes.insert(theme.name.clone(), theme);
        }

        debug!(
            plugin = %name,
            hooks = hooks.len(),
            field_types = registered_types.len(),
            "Attached plugin contributions"
        );

        state.order.push(name.clone());
        state.plugins.insert(
            name,
            RegisteredPlugin {
                plugin: Arc::clone(plugin),
                metadata,
                hooks: hooks.clone(),
                field_types: registered_types,
                validators,
                renderers,
                themes,
            },
        );
        Ok(hooks)
    }

    /// 플러그인 해제 (없으면 no-op)
    ///
    /// `destroy()` 실패도 기여 항목 제거는 끝까지 진행한 뒤 에러 전략을 적용합니다.
    pub async fn unregister(&self, name: &str) -> Result<()> {
        let Some(plugin) = self.get(name) else {
            return Ok(());
        };

        let destroyed = plugin.destroy().await;

        if let Some(entry) = self.detach(name) {
            info!("Unregistered plugin: {} (v{})", name, entry.metadata.version);
            self.events.emit("plugin-unregistered", &json!({ "name": name }));
        }

        match destroyed {
            Ok(()) => Ok(()),
            Err(e) => self.handle_error(name, e),
        }
    }

    /// 기여 항목 제거 후 항목 반환 (Hook 해제 이벤트는 잠금 해제 후 발생)
    fn detach(&self, name: &str) -> Option<RegisteredPlugin> {
        let entry = self.remove_entry(name)?;
        for hook in &entry.hooks {
            self.hooks.unregister(&hook.name, &hook.handler);
        }
        Some(entry)
    }

    fn remove_entry(&self, name: &str) -> Option<RegisteredPlugin> {
        let mut state = self.state.write();
        let entry = state.plugins.remove(name)?;
        state.order.retain(|n| n != name);

        for t in &entry.field_types {
            self.registry.unregister(t);
        }
        state
            .field_types
            .retain(|ft| !entry.field_types.contains(&ft.field_type));
        for v in &entry.validators {
            state.validators.remove(v);
        }
        for r in &entry.renderers {
            state.renderers.remove(r);
        }
        for t in &entry.themes {
            state.themes.remove(t);
        }

        Some(entry)
    }

    // ========================================================================
    // 라이프사이클
    // ========================================================================

    /// 모든 플러그인 동시 초기화
    ///
    /// 개별 실패는 형제 플러그인을 중단시키지 않습니다. `throw` 전략이면 모두 끝난 뒤 첫 에러를 반환합니다.
    pub async fn initialize(&self) -> Result<()> {
        let plugins = self.get_all();
        let results = join_all(plugins.iter().map(|p| p.initialize())).await;
        self.initialized.store(true, Ordering::SeqCst);

        let outcome = self.collect_errors(&plugins, results);
        self.events
            .emit("plugins-initialized", &json!({ "count": plugins.len() }));
        outcome
    }

    /// 모든 플러그인 동시 정리 후 상태 초기화
    pub async fn destroy(&self) -> Result<()> {
        let plugins = self.get_all();
        let results = join_all(plugins.iter().map(|p| p.destroy())).await;

        let names: Vec<String> = self.state.read().order.clone();
        for name in &names {
            self.detach(name);
        }
        *self.state.write() = PluginState::default();
        self.initialized.store(false, Ordering::SeqCst);

        let outcome = self.collect_errors(&plugins, results);
        self.events
            .emit("plugins-destroyed", &json!({ "count": plugins.len() }));
        outcome
    }

    fn collect_errors(&self, plugins: &[Arc<dyn Plugin>], results: Vec<Result<()>>) -> Result<()> {
        let mut first = None;
        for (plugin, result) in plugins.iter().zip(results) {
            if let Err(e) = result {
                if let Err(e) = self.handle_error(&plugin.metadata().name, e) {
                    first.get_or_insert(e);
                }
            }
        }
        first.map_or(Ok(()), Err)
    }

    /// 라이프사이클 에러 처리
    fn handle_error(&self, name: &str, error: Error) -> Result<()> {
        let error = match error {
            e @ Error::Plugin { .. } => e,
            other => Error::plugin(name, other.to_string()),
        };
        self.events.emit(
            "plugin-error",
            &json!({ "name": name, "error": error.to_string() }),
        );
        self.error_strategy.handle(error, name)
    }

    // ========================================================================
    // 조회 (모두 복사본 반환)
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.state
            .read()
            .plugins
            .get(name)
            .map(|entry| Arc::clone(&entry.plugin))
    }

    /// 등록 순서대로 모든 플러그인
    pub fn get_all(&self) -> Vec<Arc<dyn Plugin>> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|n| state.plugins.get(n).map(|e| Arc::clone(&e.plugin)))
            .collect()
    }

    /// 등록 순서대로 모든 메타데이터
    pub fn get_all_metadata(&self) -> Vec<PluginMetadata> {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|n| state.plugins.get(n).map(|e| e.metadata.clone()))
            .collect()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.state.read().plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.state.read().plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_field_types(&self) -> Vec<FieldTypePlugin> {
        self.state.read().field_types.clone()
    }

    pub fn get_field_type(&self, field_type: &str) -> Option<FieldTypePlugin> {
        self.state
            .read()
            .field_types
            .iter()
            .find(|ft| ft.field_type == field_type)
            .cloned()
    }

    pub fn has_field_type(&self, field_type: &str) -> bool {
        self.state
            .read()
            .field_types
            .iter()
            .any(|ft| ft.field_type == field_type)
    }

    pub fn get_validators(&self) -> HashMap<String, ValidationPlugin> {
        self.state.read().validators.clone()
    }

    pub fn get_renderers(&self) -> HashMap<String, RendererPlugin> {
        self.state.read().renderers.clone()
    }

    pub fn get_themes(&self) -> HashMap<String, ThemePlugin> {
        self.state.read().themes.clone()
    }

    // ========================================================================
    // 접근자
    // ========================================================================

    pub fn hooks(&self) -> &Arc<HookManager> {
        &self.hooks
    }

    pub fn registry(&self) -> &Arc<FieldTypeRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::HookPoint;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct TestPlugin {
        name: &'static str,
        deps: Vec<&'static str>,
        field_types: Vec<&'static str>,
        fail_init: bool,
        init_calls: Arc<AtomicUsize>,
        destroy_calls: Arc<AtomicUsize>,
    }

    impl TestPlugin {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                deps: vec![],
                field_types: vec![],
                fail_init: false,
                init_calls: Arc::new(AtomicUsize::new(0)),
                destroy_calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn metadata(&self) -> PluginMetadata {
            let mut metadata = PluginMetadata::new(self.name, "1.0.0");
            for dep in &self.deps {
                metadata = metadata.with_dependency(*dep);
            }
            metadata
        }

        fn hooks(&self) -> Vec<Hook> {
            vec![Hook::sync("post-parse", |_, _| Ok(None))]
        }

        fn field_types(&self) -> Vec<FieldTypePlugin> {
            self.field_types
                .iter()
                .map(|t| FieldTypePlugin::new(*t))
                .collect()
        }

        fn validators(&self) -> Vec<ValidationPlugin> {
            vec![ValidationPlugin::new(format!("{}-check", self.name), |_, _| Ok(None))]
        }

        async fn initialize(&self) -> Result<()> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                return Err(Error::Internal("init failed".into()));
            }
            Ok(())
        }

        async fn destroy(&self) -> Result<()> {
            self.destroy_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_dependency_then_success() {
        let manager = PluginManager::standalone();
        let mut child = TestPlugin::new("child");
        child.deps = vec!["parent"];
        let child = Arc::new(child);

        let err = manager.register(child.clone()).await.unwrap_err();
        assert!(err.to_string().contains("requires dependency"));
        assert!(!manager.is_registered("child"));
        assert_eq!(manager.hooks().total_count(), 0);

        manager.register(Arc::new(TestPlugin::new("parent"))).await.unwrap();
        manager.register(child).await.unwrap();
        assert!(manager.is_registered("child"));
    }

    #[tokio::test]
    async fn test_duplicate_then_reregister() {
        let manager = PluginManager::standalone();
        manager.register(Arc::new(TestPlugin::new("dup"))).await.unwrap();

        let err = manager
            .register(Arc::new(TestPlugin::new("dup")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));

        manager.unregister("dup").await.unwrap();
        manager.register(Arc::new(TestPlugin::new("dup"))).await.unwrap();
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.hooks().count(&HookPoint::PostParse), 1);
    }

    #[tokio::test]
    async fn test_field_type_collision_leaves_no_partial_state() {
        let manager = PluginManager::standalone();
        let mut first = TestPlugin::new("first");
        first.field_types = vec!["stars"];
        manager.register(Arc::new(first)).await.unwrap();

        let mut second = TestPlugin::new("second");
        second.field_types = vec!["stars"];
        let err = manager.register(Arc::new(second)).await.unwrap_err();
        assert!(err.to_string().contains("is already registered"));

        assert!(!manager.is_registered("second"));
        assert_eq!(manager.hooks().count(&HookPoint::PostParse), 1);
        assert!(!manager.get_validators().contains_key("second-check"));
    }

    #[tokio::test]
    async fn test_unregister_removes_contributions() {
        let manager = PluginManager::standalone();
        let mut plugin = TestPlugin::new("stars");
        plugin.field_types = vec!["stars"];
        let destroy_calls = Arc::clone(&plugin.destroy_calls);
        manager.register(Arc::new(plugin)).await.unwrap();

        assert!(manager.registry().has("stars"));
        assert!(manager.has_field_type("stars"));

        manager.unregister("stars").await.unwrap();
        assert_eq!(destroy_calls.load(Ordering::SeqCst), 1);
        assert!(!manager.registry().has("stars"));
        assert!(!manager.has_field_type("stars"));
        assert!(manager.get_validators().is_empty());
        assert_eq!(manager.hooks().total_count(), 0);

        // 없는 플러그인 해제는 no-op
        manager.unregister("stars").await.unwrap();
    }

    #[tokio::test]
    async fn test_late_registration_initializes_immediately() {
        let manager = PluginManager::standalone();
        manager.initialize().await.unwrap();

        let plugin = TestPlugin::new("late");
        let init_calls = Arc::clone(&plugin.init_calls);
        manager.register(Arc::new(plugin)).await.unwrap();
        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_does_not_stop_siblings() {
        let events = Arc::new(EventEmitter::new());
        let manager = PluginManager::new(
            Arc::new(HookManager::new()),
            Arc::new(FieldTypeRegistry::new()),
            Arc::clone(&events),
            ErrorStrategy::Throw,
        );

        let mut bad = TestPlugin::new("bad");
        bad.fail_init = true;
        let good = TestPlugin::new("good");
        let good_calls = Arc::clone(&good.init_calls);
        manager.register(Arc::new(bad)).await.unwrap();
        manager.register(Arc::new(good)).await.unwrap();

        let err = manager.initialize().await.unwrap_err();
        assert!(matches!(err, Error::Plugin { ref plugin, .. } if plugin == "bad"));
        assert_eq!(good_calls.load(Ordering::SeqCst), 1);
        assert!(manager.is_registered("bad"));
    }

    #[tokio::test]
    async fn test_destroy_clears_everything() {
        let manager = PluginManager::standalone();
        let mut plugin = TestPlugin::new("a");
        plugin.field_types = vec!["a-type"];
        manager.register(Arc::new(plugin)).await.unwrap();
        manager.initialize().await.unwrap();

        manager.destroy().await.unwrap();
        assert!(manager.is_empty());
        assert!(!manager.is_initialized());
        assert!(!manager.registry().has("a-type"));
        assert_eq!(manager.hooks().total_count(), 0);
    }

    #[tokio::test]
    async fn test_registry_collision_rolls_back_earlier_types() {
        let manager = PluginManager::standalone();
        let mut first = TestPlugin::new("first");
        first.field_types = vec!["stars"];
        manager.register(Arc::new(first)).await.unwrap();

        let mut second = TestPlugin::new("second");
        second.field_types = vec!["hearts", "stars"];
        let err = manager.register(Arc::new(second)).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateType(ref t) if t == "stars"));

        assert!(!manager.registry().has("hearts"));
        assert!(manager.registry().has("stars"));
        assert!(!manager.has_field_type("hearts"));
        assert!(!manager.is_registered("second"));
        assert_eq!(manager.hooks().count(&HookPoint::PostParse), 1);
    }

    #[tokio::test]
    async fn test_hook_listeners_can_query_manager() {
        let events = Arc::new(EventEmitter::new());
        let manager = Arc::new(PluginManager::new(
            Arc::new(HookManager::with_config(Default::default(), Arc::clone(&events))),
            Arc::new(FieldTypeRegistry::new()),
            Arc::clone(&events),
            ErrorStrategy::Warn,
        ));

        let seen = Arc::new(AtomicUsize::new(usize::MAX));
        for event in ["hook-registered", "hook-unregistered"] {
            let weak = Arc::downgrade(&manager);
            let seen = Arc::clone(&seen);
            events.on(event, move |_| {
                if let Some(manager) = weak.upgrade() {
                    seen.store(manager.len(), Ordering::SeqCst);
                }
            });
        }

        manager.register(Arc::new(TestPlugin::new("observed"))).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        manager.unregister("observed").await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
