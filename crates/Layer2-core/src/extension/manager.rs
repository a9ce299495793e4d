//! Extension Manager - 확장 시스템 최상위 파사드
//!
//! EventEmitter + HookManager + PluginManager + FieldTypeRegistry를 하나로 묶습니다.

use crate::builtin::{core_plugin, CORE_PLUGIN_NAME};
use crate::field::HookContext;
use crate::hook::{HookManager, HookManagerConfig, HookPoint};
use crate::plugin::{Plugin, PluginManager};
use crate::registry::FieldTypeRegistry;
use formdown_foundation::{Error, EventEmitter, ExtensionConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

// ============================================================================
// ExtensionStats
// ============================================================================

/// 플러그인 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
    pub name: String,
    pub version: String,
}

/// 확장 시스템 통계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionStats {
    pub initialized: bool,
    pub plugins: Vec<PluginSummary>,
    pub hook_count: usize,
    pub registered_hooks: Vec<String>,
    pub field_types: Vec<String>,
    pub validators: Vec<String>,
    pub renderers: Vec<String>,
    pub themes: Vec<String>,
}

// ============================================================================
// ExtensionManager
// ============================================================================

/// 확장 매니저
pub struct ExtensionManager {
    config: ExtensionConfig,
    pub(super) events: Arc<EventEmitter>,
    pub(super) hooks: Arc<HookManager>,
    pub(super) registry: Arc<FieldTypeRegistry>,
    plugins: PluginManager,
    initialized: AtomicBool,
}

impl ExtensionManager {
    pub fn new() -> Self {
        Self::with_config(ExtensionConfig::default())
    }

    pub fn with_config(config: ExtensionConfig) -> Self {
        let events = Arc::new(EventEmitter::new());
        let hooks = Arc::new(HookManager::with_config(
            HookManagerConfig::from(&config),
            Arc::clone(&events),
        ));
        let registry = Arc::new(FieldTypeRegistry::new());
        let plugins = PluginManager::new(
            Arc::clone(&hooks),
            Arc::clone(&registry),
            Arc::clone(&events),
            config.plugin_error_strategy,
        );

        Self {
            config,
            events,
            hooks,
            registry,
            plugins,
            initialized: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // 라이프사이클
    // ========================================================================

    /// 초기화
    ///
    /// 설정에 따라 코어 플러그인을 먼저 등록한 뒤 모든 플러그인을 초기화합니다. 이미 초기화됐으면 no-op.
    pub async fn initialize(&self) -> Result<()> {
        if self.is_initialized() {
            return Ok(());
        }

        if self.config.register_core_plugin && !self.plugins.is_registered(CORE_PLUGIN_NAME) {
            match self.plugins.register(Arc::new(core_plugin())).await {
                Ok(()) | Err(Error::DuplicatePlugin(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.plugins.initialize().await?;
        self.initialized.store(true, Ordering::SeqCst);

        info!(
            plugins = self.plugins.len(),
            field_types = self.registry.len(),
            "Extension system initialized"
        );
        self.events.emit(
            "extension-initialized",
            &json!({ "plugins": self.plugins.len() }),
        );
        Ok(())
    }

    /// 종료 (모든 플러그인 정리, Hook 제거)
    pub async fn destroy(&self) -> Result<()> {
        let outcome = self.plugins.destroy().await;
        self.hooks.clear(None);
        self.initialized.store(false, Ordering::SeqCst);

        info!("Extension system destroyed");
        self.events.emit("extension-destroyed", &Value::Null);
        outcome
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // ========================================================================
    // 플러그인 / Hook
    // ========================================================================

    pub async fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<()> {
        self.plugins.register(plugin).await
    }

    pub async fn unregister_plugin(&self, name: &str) -> Result<()> {
        self.plugins.unregister(name).await
    }

    /// Hook 비동기 실행
    pub async fn execute_hooks(
        &self,
        point: impl Into<HookPoint>,
        ctx: &mut HookContext,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        let point = point.into();
        debug!(hook = %point, "Executing extension hooks");
        self.hooks.execute(&point, ctx, args).await
    }

    /// Hook 동기 실행
    pub fn execute_hooks_sync(
        &self,
        point: impl Into<HookPoint>,
        ctx: &mut HookContext,
        args: &[Value],
    ) -> Result<Vec<Value>> {
        self.hooks.execute_sync(&point.into(), ctx, args)
    }

    // ========================================================================
    // 조회
    // ========================================================================

    /// 통계
    pub fn get_stats(&self) -> ExtensionStats {
        let mut validators: Vec<String> = self.plugins.get_validators().into_keys().collect();
        let mut renderers: Vec<String> = self.plugins.get_renderers().into_keys().collect();
        let mut themes: Vec<String> = self.plugins.get_themes().into_keys().collect();
        validators.sort();
        renderers.sort();
        themes.sort();

        ExtensionStats {
            initialized: self.is_initialized(),
            plugins: self
                .plugins
                .get_all_metadata()
                .into_iter()
                .map(|m| PluginSummary {
                    name: m.name,
                    version: m.version,
                })
                .collect(),
            hook_count: self.hooks.total_count(),
            registered_hooks: self
                .hooks
                .registered_points()
                .iter()
                .map(ToString::to_string)
                .collect(),
            field_types: self.registry.types(),
            validators,
            renderers,
            themes,
        }
    }

    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }

    pub fn hooks(&self) -> &Arc<HookManager> {
        &self.hooks
    }

    pub fn registry(&self) -> &Arc<FieldTypeRegistry> {
        &self.registry
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }
}

impl Default for ExtensionManager {
    fn default() -> Self {
        Self::new()
    }
}
