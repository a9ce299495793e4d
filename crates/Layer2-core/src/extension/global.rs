//! 전역 기본 ExtensionManager

use super::manager::ExtensionManager;
use formdown_foundation::ExtensionConfig;
use std::sync::{Arc, OnceLock};

static DEFAULT_MANAGER: OnceLock<Arc<ExtensionManager>> = OnceLock::new();

/// 전역 기본 매니저 (최초 호출 시 기본 설정으로 생성)
pub fn get_or_init() -> Arc<ExtensionManager> {
    Arc::clone(DEFAULT_MANAGER.get_or_init(|| Arc::new(ExtensionManager::new())))
}

/// 설정을 지정해 전역 매니저 생성
///
/// 이미 생성돼 있으면 기존 인스턴스를 반환하고 설정은 무시됩니다.
pub fn init_with_config(config: ExtensionConfig) -> Arc<ExtensionManager> {
    Arc::clone(DEFAULT_MANAGER.get_or_init(|| Arc::new(ExtensionManager::with_config(config))))
}
