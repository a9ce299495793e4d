//! # Builtin Field Types
//!
//! 기본 제공 필드 타입과 이를 묶은 코어 플러그인(`formdown-core`)
//!
//! - `range`: 슬라이더 (min/max/step/value/showValue/unit)
//! - `toggle`: on/off 스위치
//! - 표준 HTML 타입: text, email, password, number, tel, url, date, time,
//!   datetime-local, month, week, color, file, textarea, select, radio, checkbox, hidden

mod declaration;
pub(crate) mod markup;
mod range;
mod standard;
mod toggle;

pub use declaration::{scalar, Declaration};
pub use range::{range_field_type, RANGE_TYPE};
pub use standard::{standard_field_type, standard_field_types, STANDARD_TYPES};
pub use toggle::{toggle_field_type, TOGGLE_TYPE};

use crate::plugin::{Plugin, PluginMetadata};
use crate::registry::FieldTypePlugin;
use async_trait::async_trait;

/// 코어 플러그인 이름
pub const CORE_PLUGIN_NAME: &str = "formdown-core";

/// 기본 제공 필드 타입 묶음 플러그인
#[derive(Debug, Default, Clone, Copy)]
pub struct CorePlugin;

#[async_trait]
impl Plugin for CorePlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(CORE_PLUGIN_NAME, env!("CARGO_PKG_VERSION"))
            .with_description("Built-in Formdown field types")
    }

    fn field_types(&self) -> Vec<FieldTypePlugin> {
        let mut types = standard_field_types();
        types.push(range_field_type());
        types.push(toggle_field_type());
        types
    }
}

/// 코어 플러그인 인스턴스
pub fn core_plugin() -> CorePlugin {
    CorePlugin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_plugin_field_types_are_unique() {
        let types: Vec<String> = core_plugin()
            .field_types()
            .into_iter()
            .map(|t| t.field_type)
            .collect();

        let mut unique = types.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), types.len());
        assert!(types.contains(&RANGE_TYPE.to_string()));
        assert!(types.contains(&TOGGLE_TYPE.to_string()));
        assert_eq!(types.len(), STANDARD_TYPES.len() + 2);
    }
}
