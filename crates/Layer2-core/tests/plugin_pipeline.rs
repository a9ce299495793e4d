//! 플러그인이 필드 타입과 Hook을 함께 기여하는 전체 파이프라인 테스트

use async_trait::async_trait;
use formdown_core::builtin::Declaration;
use formdown_core::{
    AsyncHookFn, ContentNode, ExtensionManager, Field, FieldRule, FieldTypePlugin, Hook,
    HookContext, HookHandler, Plugin, PluginMetadata, Result, CORE_PLUGIN_NAME,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// `@name: [rating max=5]`
fn rating_type() -> FieldTypePlugin {
    FieldTypePlugin::new("rating")
        .with_parser(|line, _| {
            let decl = Declaration::parse_keyword(line, "rating")?;
            let max = decl.number("max").unwrap_or(5.0);
            Some(decl.field("rating").with_attribute("max", json!(max as i64)))
        })
        .with_generator(|field, _| {
            let max = field.attr_f64("max").unwrap_or(5.0) as usize;
            format!(r#"<span class="rating" data-name="{}">{}</span>"#, field.name, "☆".repeat(max))
        })
        .with_validator(|field, value| {
            let max = field.attr_f64("max").unwrap_or(5.0);
            match value.as_f64() {
                Some(n) if n >= 1.0 && n <= max => vec![],
                _ => vec![FieldRule::new("range", format!("{} must be 1..{}", field.label, max))],
            }
        })
        .with_schema_generator(|field| {
            json!({ "type": "integer", "minimum": 1, "maximum": field.attr("max").cloned().unwrap_or(json!(5)) })
        })
        .with_styles(".rating{color:gold}")
}

/// 모든 필드에 data-source 속성을 추가하는 비동기 Hook
struct Annotate {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AsyncHookFn for Annotate {
    async fn call(&self, ctx: &mut HookContext, _args: &[Value]) -> Result<Option<Value>> {
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(field) = ctx.field.as_mut() {
            field.attributes.insert("source".into(), json!("plugin"));
        }
        Ok(None)
    }
}

struct RatingPlugin {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Plugin for RatingPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("rating", "1.0.0").with_dependency(CORE_PLUGIN_NAME)
    }

    fn hooks(&self) -> Vec<Hook> {
        vec![Hook::new(
            "field-parse",
            HookHandler::from_async(Annotate {
                calls: Arc::clone(&self.calls),
            }),
        )]
    }

    fn field_types(&self) -> Vec<FieldTypePlugin> {
        vec![rating_type()]
    }
}

const DOC: &str = "Tell us about your stay\n@stars(Overall): [rating max=3 required]\n@comment: [textarea rows=4]\n@later: [unknown]";

#[tokio::test]
async fn test_plugin_field_type_end_to_end() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = ExtensionManager::new();
    manager.initialize().await.unwrap();
    manager
        .register_plugin(Arc::new(RatingPlugin {
            calls: Arc::clone(&calls),
        }))
        .await
        .unwrap();

    let result = manager.parse(DOC).await.unwrap();
    assert_eq!(result.fields.len(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let stars: &Field = result.field("stars").unwrap();
    assert_eq!(stars.label, "Overall");
    assert!(stars.required);
    assert_eq!(stars.attributes["max"], json!(3));
    assert_eq!(stars.attributes["source"], json!("plugin"));
    assert_eq!(
        result.content.last(),
        Some(&ContentNode::Text {
            text: "@later: [unknown]".into()
        })
    );

    let html = manager.generate(&result, HookContext::new()).await.unwrap();
    assert!(html.contains(r#"<span class="rating" data-name="stars">☆☆☆</span>"#));
    assert!(html.contains("<textarea"));
    assert!(html.ends_with("@later: [unknown]"));

    let schema = manager.generate_schema(&result);
    assert_eq!(schema["properties"]["stars"]["maximum"], json!(3));
    assert_eq!(schema["properties"]["stars"]["title"], json!("Overall"));
    assert_eq!(schema["required"], json!(["stars"]));

    let rules = manager.validate_field(stars, &json!(4)).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].rule_type, "range");

    assert!(manager.registry().get_all_styles().contains(".rating{color:gold}"));
}

#[tokio::test]
async fn test_unregister_plugin_restores_passthrough() {
    let calls = Arc::new(AtomicUsize::new(0));
    let manager = ExtensionManager::new();
    manager.initialize().await.unwrap();
    manager
        .register_plugin(Arc::new(RatingPlugin {
            calls: Arc::clone(&calls),
        }))
        .await
        .unwrap();

    manager.unregister_plugin("rating").await.unwrap();
    assert!(!manager.registry().has("rating"));

    let result = manager.parse("@stars: [rating]").await.unwrap();
    assert!(result.fields.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(manager.get_stats().hook_count, 0);
}
