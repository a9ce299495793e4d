//! 파싱된 문서 필드를 검증 레이어로 넘기는 통합 테스트

use formdown_core::{ExtensionManager, Plugin, PluginMetadata, ValidationPlugin, CORE_PLUGIN_NAME};
use formdown_validation::{
    process_checkbox_group, ElementSnapshot, FieldContext, FieldType, SnapshotContainer,
    ValidationManager,
};
use serde_json::json;
use std::sync::Arc;

struct UsernamePlugin;

#[async_trait::async_trait]
impl Plugin for UsernamePlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("usernames", "0.1.0").with_dependency(CORE_PLUGIN_NAME)
    }

    fn validators(&self) -> Vec<ValidationPlugin> {
        vec![ValidationPlugin::new("lowercase", |value, _| {
            Ok(value
                .as_str()
                .filter(|s| s.chars().any(char::is_uppercase))
                .map(|_| "Use lowercase letters only".to_string()))
        })]
    }
}

const FORM: &str = r#"# Sign up
@username: [text required minlength=3 validator="lowercase"]
@age: [number min=13 max=120]
@email: [email required]
@topics: [checkbox options="rust,go,zig" other]"#;

#[tokio::test]
async fn test_parsed_fields_drive_validation() {
    let extensions = ExtensionManager::new();
    extensions.initialize().await.unwrap();
    extensions.register_plugin(Arc::new(UsernamePlugin)).await.unwrap();

    let document = extensions.parse(FORM).await.unwrap();
    assert_eq!(document.fields.len(), 4);

    let validation = ValidationManager::new();
    validation.register_plugin_validators(extensions.plugins().get_validators().into_values());

    let form = serde_json::Map::new();
    let username = FieldContext::from(document.field("username").unwrap());
    assert_eq!(username.field_type, FieldType::Text);

    let result = validation.validate_async(&username, &json!("Neo"), &form).await;
    assert_eq!(result.messages(), vec!["Use lowercase letters only"]);

    let result = validation.validate_async(&username, &json!("ne"), &form).await;
    assert_eq!(result.errors[0].code, "minlength");

    let age = FieldContext::from(document.field("age").unwrap());
    let result = validation.validate_async(&age, &json!(7), &form).await;
    assert_eq!(result.errors[0].code, "min");

    let email = FieldContext::from(document.field("email").unwrap());
    let result = validation.validate_async(&email, &json!(""), &form).await;
    assert_eq!(result.errors[0].code, "required");
    assert!(validation.validate_async(&email, &json!("a@b.co"), &form).await.is_valid);
}

#[tokio::test]
async fn test_generated_other_sentinels_round_trip_through_processor() {
    let extensions = ExtensionManager::new();
    extensions.initialize().await.unwrap();

    let document = extensions.parse(FORM).await.unwrap();
    let topics = document.field("topics").unwrap();
    let html = extensions.registry().generate_field_html(topics, &Default::default()).unwrap();
    assert!(html.contains(r#"id="topics_other_checkbox""#));
    assert!(html.contains(r#"id="topics_other_input""#));

    // 생성된 마크업과 같은 모양의 스냅샷
    let container = SnapshotContainer::new()
        .with_element(ElementSnapshot::input("checkbox", "topics").with_id("topics_0").with_value("rust").with_checked(true))
        .with_element(ElementSnapshot::input("checkbox", "topics").with_id("topics_1").with_value("go"))
        .with_element(ElementSnapshot::input("checkbox", "topics").with_id("topics_other_checkbox").with_checked(true))
        .with_element(ElementSnapshot::input("text", "topics_other").with_id("topics_other_input").with_value(" odin "));

    let result = process_checkbox_group("topics", &container);
    assert!(result.success);
    assert_eq!(result.value, json!(["rust", "odin"]));
}

#[tokio::test]
async fn test_regex_pattern_and_required_shorthand_reach_validation() {
    let extensions = ExtensionManager::new();
    extensions.initialize().await.unwrap();

    let document = extensions
        .parse(r#"@zip*: [text pattern="\d{5}"]"#)
        .await
        .unwrap();
    let zip = document.field("zip").unwrap();
    assert!(zip.required);
    assert!(extensions.validate_field(zip, &json!("12345")).await.unwrap().is_empty());

    let ctx = FieldContext::from(zip);
    assert_eq!(ctx.constraints.pattern.as_deref(), Some(r"\d{5}"));

    let validation = ValidationManager::new();
    let form = serde_json::Map::new();
    assert!(validation.validate_async(&ctx, &json!("12345"), &form).await.is_valid);

    let result = validation.validate_async(&ctx, &json!("1234"), &form).await;
    assert_eq!(result.errors[0].code, "pattern");

    let result = validation.validate_async(&ctx, &json!(""), &form).await;
    assert_eq!(result.errors[0].code, "required");
}
