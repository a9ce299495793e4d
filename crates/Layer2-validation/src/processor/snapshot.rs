//! 메모리 내 요소 구현 (어댑터 / 테스트용)

use super::element::{ElementContainer, FieldElement};
use super::selector::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// 요소 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    #[serde(default = "default_tag")]
    pub tag_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
}

fn default_tag() -> String {
    "input".to_string()
}

impl ElementSnapshot {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// `<input type=".." name="..">`
    pub fn input(element_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: Some(element_type.into()),
            ..Self::new("input")
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }
}

impl FieldElement for ElementSnapshot {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn checked(&self) -> bool {
        self.checked
    }

    fn element_type(&self) -> Option<&str> {
        self.element_type.as_deref()
    }

    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn text_content(&self) -> Option<&str> {
        self.text_content.as_deref()
    }
}

/// 문서 순서를 유지하는 요소 목록
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotContainer {
    pub elements: Vec<ElementSnapshot>,
}

impl SnapshotContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, element: ElementSnapshot) -> Self {
        self.elements.push(element);
        self
    }

    pub fn push(&mut self, element: ElementSnapshot) {
        self.elements.push(element);
    }

    fn select(&self, selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(error = %e, "Ignoring selector");
                None
            }
        }
    }
}

impl FromIterator<ElementSnapshot> for SnapshotContainer {
    fn from_iter<I: IntoIterator<Item = ElementSnapshot>>(iter: I) -> Self {
        Self {
            elements: iter.into_iter().collect(),
        }
    }
}

impl ElementContainer for SnapshotContainer {
    fn query_selector(&self, selector: &str) -> Option<&dyn FieldElement> {
        let selector = self.select(selector)?;
        self.elements
            .iter()
            .find(|el| selector.matches(*el))
            .map(|el| el as &dyn FieldElement)
    }

    fn query_selector_all(&self, selector: &str) -> Vec<&dyn FieldElement> {
        let Some(selector) = self.select(selector) else {
            return Vec::new();
        };
        self.elements
            .iter()
            .filter(|el| selector.matches(*el))
            .map(|el| el as &dyn FieldElement)
            .collect()
    }
}
