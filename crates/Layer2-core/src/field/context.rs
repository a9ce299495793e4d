//! HookContext / ParseResult - 파싱/렌더링 중 전달되는 데이터

use super::Field;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// ParseResult
// ============================================================================

/// 문서 내용 노드 (필드 또는 그대로 통과한 텍스트)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentNode {
    /// `ParseResult::fields`의 인덱스
    Field { index: usize },
    /// 인식되지 않은 줄 (원문 그대로)
    Text { text: String },
}

/// 문서 파싱 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// 인식된 필드 (선언 순서)
    pub fields: Vec<Field>,

    /// 원문 순서대로의 내용
    pub content: Vec<ContentNode>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이름으로 필드 조회
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// 이름으로 필드 조회 (가변)
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// 필드 추가 (content에도 반영)
    pub fn push_field(&mut self, field: Field) {
        self.content.push(ContentNode::Field {
            index: self.fields.len(),
        });
        self.fields.push(field);
    }

    /// 텍스트 줄 추가
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(ContentNode::Text { text: text.into() });
    }
}

// ============================================================================
// HookContext
// ============================================================================

/// Hook/파서 호출에 전달되는 가변 컨텍스트
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookContext {
    /// 원본 입력 (pre-parse)
    pub input: Option<String>,

    /// 현재 처리 중인 필드 (field-parse, field-validate, field-render)
    pub field: Option<Field>,

    /// 전체 파싱 결과 (post-parse, pre-generate)
    pub parse_result: Option<ParseResult>,

    /// 임의 메타데이터 (`formId` 등)
    pub metadata: Map<String, Value>,
}

impl HookContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// 폼 ID (메타데이터 `formId`)
    pub fn form_id(&self) -> Option<&str> {
        self.metadata
            .get("formId")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}
