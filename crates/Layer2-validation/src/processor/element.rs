//! 요소 / 컨테이너 추상화
//!
//! UI 계층은 실제 DOM 요소를 이 trait에 맞춰 어댑터로 감쌉니다.

/// 폼 요소
pub trait FieldElement: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn value(&self) -> &str;

    fn checked(&self) -> bool;

    /// 네이티브 `type` 속성
    fn element_type(&self) -> Option<&str>;

    /// 소문자 태그 이름 (`input`, `select` ...)
    fn tag_name(&self) -> &str;

    fn get_attribute(&self, name: &str) -> Option<&str>;

    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    fn text_content(&self) -> Option<&str> {
        None
    }

    /// `contenteditable` 속성이 있고 `"false"`가 아닌 경우
    fn is_content_editable(&self) -> bool {
        self.get_attribute("contenteditable")
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }

    /// 선택자 매칭용 속성 조회 (`id`, `name`, `type`, `value`는 프로퍼티 우선)
    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(self.id()).filter(|s| !s.is_empty()),
            "name" => Some(self.name()).filter(|s| !s.is_empty()),
            "type" => self.element_type(),
            "value" => Some(self.value()),
            other => self.get_attribute(other),
        }
    }
}

/// 요소 컨테이너 (선택자 조회)
///
/// 잘못된 선택자는 일치하는 요소가 없는 것으로 취급합니다.
pub trait ElementContainer {
    fn query_selector(&self, selector: &str) -> Option<&dyn FieldElement>;

    fn query_selector_all(&self, selector: &str) -> Vec<&dyn FieldElement>;
}
