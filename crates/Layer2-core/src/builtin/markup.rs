//! HTML 조각 생성 헬퍼
//!
//! 속성 순서는 호출 순서 그대로 유지됩니다. 불리언 속성은 값 없이 이름만 출력하고, false면 생략합니다.

use crate::field::{display_value, escape_html, Field, HookContext};
use serde_json::Value;

/// 속성 목록 빌더
#[derive(Debug, Default)]
pub struct Attrs {
    out: String,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// `key="value"` (이스케이프)
    pub fn attr(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.out.push(' ');
        self.out.push_str(key);
        self.out.push_str("=\"");
        self.out.push_str(&escape_html(value.as_ref()));
        self.out.push('"');
        self
    }

    /// 값이 있을 때만 `key="value"`
    pub fn attr_opt(self, key: &str, value: Option<&Value>) -> Self {
        match value {
            Some(Value::Null) | None => self,
            Some(v) => self.attr(key, display_value(v)),
        }
    }

    /// 불리언 속성 (true면 이름만)
    pub fn flag(mut self, key: &str, on: bool) -> Self {
        if on {
            self.out.push(' ');
            self.out.push_str(key);
        }
        self
    }

    /// 컨텍스트에 폼 ID가 있으면 `form="..."`
    pub fn form(self, ctx: &HookContext) -> Self {
        match ctx.form_id() {
            Some(id) => self.attr("form", id),
            None => self,
        }
    }

    pub fn build(self) -> String {
        self.out
    }
}

/// `<label for="name">Label *</label>`
pub fn label(field: &Field) -> String {
    let marker = if field.required {
        r#" <span class="formdown-required">*</span>"#
    } else {
        ""
    };
    format!(
        r#"<label for="{}">{}{}</label>"#,
        escape_html(&field.name),
        escape_html(&field.label),
        marker
    )
}

/// 필드 래퍼 `<div class="formdown-field formdown-{type}">…</div>`
pub fn wrap(field: &Field, inner: &str) -> String {
    format!(
        r#"<div class="formdown-field formdown-{}">{}</div>"#,
        escape_html(&field.field_type),
        inner
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attrs_order_and_flags() {
        let ctx = HookContext::new().with_metadata("formId", json!("f1"));
        let html = Attrs::new()
            .attr("type", "text")
            .attr_opt("placeholder", Some(&json!("a \"b\"")))
            .attr_opt("min", None)
            .flag("required", true)
            .flag("disabled", false)
            .form(&ctx)
            .build();
        assert_eq!(
            html,
            r#" type="text" placeholder="a &quot;b&quot;" required form="f1""#
        );
    }

    #[test]
    fn test_label_marks_required() {
        let field = Field::new("email", "email").required(true);
        assert_eq!(
            label(&field),
            r#"<label for="email">Email <span class="formdown-required">*</span></label>"#
        );
    }
}
