//! CSS 선택자 부분집합
//!
//! 단일 복합 선택자만 지원합니다: `tag`, `#id`, `[attr]`, `[attr="v"]`, `[attr*="v"]`, `:checked`

use super::element::FieldElement;
use formdown_foundation::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Exists,
    Equals(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    matcher: AttrMatch,
}

/// 파싱된 선택자
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    attributes: Vec<AttrSelector>,
    checked: bool,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidInput(format!("Invalid selector '{input}': {reason}"));
        let source = input.trim();
        if source.is_empty() {
            return Err(invalid("empty"));
        }

        let mut selector = Selector::default();
        let mut rest = source;

        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '*'))
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if tag != "*" {
                selector.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_len..];
        }

        while let Some(c) = rest.chars().next() {
            match c {
                '#' => {
                    let end = rest[1..]
                        .find(|c: char| matches!(c, '[' | ':' | '#'))
                        .map(|i| i + 1)
                        .unwrap_or(rest.len());
                    let id = &rest[1..end];
                    if id.is_empty() {
                        return Err(invalid("empty id"));
                    }
                    selector.id = Some(id.to_string());
                    rest = &rest[end..];
                }
                '[' => {
                    let end = closing_bracket(rest).ok_or_else(|| invalid("unterminated attribute"))?;
                    selector.attributes.push(parse_attribute(&rest[1..end]).ok_or_else(|| invalid("bad attribute"))?);
                    rest = &rest[end + 1..];
                }
                ':' => {
                    let pseudo = rest.strip_prefix(":checked").ok_or_else(|| invalid("unsupported pseudo-class"))?;
                    selector.checked = true;
                    rest = pseudo;
                }
                _ => return Err(invalid("unexpected character")),
            }
        }

        Ok(selector)
    }

    pub fn matches(&self, element: &dyn FieldElement) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != id {
                return false;
            }
        }
        if self.checked && !element.checked() {
            return false;
        }
        self.attributes.iter().all(|attr| {
            let actual = element.lookup(&attr.name);
            match &attr.matcher {
                AttrMatch::Exists => actual.is_some(),
                AttrMatch::Equals(v) => actual == Some(v.as_str()),
                AttrMatch::Contains(v) => actual.is_some_and(|a| a.contains(v.as_str())),
            }
        })
    }
}

/// 따옴표 안의 `]`는 무시
fn closing_bracket(input: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_attribute(body: &str) -> Option<AttrSelector> {
    let (name, matcher) = if let Some((name, value)) = body.split_once("*=") {
        (name, AttrMatch::Contains(unquote(value)?))
    } else if let Some((name, value)) = body.split_once('=') {
        (name, AttrMatch::Equals(unquote(value)?))
    } else {
        (body, AttrMatch::Exists)
    };

    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(AttrSelector {
        name: name.to_string(),
        matcher,
    })
}

fn unquote(value: &str) -> Option<String> {
    let value = value.trim();
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    (!inner.is_empty() || value.len() >= 2).then(|| inner.to_string())
}
