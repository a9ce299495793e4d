//! 선언 한 줄 파싱 - `@name(label): [keyword attrs...]`
//!
//! 이름이나 라벨 뒤의 `*`는 `required` 플래그의 축약입니다 (`@email*: [email]`).

use crate::field::{number_value, tokenize_attributes, value_as_f64, AttributeToken, Field};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static DECLARATION: OnceLock<Option<Regex>> = OnceLock::new();

fn declaration_regex() -> Option<&'static Regex> {
    DECLARATION
        .get_or_init(|| {
            Regex::new(r"^@(\w+)(\*)?(?:\(([^)]+)\))?(\*)?:\s*\[([\w-]+)(?:\s+(.*))?\]\s*$").ok()
        })
        .as_ref()
}

/// 필드 자체 플래그 (속성으로 저장하지 않음)
const REQUIRED_FLAG: &str = "required";

/// 파싱된 선언
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub label: Option<String>,
    pub keyword: String,
    pub tokens: Vec<AttributeToken>,

    /// `*` 축약 표기 여부
    pub starred: bool,
}

impl Declaration {
    /// 선언 줄 파싱 (형식이 다르면 None)
    pub fn parse(line: &str) -> Option<Self> {
        let caps = declaration_regex()?.captures(line.trim())?;

        Some(Self {
            name: caps.get(1)?.as_str().to_string(),
            label: caps
                .get(3)
                .map(|m| m.as_str().trim().to_string())
                .filter(|l| !l.is_empty()),
            keyword: caps.get(5)?.as_str().to_string(),
            tokens: caps
                .get(6)
                .map(|m| tokenize_attributes(m.as_str()))
                .unwrap_or_default(),
            starred: caps.get(2).is_some() || caps.get(4).is_some(),
        })
    }

    /// 주어진 키워드의 선언만 파싱
    pub fn parse_keyword(line: &str, keyword: &str) -> Option<Self> {
        Self::parse(line).filter(|d| d.keyword == keyword)
    }

    /// 기본 Field 생성 (이름, 라벨, required)
    pub fn field(&self, field_type: &str) -> Field {
        let required = self.starred || self.flag(REQUIRED_FLAG);
        let mut field = Field::new(&self.name, field_type).required(required);
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        field
    }

    fn token(&self, key: &str) -> Option<&AttributeToken> {
        self.tokens.iter().rev().find(|t| t.key == key)
    }

    /// 플래그 존재 여부 (`flag` 또는 `flag=true`)
    pub fn flag(&self, key: &str) -> bool {
        match self.token(key) {
            Some(t) => t.value.as_deref().map_or(true, |v| v == "true"),
            None => false,
        }
    }

    /// 숫자 속성
    pub fn number(&self, key: &str) -> Option<f64> {
        self.token(key)?
            .value
            .as_deref()
            .and_then(|v| value_as_f64(&Value::String(v.to_string())))
    }

    /// 문자열 속성
    pub fn string(&self, key: &str) -> Option<String> {
        self.token(key)?.value.clone()
    }

    /// `a,b,c` 목록 속성
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        self.string(key).map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// 지정한 키를 제외한 나머지 토큰 (선언 순서)
    pub fn extra<'a>(&'a self, known: &'a [&'a str]) -> impl Iterator<Item = (&'a str, Value)> + 'a {
        self.tokens
            .iter()
            .filter(move |t| t.key != REQUIRED_FLAG && !known.iter().any(|k| *k == t.key))
            .map(|t| (t.key.as_str(), scalar(t)))
    }
}

/// 토큰 값을 JSON 스칼라로 변환
///
/// 플래그 → true, 따옴표 값 → 문자열, 그 외 숫자/불리언이면 해당 타입
pub fn scalar(token: &AttributeToken) -> Value {
    let Some(raw) = token.value.as_deref() else {
        return Value::Bool(true);
    };
    if token.quoted {
        return Value::String(raw.to_string());
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => number_value(n),
            _ => Value::String(raw.to_string()),
        },
    }
}
