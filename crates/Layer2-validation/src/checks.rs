//! 값 판정 함수 (파이프라인 규칙과 FieldProcessor 공용)
//!
//! 이메일/URL/패턴은 표준 필드 타입과 같은 기준을 쓰도록 core의 판정을 재사용합니다.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub use formdown_core::field::{compile_pattern, is_valid_email, is_valid_url};

fn tel_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[0-9\s\-().]{7,20}$").ok())
        .as_ref()
}

/// 전화번호 (숫자 7자리 이상)
pub fn is_valid_tel(value: &str) -> bool {
    let digits = value.chars().filter(char::is_ascii_digit).count();
    digits >= 7 && tel_regex().is_some_and(|re| re.is_match(value))
}

/// `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// 문자 수 (바이트가 아닌 char 기준)
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
