//! 값 형식 판정 (표준 필드 타입과 검증 매니저가 같은 기준을 사용)

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn email_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(value))
}

/// 절대 URL (scheme + host, 또는 mailto)
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| url.has_host() || url.scheme() == "mailto")
        .unwrap_or(false)
}

/// HTML `pattern` 속성 의미 (전체 일치)
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example@x.io"));
    }

    #[test]
    fn test_url() {
        assert!(is_valid_url("https://formdown.dev/docs"));
        assert!(is_valid_url("ftp://files.formdown.dev"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("formdown.dev"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let re = compile_pattern(r"\d{5}").unwrap();
        assert!(re.is_match("12345"));
        assert!(!re.is_match("123456"));
        assert!(compile_pattern("(").is_err());
    }
}
