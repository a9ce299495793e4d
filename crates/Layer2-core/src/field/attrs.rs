//! 속성 토크나이저
//!
//! 선언의 `[type ...]` 안쪽 속성 문자열을 토큰으로 분리합니다.
//!
//! - `key=value`
//! - `key="quoted value"` / `key='quoted value'` (`\\`와 감싼 따옴표만 이스케이프, 그 외 백슬래시는 보존)
//! - `required` 같은 단독 플래그

/// 속성 토큰
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeToken {
    /// 키 (플래그 이름 포함)
    pub key: String,

    /// 값 (플래그면 None)
    pub value: Option<String>,

    /// 따옴표로 감싼 값인지
    pub quoted: bool,
}

impl AttributeToken {
    /// 단독 플래그인지 확인
    pub fn is_flag(&self) -> bool {
        self.value.is_none()
    }
}

/// 속성 문자열을 토큰 목록으로 분리
///
/// 닫히지 않은 따옴표는 문자열 끝까지를 값으로 취급합니다.
pub fn tokenize_attributes(input: &str) -> Vec<AttributeToken> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        // 공백 스킵
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        // 키
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        let key: String = chars[start..i].iter().collect();

        if i < chars.len() && chars[i] == '=' {
            i += 1;
            let (value, quoted, next) = read_value(&chars, i);
            i = next;
            if !key.is_empty() {
                tokens.push(AttributeToken {
                    key,
                    value: Some(value),
                    quoted,
                });
            }
        } else if !key.is_empty() {
            tokens.push(AttributeToken {
                key,
                value: None,
                quoted: false,
            });
        }
    }

    tokens
}

/// `=` 뒤의 값을 읽음 → (값, 따옴표 여부, 다음 위치)
fn read_value(chars: &[char], mut i: usize) -> (String, bool, usize) {
    let mut value = String::new();

    match chars.get(i) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            i += 1;
            while i < chars.len() {
                let c = chars[i];
                if c == '\\' && matches!(chars.get(i + 1), Some(&next) if next == quote || next == '\\') {
                    value.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                if c == quote {
                    i += 1;
                    break;
                }
                value.push(c);
                i += 1;
            }
            (value, true, i)
        }
        _ => {
            while i < chars.len() && !chars[i].is_whitespace() {
                value.push(chars[i]);
                i += 1;
            }
            (value, false, i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(key: &str, value: &str, quoted: bool) -> AttributeToken {
        AttributeToken {
            key: key.into(),
            value: Some(value.into()),
            quoted,
        }
    }

    fn flag(key: &str) -> AttributeToken {
        AttributeToken {
            key: key.into(),
            value: None,
            quoted: false,
        }
    }

    #[test]
    fn test_mixed_tokens() {
        let tokens = tokenize_attributes(r#"min=0 max=10 unit="km / h" required"#);
        assert_eq!(
            tokens,
            vec![
                kv("min", "0", false),
                kv("max", "10", false),
                kv("unit", "km / h", true),
                flag("required"),
            ]
        );
    }

    #[test]
    fn test_single_quotes_and_escapes() {
        let tokens = tokenize_attributes(r#"placeholder='it\'s' label="say \"hi\"""#);
        assert_eq!(tokens[0], kv("placeholder", "it's", true));
        assert_eq!(tokens[1], kv("label", r#"say "hi""#, true));
    }

    #[test]
    fn test_empty_and_unterminated() {
        assert!(tokenize_attributes("   ").is_empty());

        let tokens = tokenize_attributes(r#"unit="open ended"#);
        assert_eq!(tokens, vec![kv("unit", "open ended", true)]);

        let tokens = tokenize_attributes("value= checked");
        assert_eq!(tokens, vec![kv("value", "", false), flag("checked")]);
    }

    #[test]
    fn test_regex_backslashes_survive() {
        let tokens = tokenize_attributes(r#"pattern="\d{5}" alt='\w+\.\w+' path="C:\\tmp""#);
        assert_eq!(tokens[0], kv("pattern", r"\d{5}", true));
        assert_eq!(tokens[1], kv("alt", r"\w+\.\w+", true));
        assert_eq!(tokens[2], kv("path", r"C:\tmp", true));
    }
}
