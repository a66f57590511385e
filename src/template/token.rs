use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot classify placeholder token \"{token}\"")]
pub struct ClassifyError {
    token: String,
}

/// What a `{{...}}` token means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A dotted path into the profile graph, e.g. `provider.name`.
    Path(&'a str),
    /// A date pattern built from `y`/`m`/`d` characters, e.g. `yymmdd`.
    DateFormat(&'a str),
}

/// Extracts the raw contents of every `{{...}}` token, in order of
/// appearance. Unterminated delimiters end the scan.
pub fn extract_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };

        tokens.push(&after[..end]);
        rest = &after[end + 2..];
    }

    tokens
}

/// A path segment is an identifier, a numeric index, or an identifier with
/// a tolerated suffix like `name[0]` or `lower()`. Suffixes are accepted
/// here and judged during resolution.
fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']' | '(' | ')' | '\'' | '"' | ' ')
        })
}

pub fn classify(token: &str) -> Result<Token<'_>, ClassifyError> {
    if !token.is_empty() && token.chars().all(|c| matches!(c, 'y' | 'm' | 'd')) {
        return Ok(Token::DateFormat(token));
    }

    if token.contains('.') && token.split('.').all(is_path_segment) {
        return Ok(Token::Path(token));
    }

    Err(ClassifyError {
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_tokens() {
        assert_eq!(
            extract_tokens("Invoice from {{provider.name}} - {{yymmdd}}"),
            vec!["provider.name", "yymmdd"]
        );
        assert_eq!(extract_tokens("no tokens here"), Vec::<&str>::new());
        assert_eq!(extract_tokens("{{unterminated"), Vec::<&str>::new());
        assert_eq!(extract_tokens("{{a.b}} tail {{"), vec!["a.b"]);
    }

    #[test]
    fn test_classify_date_format() {
        assert_eq!(classify("yymmdd"), Ok(Token::DateFormat("yymmdd")));
        assert_eq!(classify("dd"), Ok(Token::DateFormat("dd")));
    }

    #[test]
    fn test_classify_path() {
        assert_eq!(classify("provider.name"), Ok(Token::Path("provider.name")));
        assert_eq!(classify("provider.0.name"), Ok(Token::Path("provider.0.name")));
        // call-like and index suffixes classify fine; resolution decides
        // whether they are supported
        assert_eq!(
            classify("provider.name[0].lower()"),
            Ok(Token::Path("provider.name[0].lower()"))
        );
    }

    #[test]
    fn test_classify_failures() {
        assert!(classify("").is_err());
        assert!(classify("justoneword").is_err());
        assert!(classify("Mon dd, yyyy").is_err());
        assert!(classify("a..b").is_err());
        assert!(classify("has.bad!char").is_err());
    }
}
