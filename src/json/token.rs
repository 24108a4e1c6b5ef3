use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    String,
    /// String immediately followed by `:`.
    Member,
    Primitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// True for tokens that can start a member's value.
    pub fn starts_value(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::LeftBrace | TokenKind::LeftBracket | TokenKind::String | TokenKind::Primitive
        )
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn punctuation(c: char) -> Option<TokenKind> {
    Some(match c {
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        ',' => TokenKind::Comma,
        ':' => TokenKind::Colon,
        _ => return None,
    })
}

/// Removes whitespace outside string literals. Input ends at the first NUL.
pub fn strip_whitespace(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if c == '\0' {
            break;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        if c == '"' {
            in_string = true;
        }
        if !is_whitespace(c) {
            out.push(c);
        }
    }
    out
}

/// Splits whitespace-stripped text into a flat token sequence.
///
/// Literals are kept as raw text. A literal still pending at end of input is
/// dropped, so the last literal must be followed by punctuation.
pub fn tokenize(stripped: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending = String::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = stripped.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
                pending.push(c);
            } else if c == '\\' {
                escaped = true;
                pending.push(c);
            } else if c == '"' {
                let kind = if chars.peek() == Some(&':') {
                    TokenKind::Member
                } else {
                    TokenKind::String
                };
                tokens.push(Token::new(kind, std::mem::take(&mut pending)));
                in_string = false;
            } else {
                pending.push(c);
            }
            continue;
        }

        if let Some(kind) = punctuation(c) {
            if !pending.is_empty() {
                tokens.push(Token::new(
                    TokenKind::Primitive,
                    std::mem::take(&mut pending),
                ));
            }
            tokens.push(Token::new(kind, c));
        } else if c == '"' {
            in_string = true;
            pending.clear();
        } else {
            pending.push(c);
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn strips_whitespace_outside_strings_only() {
        let text = "{ \"a name\" :\t[ 1,\r\n 2 ] }";
        assert_eq!(strip_whitespace(text), "{\"a name\":[1,2]}");
    }

    #[test]
    fn stops_at_nul_and_drops_bom() {
        assert_eq!(strip_whitespace("\u{feff}{}\0\0garbage"), "{}");
    }

    #[test]
    fn distinguishes_members_from_strings() {
        let tokens = tokenize("{\"uri\":\"a.bin\",\"n\":3}");
        use TokenKind::*;
        assert_eq!(
            kinds(&tokens),
            vec![
                LeftBrace, Member, Colon, String, Comma, Member, Colon, Primitive, RightBrace
            ]
        );
        assert_eq!(tokens[1].text, "uri");
        assert_eq!(tokens[3].text, "a.bin");
        assert_eq!(tokens[7].text, "3");
    }

    #[test]
    fn punctuation_inside_strings_is_literal() {
        let tokens = tokenize("[\"a,b:{c}\"]");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "a,b:{c}");
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let stripped = strip_whitespace("[\"say \\\"hi\\\"\"]");
        let tokens = tokenize(&stripped);
        assert_eq!(tokens[1].text, "say \\\"hi\\\"");
    }

    #[test]
    fn trailing_literal_is_not_flushed() {
        let tokens = tokenize("[1,2]42");
        assert_eq!(tokens.len(), 5);
        assert!(tokens.iter().all(|t| t.text != "42"));
    }
}
