//! Tokenizer for tariff formulas.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::FormulaError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(Decimal),
    Text(String),
    Ident(String),
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Question,
    Colon,
    LParen,
    RParen,
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub pos: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Spanned>, FormulaError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && next_is_digit(bytes, i)) {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let literal = &source[start..i];
            let value = Decimal::from_str(literal).map_err(|_| FormulaError::Syntax {
                pos: start,
                message: format!("invalid number literal '{}'", literal),
            })?;
            // Decimal suffix, e.g. 26.00M
            if i < bytes.len() && (bytes[i] == b'M' || bytes[i] == b'm') {
                i += 1;
            }
            tokens.push(Spanned {
                token: Token::Number(value),
                pos: start,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            let word = &source[start..i];
            let token = match word {
                "true" => Token::True,
                "false" => Token::False,
                _ => Token::Ident(word.to_string()),
            };
            tokens.push(Spanned { token, pos: start });
            continue;
        }

        if c == '"' || c == '\'' {
            i += 1;
            let content_start = i;
            while i < bytes.len() && bytes[i] as char != c {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(FormulaError::Syntax {
                    pos: start,
                    message: "unterminated string literal".to_string(),
                });
            }
            tokens.push(Spanned {
                token: Token::Text(source[content_start..i].to_string()),
                pos: start,
            });
            i += 1;
            continue;
        }

        let two = if i + 1 < bytes.len() {
            Some((c, bytes[i + 1] as char))
        } else {
            None
        };
        let double = match two {
            Some(('=', '=')) => Some(Token::EqEq),
            Some(('!', '=')) => Some(Token::NotEq),
            Some(('<', '=')) => Some(Token::Le),
            Some(('>', '=')) => Some(Token::Ge),
            Some(('&', '&')) => Some(Token::AndAnd),
            Some(('|', '|')) => Some(Token::OrOr),
            _ => None,
        };
        if let Some(token) = double {
            tokens.push(Spanned { token, pos: start });
            i += 2;
            continue;
        }

        let single = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '!' => Token::Bang,
            '<' => Token::Lt,
            '>' => Token::Gt,
            '?' => Token::Question,
            ':' => Token::Colon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => {
                return Err(FormulaError::Syntax {
                    pos: start,
                    message: format!("unexpected character '{}'", other),
                })
            }
        };
        tokens.push(Spanned {
            token: single,
            pos: start,
        });
        i += 1;
    }

    Ok(tokens)
}

fn next_is_digit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn decimal_suffix_is_accepted() {
        assert_eq!(
            kinds("26.00M * NUM"),
            vec![
                Token::Number(dec!(26.00)),
                Token::Star,
                Token::Ident("NUM".to_string())
            ]
        );
    }

    #[test]
    fn two_char_operators_win_over_single() {
        assert_eq!(
            kinds("a <= b && !c"),
            vec![
                Token::Ident("a".to_string()),
                Token::Le,
                Token::Ident("b".to_string()),
                Token::AndAnd,
                Token::Bang,
                Token::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = tokenize("X == \"EUR").unwrap_err();
        assert!(matches!(err, FormulaError::Syntax { pos: 5, .. }));
    }

    #[test]
    fn single_ampersand_is_rejected() {
        assert!(tokenize("a & b").is_err());
    }
}
