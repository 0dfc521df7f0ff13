//! Kuri lexer.
//!
//! Converts source text to a token stream terminated by a single `Eof` token.
//! Lines and columns are 1-based; a newline increments the line and resets
//! the column. `//` comments run to end of line and produce no tokens.
//! Two-character operators are matched before single-character ones.

use crate::domain::error::{LexError, LexErrorKind};
use crate::domain::span::Position;
use crate::domain::token::{Token, TokenKind};

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek_second() == Some('/') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn token(&self, kind: TokenKind, literal: impl Into<String>, start: Position) -> Token {
        let width = if start.line == self.line {
            self.column - start.column
        } else {
            1
        };
        Token {
            kind,
            literal: literal.into(),
            line: start.line,
            column: start.column,
            width,
        }
    }

    fn error(&self, kind: LexErrorKind, message: String, position: Position) -> LexError {
        LexError {
            kind,
            message,
            position,
        }
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.position();
        let from = self.pos;
        while let Some(ch) = self.peek() {
            let continues = ch.is_alphanumeric()
                || ch == '_'
                || (ch == '.'
                    && self
                        .peek_second()
                        .map(|c| c.is_alphabetic() || c == '_')
                        .unwrap_or(false));
            if !continues {
                break;
            }
            self.advance();
        }
        let word = &self.input[from..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.token(kind, word, start)
    }

    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        let from = self.pos;
        let mut dots = 0;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.' {
                dots += 1;
                self.advance();
            } else if ch.is_alphanumeric() || ch == '_' {
                // "12abc": swallow the rest of the word so the message shows it.
                while let Some(c) = self.peek() {
                    if c.is_alphanumeric() || c == '_' || c == '.' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                let text = &self.input[from..self.pos];
                return Err(self.error(
                    LexErrorKind::InvalidNumber,
                    format!("invalid number '{}'", text),
                    start,
                ));
            } else {
                break;
            }
        }

        let text = &self.input[from..self.pos];
        if dots > 1 || text.ends_with('.') {
            return Err(self.error(
                LexErrorKind::InvalidNumber,
                format!("invalid number '{}'", text),
                start,
            ));
        }
        match text.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(self.token(TokenKind::Number, text, start)),
            _ => Err(self.error(
                LexErrorKind::InvalidNumber,
                format!("invalid number '{}'", text),
                start,
            )),
        }
    }

    fn lex_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position();
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(self.error(
                        LexErrorKind::UnterminatedString,
                        "unterminated string literal".to_string(),
                        start,
                    ));
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some(c @ ('"' | '\'' | '\\')) => value.push(c),
                        Some(c) => {
                            value.push('\\');
                            value.push(c);
                        }
                        None => {
                            return Err(self.error(
                                LexErrorKind::UnterminatedString,
                                "unterminated string literal".to_string(),
                                start,
                            ));
                        }
                    }
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }
        Ok(self.token(TokenKind::String, value, start))
    }

    fn lex_operator(&mut self, ch: char) -> Result<Token, LexError> {
        let start = self.position();
        let two = match (ch, self.peek_second()) {
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::NotEq),
            ('>', Some('=')) => Some(TokenKind::Ge),
            ('<', Some('=')) => Some(TokenKind::Le),
            _ => None,
        };
        if let Some(kind) = two {
            let literal = &self.input[self.pos..self.pos + 2];
            self.advance();
            self.advance();
            return Ok(self.token(kind, literal, start));
        }

        let kind = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Assign,
            '>' => TokenKind::Gt,
            '<' => TokenKind::Lt,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            _ => {
                return Err(self.error(
                    LexErrorKind::IllegalCharacter,
                    format!("illegal character '{}'", ch),
                    start,
                ));
            }
        };
        self.advance();
        Ok(self.token(kind, ch.to_string(), start))
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.position();
        match self.peek() {
            None => Ok(Token {
                kind: TokenKind::Eof,
                literal: String::new(),
                line: start.line,
                column: start.column,
                width: 0,
            }),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(self.lex_identifier()),
            Some(ch) if ch.is_ascii_digit() => self.lex_number(),
            Some(ch @ ('"' | '\'')) => self.lex_string(ch),
            Some(ch) => self.lex_operator(ch),
        }
    }
}

/// Tokenize `source`. The result always ends with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    tracing::debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn assignment_with_call() {
        assert_eq!(
            kinds("x = sma(close, 5)"),
            vec![
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(
            kinds(">= <= == != > < ="),
            vec![
                TokenKind::Ge,
                TokenKind::Le,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Gt,
                TokenKind::Lt,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn reserved_words() {
        assert_eq!(
            kinds("a and b or c if else"),
            vec![
                TokenKind::Identifier,
                TokenKind::And,
                TokenKind::Identifier,
                TokenKind::Or,
                TokenKind::Identifier,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dotted_identifier_is_one_token() {
        let tokens = tokenize("strategy.entry(").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].literal, "strategy.entry");
        assert_eq!(tokens[1].kind, TokenKind::LParen);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("// header\nx = 1 // trailing\n").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].literal, "x");
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("a = 1\n  bb = 22").unwrap();
        let bb = &tokens[3];
        assert_eq!(bb.literal, "bb");
        assert_eq!((bb.line, bb.column), (2, 3));
        assert_eq!(bb.width, 2);
        let n = &tokens[5];
        assert_eq!((n.line, n.column), (2, 8));
    }

    #[test]
    fn decimal_numbers() {
        let tokens = tokenize("3.25 10").unwrap();
        assert_eq!(tokens[0].literal, "3.25");
        assert_eq!(tokens[1].literal, "10");
    }

    #[test]
    fn string_literals_unescape() {
        let tokens = tokenize(r#"plot(x, "Fast \"EMA\"", '#ff0000')"#).unwrap();
        assert_eq!(tokens[4].kind, TokenKind::String);
        assert_eq!(tokens[4].literal, "Fast \"EMA\"");
        assert_eq!(tokens[6].literal, "#ff0000");
    }

    #[test]
    fn illegal_character_reports_position() {
        let err = tokenize("x = 1\ny = $").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::IllegalCharacter);
        assert_eq!(err.position, Position::new(2, 5));
    }

    #[test]
    fn lone_bang_is_illegal() {
        let err = tokenize("a ! b").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::IllegalCharacter);
    }

    #[test]
    fn unterminated_string() {
        let err = tokenize("plot(x, \"oops)").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.position, Position::new(1, 9));
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(
            tokenize("1.2.3").unwrap_err().kind,
            LexErrorKind::InvalidNumber
        );
        assert_eq!(tokenize("7.").unwrap_err().kind, LexErrorKind::InvalidNumber);
        let err = tokenize("x = 12abc").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidNumber);
        assert!(err.message.contains("12abc"));
    }

    #[test]
    fn overflowing_number_is_invalid() {
        let src = format!("x = 1{}", "0".repeat(400));
        assert_eq!(tokenize(&src).unwrap_err().kind, LexErrorKind::InvalidNumber);
    }

    #[test]
    fn deep_bracket_runs_lex_flat() {
        let tokens = tokenize(&"(".repeat(50_000)).unwrap();
        assert_eq!(tokens.len(), 50_001);
        assert_eq!(tokens[49_999].column, 50_000);
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("   // nothing\n"), vec![TokenKind::Eof]);
    }
}
