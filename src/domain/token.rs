//! Token definitions for Kuri source.

use crate::domain::span::{Position, SourceRange};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    EqEq,
    NotEq,
    Gt,
    Lt,
    Ge,
    Le,
    LParen,
    RParen,
    Comma,
    And,
    Or,
    If,
    Else,
    Eof,
}

impl TokenKind {
    /// The kind for a reserved word, if `word` is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "and" => Some(TokenKind::And),
            "or" => Some(TokenKind::Or),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Assign => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Gt => "'>'",
            TokenKind::Lt => "'<'",
            TokenKind::Ge => "'>='",
            TokenKind::Le => "'<='",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token; for strings, the unescaped contents.
    pub literal: String,
    pub line: usize,
    pub column: usize,
    /// Number of source characters the token spans.
    pub width: usize,
}

impl Token {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn range(&self) -> SourceRange {
        SourceRange::spanning(self.position(), self.width)
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number => format!("'{}'", self.literal),
            TokenKind::String => format!("string \"{}\"", self.literal),
            _ => self.kind.to_string(),
        }
    }
}
