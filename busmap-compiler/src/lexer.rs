//! Lexer for the register-description language

use logos::Logos;

/// Tokens of the description language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip whitespace (not newlines)
#[logos(skip r"#[^\n]*")] // Skip comments
pub enum Token {
    /// Bare symbol name or keyword (`chip`, `page`, `reg`, `field`, ...)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Quoted symbol name, for vendor spellings the bare form cannot carry
    /// (spaces, slashes, leading digits); sanitized by the model.
    #[regex(r#""[^"\n]*""#, |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    Quoted(String),

    /// Hexadecimal number
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Hex(u64),

    /// Binary number
    #[regex(r"0b[01]+", |lex| u64::from_str_radix(&lex.slice()[2..], 2).ok())]
    Binary(u64),

    /// Decimal number
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Number(u64),

    /// Bit-range brackets
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    /// Bit-range separator
    #[token(":")]
    Colon,

    /// Newline (statement separator)
    #[regex(r"\n")]
    Newline,
}

impl Token {
    /// Numeric value if this token is any number literal.
    pub fn number(&self) -> Option<u64> {
        match self {
            Token::Hex(n) | Token::Binary(n) | Token::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Symbol text if this token can name a page/register/field.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Ident(s) | Token::Quoted(s) => Some(s),
            _ => None,
        }
    }
}
