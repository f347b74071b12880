//! Lexer for the test-script language

use logos::Logos;

/// Script tokens. Newlines are insignificant; blocks are brace-delimited.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    #[token("fn")]
    Fn,

    #[token("let")]
    Let,

    #[token("if")]
    If,

    #[token("else")]
    Else,

    #[token("repeat")]
    Repeat,

    /// Identifier (path segments, variables)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Hexadecimal number
    #[regex(r"0x[0-9a-fA-F]+", |lex| u64::from_str_radix(&lex.slice()[2..], 16).ok())]
    Hex(u64),

    /// Binary number
    #[regex(r"0b[01]+", |lex| u64::from_str_radix(&lex.slice()[2..], 2).ok())]
    Binary(u64),

    /// Decimal number
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Number(u64),

    #[token(".")]
    Dot,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("=")]
    Assign,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    #[token("&")]
    Amp,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,
}

impl Token {
    pub fn number(&self) -> Option<u64> {
        match self {
            Token::Hex(n) | Token::Binary(n) | Token::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Lex a script, attaching the 1-based source line to every token.
pub fn lex(source: &str) -> Result<Vec<(Token, usize)>, crate::error::ScriptError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let line = source[..lexer.span().start].matches('\n').count() + 1;
        match result {
            Ok(token) => tokens.push((token, line)),
            Err(()) => {
                return Err(crate::error::ScriptError::Lex {
                    line,
                    fragment: lexer.slice().to_string(),
                });
            }
        }
    }
    Ok(tokens)
}
