//! Register-description parser
//!
//! Line-oriented recursive descent over the token stream, driving
//! [`ChipBuilder`] so structural invariants are checked as declarations
//! arrive. Addresses are taken verbatim from the source, never auto-assigned;
//! declaration order is preserved for dedup tie-breaking.

use crate::error::{ParseError, Result};
use crate::lexer::Token;
use busmap_spec::{Access, Chip, ChipBuilder, MAX_FIELD_BITS};
use logos::Logos;

/// Parse a register description into a chip model.
pub fn parse(source: &str) -> Result<Chip> {
    let lines = lex_lines(source)?;
    let mut builder: Option<ChipBuilder> = None;

    for line in &lines {
        let mut cur = Cursor::new(line);
        let keyword = cur.expect_name("directive")?;
        match keyword.as_str() {
            "chip" => {
                let name = cur.expect_name("chip name")?;
                cur.expect_end()?;
                if builder.is_some() {
                    return Err(cur.syntax("duplicate `chip` declaration"));
                }
                builder = Some(ChipBuilder::new(&name));
            }
            "page" => {
                let name = cur.expect_name("page name")?;
                let address = cur.expect_byte("page address")?;
                cur.expect_end()?;
                let builder = builder
                    .as_mut()
                    .ok_or_else(|| cur.syntax("`page` before `chip` declaration"))?;
                builder
                    .begin_page(&name, address)
                    .map_err(|source| ParseError::Model {
                        line: line.number,
                        source,
                    })?;
            }
            "reg" => parse_register(&mut cur, builder.as_mut(), line.number)?,
            "field" => parse_field(&mut cur, builder.as_mut(), line.number)?,
            other => {
                return Err(cur.syntax(format!("unknown directive `{other}`")));
            }
        }
    }

    builder
        .map(ChipBuilder::finish)
        .ok_or(ParseError::Syntax {
            line: 1,
            message: "missing `chip` declaration".to_string(),
        })
}

fn parse_register(
    cur: &mut Cursor<'_>,
    builder: Option<&mut ChipBuilder>,
    line: usize,
) -> Result<()> {
    let builder = builder
        .filter(|b| b.has_open_page())
        .ok_or(ParseError::RegisterOutsidePage { line })?;

    let name = cur.expect_name("register name")?;
    let offset = cur.expect_byte("register offset")?;

    let mut width = 1u8;
    let mut defaults = Vec::new();
    while let Some(token) = cur.next() {
        match token.name() {
            Some("width") => {
                let value = cur.expect_number("register width")?;
                if value == 0 || value > 255 {
                    return Err(cur.syntax(format!("invalid register width {value}")));
                }
                width = value as u8;
            }
            Some("default") => {
                // All remaining numbers are default bytes, low byte first.
                while cur.peek().is_some_and(|t| t.number().is_some()) {
                    defaults.push(cur.expect_byte("default byte")? );
                }
                if defaults.is_empty() {
                    return Err(cur.syntax("`default` requires at least one byte"));
                }
            }
            _ => return Err(cur.syntax(format!("unexpected token {token:?} in `reg` line"))),
        }
    }

    builder
        .begin_register(&name, offset, width, defaults)
        .map(|_| ())
        .map_err(|source| ParseError::Model { line, source })
}

fn parse_field(
    cur: &mut Cursor<'_>,
    builder: Option<&mut ChipBuilder>,
    line: usize,
) -> Result<()> {
    let builder = builder
        .filter(|b| b.has_open_register())
        .ok_or(ParseError::FieldOutsideRegister { line })?;

    let name = cur.expect_name("field name")?;
    let (lsb, width) = parse_bit_range(cur)?;

    let mut access = Access::ReadWrite;
    let mut aliased = false;
    let mut default = None;
    while let Some(token) = cur.next() {
        match token.name() {
            Some("ro") => access = Access::ReadOnly,
            Some("wo") => access = Access::WriteOnly,
            Some("rw") => access = Access::ReadWrite,
            Some("alias") => aliased = true,
            Some("default") => default = Some(cur.expect_number("field default")?),
            _ => return Err(cur.syntax(format!("unexpected token {token:?} in `field` line"))),
        }
    }

    builder
        .add_field(&name, lsb, width, access, default, aliased)
        .map(|_| ())
        .map_err(|source| ParseError::Model { line, source })
}

/// `bits[lo]` or `bits[lo:hi]`, `lo` being the LSB position.
fn parse_bit_range(cur: &mut Cursor<'_>) -> Result<(u16, u8)> {
    match cur.next() {
        Some(Token::Ident(kw)) if kw == "bits" => {}
        _ => return Err(cur.syntax("expected `bits[lo]` or `bits[lo:hi]`")),
    }
    cur.expect_token(&Token::LBracket, "`[`")?;
    let lo = cur.expect_number("bit position")?;
    let hi = if cur.peek() == Some(&Token::Colon) {
        cur.next();
        cur.expect_number("bit position")?
    } else {
        lo
    };
    cur.expect_token(&Token::RBracket, "`]`")?;

    if hi < lo {
        return Err(cur.syntax(format!("bit range [{lo}:{hi}] must be [low:high]")));
    }
    if lo > 2047 {
        return Err(cur.syntax(format!("bit position {lo} out of range")));
    }
    let width = hi - lo + 1;
    if width > MAX_FIELD_BITS as u64 {
        return Err(cur.syntax(format!("field is {width} bits wide, maximum is {MAX_FIELD_BITS}")));
    }
    Ok((lo as u16, width as u8))
}

struct Line {
    number: usize,
    tokens: Vec<Token>,
}

fn lex_lines(source: &str) -> Result<Vec<Line>> {
    let mut lexer = Token::lexer(source);
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut number = 1;

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Newline) => {
                if !current.is_empty() {
                    lines.push(Line {
                        number,
                        tokens: std::mem::take(&mut current),
                    });
                }
                number += 1;
            }
            Ok(token) => current.push(token),
            Err(()) => {
                return Err(ParseError::Lex {
                    line: number,
                    fragment: lexer.slice().to_string(),
                });
            }
        }
    }
    if !current.is_empty() {
        lines.push(Line {
            number,
            tokens: current,
        });
    }
    Ok(lines)
}

struct Cursor<'a> {
    line: usize,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a Line) -> Self {
        Cursor {
            line: line.number,
            tokens: &line.tokens,
            pos: 0,
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn expect_name(&mut self, what: &str) -> Result<String> {
        match self.next().and_then(Token::name) {
            Some(name) => Ok(name.to_string()),
            None => Err(self.syntax(format!("expected {what}"))),
        }
    }

    fn expect_number(&mut self, what: &str) -> Result<u64> {
        match self.next().and_then(Token::number) {
            Some(value) => Ok(value),
            None => Err(self.syntax(format!("expected {what}"))),
        }
    }

    fn expect_byte(&mut self, what: &str) -> Result<u8> {
        let value = self.expect_number(what)?;
        if value > 0xFF {
            return Err(self.syntax(format!("{what} {value:#x} does not fit in one byte")));
        }
        Ok(value as u8)
    }

    fn expect_token(&mut self, token: &Token, what: &str) -> Result<()> {
        match self.next() {
            Some(found) if found == token => Ok(()),
            _ => Err(self.syntax(format!("expected {what}"))),
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.syntax(format!("unexpected trailing token {token:?}"))),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }
}
