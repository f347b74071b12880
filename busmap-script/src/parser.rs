//! Script parser
//!
//! Recursive descent over the token stream into the [`crate::ast`] IR.
//! Expressions use precedence climbing: comparisons bind loosest, then `|`,
//! `^`, `&`, shifts, and `+`/`-`.

use crate::ast::{BinOp, Expr, FieldPath, Function, Script, Stmt};
use crate::error::{Result, ScriptError};
use crate::lexer::{lex, Token};

/// Parse a complete script. All-or-nothing: any syntax error aborts without
/// returning a partial IR.
pub fn parse(source: &str) -> Result<Script> {
    let mut parser = Parser {
        tokens: lex(source)?,
        pos: 0,
    };
    let mut functions = Vec::new();
    while !parser.at_end() {
        functions.push(parser.function()?);
    }
    Ok(Script { functions })
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<usize> {
        match self.advance() {
            Some((found, line)) if found == token => Ok(line),
            Some((found, line)) => Err(ScriptError::Syntax {
                line,
                message: format!("expected {what}, found {found:?}"),
            }),
            None => Err(ScriptError::UnexpectedEof {
                expected: what.to_string(),
            }),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, usize)> {
        match self.advance() {
            Some((Token::Ident(name), line)) => Ok((name, line)),
            Some((found, line)) => Err(ScriptError::Syntax {
                line,
                message: format!("expected {what}, found {found:?}"),
            }),
            None => Err(ScriptError::UnexpectedEof {
                expected: what.to_string(),
            }),
        }
    }

    fn syntax(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }

    // ---- grammar ----

    fn function(&mut self) -> Result<Function> {
        let line = self.expect(Token::Fn, "`fn`")?;
        let (name, _) = self.expect_ident("function name")?;
        let body = self.block()?;
        Ok(Function { name, line, body })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(Token::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        loop {
            if self.eat(&Token::RBrace) {
                return Ok(stmts);
            }
            if self.at_end() {
                return Err(ScriptError::UnexpectedEof {
                    expected: "`}`".to_string(),
                });
            }
            stmts.push(self.statement()?);
        }
    }

    fn statement(&mut self) -> Result<Stmt> {
        match self.peek() {
            Some(Token::Let) => {
                let line = self.expect(Token::Let, "`let`")?;
                let (name, _) = self.expect_ident("variable name")?;
                self.expect(Token::Assign, "`=`")?;
                let value = self.expression()?;
                Ok(Stmt::Let { name, value, line })
            }
            Some(Token::If) => {
                let line = self.expect(Token::If, "`if`")?;
                let cond = self.expression()?;
                let then_body = self.block()?;
                let else_body = if self.eat(&Token::Else) {
                    self.block()?
                } else {
                    Vec::new()
                };
                Ok(Stmt::If {
                    cond,
                    then_body,
                    else_body,
                    line,
                })
            }
            Some(Token::Repeat) => {
                let line = self.expect(Token::Repeat, "`repeat`")?;
                let count = self.expression()?;
                let body = self.block()?;
                Ok(Stmt::Repeat { count, body, line })
            }
            Some(Token::Ident(_)) => self.call_statement(),
            Some(other) => Err(self.syntax(format!("expected a statement, found {other:?}"))),
            None => Err(ScriptError::UnexpectedEof {
                expected: "statement".to_string(),
            }),
        }
    }

    fn call_statement(&mut self) -> Result<Stmt> {
        let (page, line) = self.expect_ident("page name")?;
        let (path, op) = self.finish_path(page, line)?;
        match op.as_str() {
            "write" => {
                self.expect(Token::LParen, "`(`")?;
                let value = self.expression()?;
                self.expect(Token::RParen, "`)`")?;
                Ok(Stmt::Write { path, value, line })
            }
            "read" => {
                self.expect(Token::LParen, "`(`")?;
                self.expect(Token::RParen, "`)`")?;
                Ok(Stmt::Read { path, line })
            }
            other => Err(self.syntax(format!("expected `read` or `write`, found `{other}`"))),
        }
    }

    /// Consume `.register.field.op` after the page segment.
    fn finish_path(&mut self, page: String, line: usize) -> Result<(FieldPath, String)> {
        self.expect(Token::Dot, "`.`")?;
        let (register, _) = self.expect_ident("register name")?;
        self.expect(Token::Dot, "`.`")?;
        let (field, _) = self.expect_ident("field name")?;
        self.expect(Token::Dot, "`.`")?;
        let (op, _) = self.expect_ident("`read` or `write`")?;
        Ok((
            FieldPath {
                page,
                register,
                field,
                line,
            },
            op,
        ))
    }

    fn expression(&mut self) -> Result<Expr> {
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.bit_or()?;
        while let Some(op) = self.match_op(&[
            (Token::EqEq, BinOp::Eq),
            (Token::NotEq, BinOp::Ne),
            (Token::LtEq, BinOp::Le),
            (Token::GtEq, BinOp::Ge),
            (Token::Lt, BinOp::Lt),
            (Token::Gt, BinOp::Gt),
        ]) {
            let rhs = self.bit_or()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn bit_or(&mut self) -> Result<Expr> {
        let mut expr = self.bit_xor()?;
        while let Some(op) = self.match_op(&[(Token::Pipe, BinOp::Or)]) {
            let rhs = self.bit_xor()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn bit_xor(&mut self) -> Result<Expr> {
        let mut expr = self.bit_and()?;
        while let Some(op) = self.match_op(&[(Token::Caret, BinOp::Xor)]) {
            let rhs = self.bit_and()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn bit_and(&mut self) -> Result<Expr> {
        let mut expr = self.shift()?;
        while let Some(op) = self.match_op(&[(Token::Amp, BinOp::And)]) {
            let rhs = self.shift()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn shift(&mut self) -> Result<Expr> {
        let mut expr = self.additive()?;
        while let Some(op) = self.match_op(&[(Token::Shl, BinOp::Shl), (Token::Shr, BinOp::Shr)]) {
            let rhs = self.additive()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut expr = self.primary()?;
        while let Some(op) = self.match_op(&[(Token::Plus, BinOp::Add), (Token::Minus, BinOp::Sub)])
        {
            let rhs = self.primary()?;
            expr = binary(op, expr, rhs);
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some((token, line)) => {
                if let Some(value) = token.number() {
                    return Ok(Expr::Number(value));
                }
                match token {
                    Token::LParen => {
                        let expr = self.expression()?;
                        self.expect(Token::RParen, "`)`")?;
                        Ok(expr)
                    }
                    Token::Ident(name) => {
                        if self.peek() == Some(&Token::Dot) {
                            let (path, op) = self.finish_path(name, line)?;
                            if op != "read" {
                                return Err(self.syntax(format!(
                                    "only `read()` may appear in an expression, found `{op}`"
                                )));
                            }
                            self.expect(Token::LParen, "`(`")?;
                            self.expect(Token::RParen, "`)`")?;
                            Ok(Expr::Read(path))
                        } else {
                            Ok(Expr::Var { name, line })
                        }
                    }
                    other => Err(ScriptError::Syntax {
                        line,
                        message: format!("expected an expression, found {other:?}"),
                    }),
                }
            }
            None => Err(ScriptError::UnexpectedEof {
                expected: "expression".to_string(),
            }),
        }
    }

    fn match_op(&mut self, table: &[(Token, BinOp)]) -> Option<BinOp> {
        for (token, op) in table {
            if self.eat(token) {
                return Some(*op);
            }
        }
        None
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_write_and_read() {
        let script = parse(
            "fn init {\n  AG.control.i2c_audio_format.write(0x3)\n  AG.control.power_down.read()\n}\n",
        )
        .unwrap();
        assert_eq!(script.functions.len(), 1);
        let body = &script.functions[0].body;
        assert_eq!(body.len(), 2);
        match &body[0] {
            Stmt::Write { path, value, line } => {
                assert_eq!(path.dotted(), "AG.control.i2c_audio_format");
                assert_eq!(*value, Expr::Number(3));
                assert_eq!(*line, 2);
            }
            other => panic!("expected write, got {other:?}"),
        }
        assert!(matches!(&body[1], Stmt::Read { line: 3, .. }));
    }

    #[test]
    fn test_parse_let_if_repeat() {
        let source = "\
fn cond {
    let mode = AG.control.power_down.read()
    if mode == 1 {
        AG.control.power_down.write(0)
    } else {
        AG.control.power_down.write(1)
    }
    repeat 3 {
        PLL.div.ratio.write(0x20)
    }
}
";
        let script = parse(source).unwrap();
        let body = &script.functions[0].body;
        assert!(matches!(&body[0], Stmt::Let { name, .. } if name == "mode"));
        match &body[1] {
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        }
        match &body[2] {
            Stmt::Repeat { count, body, .. } => {
                assert_eq!(*count, Expr::Number(3));
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected repeat, got {other:?}"),
        }
    }

    #[test]
    fn test_expression_precedence() {
        // `1 | 2 == 3` parses as `(1 | 2) == 3`
        let script = parse("fn f {\n  let x = 1 | 2 == 3\n}\n").unwrap();
        let Stmt::Let { value, .. } = &script.functions[0].body[0] else {
            panic!("expected let");
        };
        match value {
            Expr::Binary { op: BinOp::Eq, lhs, .. } => {
                assert!(matches!(**lhs, Expr::Binary { op: BinOp::Or, .. }));
            }
            other => panic!("expected comparison at the top, got {other:?}"),
        }
    }

    #[test]
    fn test_shift_binds_tighter_than_and() {
        // `3 & 1 << 2` parses as `3 & (1 << 2)`
        let script = parse("fn f {\n  let x = 3 & 1 << 2\n}\n").unwrap();
        let Stmt::Let { value, .. } = &script.functions[0].body[0] else {
            panic!("expected let");
        };
        match value {
            Expr::Binary { op: BinOp::And, rhs, .. } => {
                assert!(matches!(**rhs, Expr::Binary { op: BinOp::Shl, .. }));
            }
            other => panic!("expected `&` at the top, got {other:?}"),
        }
    }

    #[test]
    fn test_write_in_expression_is_rejected() {
        let err = parse("fn f {\n  let x = AG.a.b.write(1)\n}\n").unwrap_err();
        assert!(err.to_string().contains("only `read()`"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("fn f {\n  AG.a.b.write(1)\n").unwrap_err();
        assert!(matches!(err, ScriptError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_two_segment_path_is_rejected() {
        let err = parse("fn f {\n  AG.reset.write(1)\n}\n").unwrap_err();
        assert!(err.to_string().contains("expected"));
    }
}
