//! Recursive-descent parser with panic-mode error recovery at statement boundaries.
//!
//! The grammar climbs precedence levels from `or` (lowest) to `unary` (highest); see the module
//! tests for the full table. Every binary operator is left-associative except assignment, which
//! is right-associative; unary operators are right-associative too (`!!x` parses as `!(!x)`).

use crate::ast::{BinaryOp, Expr, Literal, Program, Stmt, UnaryOp};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::token::{Token, TokenKind};

pub type ParseResult<T> = Result<T, Diagnostic>;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    /// Parse the whole token stream into a [`Program`]. Returns the first [`Diagnostic`]
    /// encountered; panic-mode recovery only suppresses cascading noise, it never changes which
    /// error is ultimately reported.
    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        let mut first_error = None;

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(diagnostic) => {
                    if first_error.is_none() {
                        first_error = Some(diagnostic);
                    }
                    self.synchronize();
                }
            }
        }

        match first_error {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(Program::new(statements)),
        }
    }

    // ----- token stream helpers -----

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(DiagnosticKind::SyntaxError, message, self.peek().position)
    }

    /// Panic-mode recovery: skip tokens until the next `SEMICOLON` is consumed or a
    /// statement-starting keyword is next.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Var
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ----- declarations and statements -----

    fn declaration(&mut self) -> ParseResult<Stmt> {
        if self.check(TokenKind::Var) {
            return self.var_decl();
        }
        if self.check(TokenKind::Function) {
            return self.fun_decl();
        }
        self.statement()
    }

    fn var_decl(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // VAR
        let name = self.expect(TokenKind::Identifier, "expected a variable name")?.text.clone();

        let initializer = if self.matches(&[TokenKind::Assign]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon, "expected ';' after variable declaration")?;
        Ok(Stmt::VarDecl {
            name,
            initializer,
            position,
        })
    }

    fn fun_decl(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // FUNCTION
        let name = self.expect(TokenKind::Identifier, "expected a function name")?.text.clone();

        self.expect(TokenKind::LParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.expect(TokenKind::Identifier, "expected a parameter name")?.text.clone());
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "expected ')' after parameters")?;

        self.expect(TokenKind::LBrace, "expected '{' before function body")?;
        let body = self.block_statements()?;

        Ok(Stmt::FunDecl {
            name,
            params,
            body,
            position,
        })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.peek().kind {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::LBrace => self.block(),
            _ => self.expr_statement(),
        }
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // IF
        self.expect(TokenKind::LParen, "expected '(' after 'if'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "expected ')' after if condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // WHILE
        self.expect(TokenKind::LParen, "expected '(' after 'while'")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "expected ')' after while condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While {
            condition,
            body,
            position,
        })
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // FOR
        self.expect(TokenKind::LParen, "expected '(' after 'for'")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.check(TokenKind::Var) {
            Some(Box::new(self.var_decl()?))
        } else {
            Some(Box::new(self.expr_statement()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after for-loop condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::RParen, "expected ')' after for clauses")?;

        let body = Box::new(self.statement()?);

        Ok(Stmt::For {
            initializer,
            condition,
            increment,
            body,
            position,
        })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // RETURN
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "expected ';' after return value")?;
        Ok(Stmt::Return { value, position })
    }

    fn block(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        self.advance(); // LBRACE
        let statements = self.block_statements()?;
        Ok(Stmt::Block { statements, position })
    }

    fn block_statements(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.expect(TokenKind::RBrace, "expected '}' after block")?;
        Ok(statements)
    }

    fn expr_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.peek().position;
        let expr = self.expression()?;
        self.expect(TokenKind::Semicolon, "expected ';' after expression")?;
        Ok(Stmt::ExprStmt { expr, position })
    }

    // ----- expressions, lowest to highest precedence -----

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Assign]) {
            let position = self.previous().position;
            let value = self.assignment()?;
            return match expr {
                Expr::Identifier { name, .. } => Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                    position,
                }),
                _ => Err(Diagnostic::new(
                    DiagnosticKind::SyntaxError,
                    "Invalid assignment target",
                    position,
                )),
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[TokenKind::Or]) {
            let position = self.previous().position;
            let right = self.and()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: BinaryOp::Or,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let position = self.previous().position;
            let right = self.equality()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op: BinaryOp::And,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Equal, TokenKind::NotEqual], Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::Multiply, TokenKind::Divide, TokenKind::Modulo],
            Self::unary,
        )
    }

    /// Shared left-associative binary level: parse one `next` then fold in `(op next)*`.
    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = next(self)?;
        while self.matches(operators) {
            let op_token = self.previous().kind;
            let position = self.previous().position;
            let op = BinaryOp::from_token(op_token).expect("matched operator token");
            let right = next(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                position,
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Not, TokenKind::Minus]) {
            let position = self.previous().position;
            let op = match self.previous().kind {
                TokenKind::Not => UnaryOp::Not,
                TokenKind::Minus => UnaryOp::Negate,
                _ => unreachable!(),
            };
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                position,
            });
        }
        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        while self.check(TokenKind::LParen) {
            let position = self.peek().position;
            self.advance();
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.expression()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "expected ')' after arguments")?;
            expr = Expr::Call {
                callee: Box::new(expr),
                args,
                position,
            };
        }
        Ok(expr)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        let position = token.position;
        match token.kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Boolean(true),
                    position,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Boolean(false),
                    position,
                })
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Null,
                    position,
                })
            }
            TokenKind::Number => {
                self.advance();
                // The lexeme is accepted as-is here; a malformed run like `1.2.3` is only
                // rejected once the compiler's NUMBER literal is actually converted at runtime.
                Ok(Expr::Literal {
                    value: Literal::Number(token.text),
                    position,
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::String(token.text),
                    position,
                })
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier {
                    name: token.text,
                    position,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "expected ')' after expression")?;
                Ok(expr)
            }
            TokenKind::Unknown => Err(Diagnostic::new(
                DiagnosticKind::LexicalError,
                format!("unrecognized character '{}'", token.text),
                position,
            )),
            _ => Err(self.error(format!("unexpected token '{}'", token.text))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang_table;
    use crate::lexer::{strip_newlines, Lexer};

    fn parse(source: &str) -> ParseResult<Program> {
        let lang = lang_table::lookup("en").unwrap();
        let tokens = strip_newlines(Lexer::new(source, lang).lex());
        Parser::new(tokens).parse_program()
    }

    #[test]
    fn parses_var_decl_with_initializer() {
        let program = parse("var x = 10;").unwrap();
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(program.statements[0], Stmt::VarDecl { .. }));
    }

    #[test]
    fn assignment_is_right_associative() {
        let program = parse("var a; var b; a = b = 1;").unwrap();
        let Stmt::ExprStmt { expr, .. } = &program.statements[2] else {
            panic!("expected expr stmt");
        };
        let Expr::Assign { name, value, .. } = expr else {
            panic!("expected assignment");
        };
        assert_eq!(name, "a");
        assert!(matches!(**value, Expr::Assign { .. }));
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let program = parse("var x = 1 - 2 - 3;").unwrap();
        let Stmt::VarDecl {
            initializer: Some(Expr::Binary { left, op: BinaryOp::Subtract, .. }),
            ..
        } = &program.statements[0]
        else {
            panic!("expected subtraction at the top");
        };
        // left side should itself be `1 - 2`, not `2 - 3`
        assert!(matches!(**left, Expr::Binary { op: BinaryOp::Subtract, .. }));
    }

    #[test]
    fn nested_unary_not_is_right_associative() {
        let program = parse("var x = !!y;").unwrap();
        let Stmt::VarDecl {
            initializer: Some(Expr::Unary { op: UnaryOp::Not, operand, .. }),
            ..
        } = &program.statements[0]
        else {
            panic!("expected outer not");
        };
        assert!(matches!(**operand, Expr::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn invalid_assignment_target_is_a_syntax_error() {
        let err = parse("var = 1;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::SyntaxError);
    }

    #[test]
    fn assignment_to_non_identifier_is_rejected() {
        let err = parse("var x; 1 + 1 = x;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::SyntaxError);
    }

    #[test]
    fn for_loop_parses_all_three_clauses() {
        let program = parse("for (var i = 0; i < 10; i = i + 1) { print(i); }").unwrap();
        assert!(matches!(program.statements[0], Stmt::For { .. }));
    }

    #[test]
    fn unknown_token_is_a_lexical_error_not_a_syntax_error() {
        let err = parse("var x = @;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::LexicalError);
    }

    #[test]
    fn panic_mode_reports_only_the_first_error() {
        // two syntax errors back to back; only the first should surface
        let err = parse("var = 1; var = 2;").unwrap_err();
        assert_eq!(err.position.line, 1);
    }
}
