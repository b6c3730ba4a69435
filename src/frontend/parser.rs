use crossbeam_channel::{Receiver, Sender};

use super::ast::{Expr, Stmt};
use super::token::{Token, TokenType};
use crate::error::ParserError;

/// How deep expressions may nest before parsing gives up
const MAX_DEPTH: usize = 200;

pub struct Parser {
    /// The current token being parsed, received from the channel
    current: Token,
    /// The previous token received from the channel
    previous: Token,
    /// The channel that receives tokens concurrently
    recv: Receiver<Token>,
    /// The channel to send statements concurrently
    sender: Sender<Stmt>,
    /// Errors encountered while parsing
    errors: Vec<ParserError>,
    /// Current expression nesting
    depth: usize,
}

macro_rules! expect {
    ($self: expr, $kind: expr, $msg: expr) => {
        if $self.check_current($kind) {
            $self.advance();
        } else {
            return Err($msg);
        }
    };
}

impl Parser {
    pub fn new(token_recv: Receiver<Token>, output_sender: Sender<Stmt>) -> Self {
        let current = Parser::receive(&token_recv, (1, 1));
        Parser {
            current: current.clone(),
            previous: current,
            recv: token_recv,
            sender: output_sender,
            errors: vec![],
            depth: 0,
        }
    }

    /// Parses tokens into statements, returning the errors encountered
    pub fn parse(mut self) -> Vec<ParserError> {
        loop {
            while self.does_match(&[TokenType::Newline, TokenType::SColon]) {}
            if self.is_end() {
                break;
            }

            // a failed statement may leave levels entered
            self.depth = 0;
            match self.statement() {
                Ok(stmt) => {
                    if self.sender.send(stmt).is_err() {
                        self.add_error("unable to send statement");
                        break;
                    }
                }
                Err(msg) => {
                    self.add_error(msg);
                    self.synchronize();
                }
            }
        }
        self.errors
    }

    fn statement(&mut self) -> Result<Stmt, &'static str> {
        let token = self.current.clone();

        let stmt = if self.does_match(&[TokenType::Print]) {
            let values = if self.does_match(&[TokenType::LParen]) {
                // print(a, b)
                let values = self.arguments()?;
                expect!(self, TokenType::RParen, "expected ')'");
                values
            } else if self.is_statement_end() {
                vec![]
            } else {
                // print a, b
                let mut values = vec![self.expression()?];
                while self.does_match(&[TokenType::Comma]) {
                    values.push(self.expression()?);
                }
                values
            };
            for value in &values {
                self.reject_underscore(value)?;
            }
            Stmt::Print { token, values }
        } else {
            let expr = self.expression_list()?;
            if self.does_match(&[TokenType::Equal]) {
                let target = expr.to_target()?;
                let value = self.expression_list()?;
                if self.check_current(TokenType::Equal) {
                    return Err("chained assignment is not supported");
                }
                self.reject_underscore(&value)?;
                Stmt::Assign {
                    token,
                    target,
                    value,
                }
            } else {
                self.reject_underscore(&expr)?;
                Stmt::Expr { expr }
            }
        };

        if !self.is_statement_end() {
            return Err("expected end of statement");
        }
        Ok(stmt)
    }

    /// One expression, or a bare comma list that builds a tuple
    fn expression_list(&mut self) -> Result<Expr, &'static str> {
        let token = self.current.clone();
        let first = self.expression()?;
        if !self.check_current(TokenType::Comma) {
            return Ok(first);
        }

        let mut values = vec![Box::new(first)];
        while self.does_match(&[TokenType::Comma]) {
            if self.is_statement_end() || self.check_current(TokenType::Equal) {
                // trailing comma
                break;
            }
            values.push(Box::new(self.expression()?));
        }
        Ok(Expr::TupleLiteral { token, values })
    }

    fn expression(&mut self) -> Result<Expr, &'static str> {
        self.deeper()?;
        let expr = self.term();
        self.depth -= 1;
        expr
    }

    fn primary(&mut self) -> Result<Expr, &'static str> {
        if self.does_match(&[TokenType::True, TokenType::False]) {
            // Boolean
            let token = self.previous();
            let payload = token.kind == TokenType::True;
            Ok(Expr::BoolLiteral { token, payload })
        } else if self.does_match(&[TokenType::Underscore]) {
            // Underscore
            let token = self.previous();
            Ok(Expr::Underscore { token })
        } else if self.does_match(&[TokenType::None]) {
            // None
            let token = self.previous();
            Ok(Expr::NoneLiteral { token })
        } else if self.does_match(&[TokenType::Int, TokenType::Float]) {
            // Number
            let token = self.previous();
            if token.kind == TokenType::Int {
                match token.value.parse::<i64>() {
                    Ok(value) => Ok(Expr::IntegerLiteral { token, value }),
                    Err(_) => Err("invalid number"),
                }
            } else {
                match token.value.parse::<f64>() {
                    Ok(value) => Ok(Expr::FloatLiteral { token, value }),
                    Err(_) => Err("invalid number"),
                }
            }
        } else if self.does_match(&[TokenType::Str]) {
            // String
            let token = self.previous();
            Ok(Expr::StringLiteral {
                token: token.clone(),
                value: token.value,
            })
        } else if self.does_match(&[TokenType::Id]) {
            // identifier
            let token = self.previous();
            Ok(Expr::Variable { name: token })
        } else if self.does_match(&[TokenType::LParen]) {
            // grouping or tuple
            let token = self.previous();
            if self.does_match(&[TokenType::RParen]) {
                return Ok(Expr::TupleLiteral {
                    token,
                    values: vec![],
                });
            }

            let first = self.expression()?;
            if self.does_match(&[TokenType::Comma]) {
                let mut values = vec![Box::new(first)];
                while !self.check_current(TokenType::RParen) && !self.is_end() {
                    values.push(Box::new(self.expression()?));
                    if !self.does_match(&[TokenType::Comma]) {
                        break;
                    }
                }
                expect!(self, TokenType::RParen, "expected ')'");
                Ok(Expr::TupleLiteral { token, values })
            } else {
                expect!(self, TokenType::RParen, "expected ')'");
                Ok(Expr::Group {
                    expr: Box::new(first),
                })
            }
        } else if self.does_match(&[TokenType::LBracket]) {
            // list literal
            let token = self.previous();
            let mut values: Vec<Box<Expr>> = vec![];
            while !self.check_current(TokenType::RBracket) && !self.is_end() {
                values.push(Box::new(self.expression()?));

                if self.check_current(TokenType::RBracket) || !self.does_match(&[TokenType::Comma])
                {
                    break;
                }
            }
            expect!(self, TokenType::RBracket, "expected ']'");
            Ok(Expr::ListLiteral { token, values })
        } else if self.check_current(TokenType::Print) {
            Err("print is a statement")
        } else {
            Err("unexpected token")
        }
    }

    /// Comma-separated expressions up to, not including, the closing ')'
    fn arguments(&mut self) -> Result<Vec<Expr>, &'static str> {
        let mut args = vec![];
        while !self.check_current(TokenType::RParen) && !self.is_end() {
            args.push(self.expression()?);
            if !self.does_match(&[TokenType::Comma]) {
                break;
            }
        }
        Ok(args)
    }

    fn call(&mut self) -> Result<Expr, &'static str> {
        let mut expr = self.primary()?;
        let mut links = 0;
        loop {
            if self.check_current(TokenType::LParen) || self.check_current(TokenType::LBracket) {
                self.deeper()?;
                links += 1;
            }
            if self.does_match(&[TokenType::LParen]) {
                // function call
                let args = self.arguments()?;
                expect!(self, TokenType::RParen, "expected ')'");
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args: args.into_iter().map(Box::new).collect(),
                    token: self.previous(),
                };
            } else if self.does_match(&[TokenType::LBracket]) {
                // index
                let token = self.previous();
                let index = self.expression()?;
                expect!(self, TokenType::RBracket, "expected ']'");
                expr = Expr::Index {
                    token,
                    expr: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                break;
            }
        }
        self.depth -= links;

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, &'static str> {
        if self.does_match(&[TokenType::Minus]) {
            let op = self.previous();
            self.deeper()?;
            let right = self.unary();
            self.depth -= 1;
            Ok(Expr::Unary {
                right: Box::new(right?),
                op,
            })
        } else {
            self.call()
        }
    }

    fn factor(&mut self) -> Result<Expr, &'static str> {
        let mut expr = self.unary()?;
        let mut links = 0;
        while self.does_match(&[TokenType::Div, TokenType::Mul, TokenType::Mod]) {
            self.deeper()?;
            links += 1;
            let op = self.previous();
            expr = Expr::Binary {
                left: Box::new(expr),
                right: Box::new(self.unary()?),
                op,
            };
        }
        self.depth -= links;
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, &'static str> {
        let mut expr = self.factor()?;
        let mut links = 0;
        while self.does_match(&[TokenType::Minus, TokenType::Plus]) {
            self.deeper()?;
            links += 1;
            let op = self.previous();
            expr = Expr::Binary {
                left: Box::new(expr),
                right: Box::new(self.factor()?),
                op,
            };
        }
        self.depth -= links;
        Ok(expr)
    }

    /// Enters one more level of nesting; operator, call and index links count too
    fn deeper(&mut self) -> Result<(), &'static str> {
        if self.depth >= MAX_DEPTH {
            return Err("expression is too deeply nested");
        }
        self.depth += 1;
        Ok(())
    }

    /// `_` only makes sense on the left of `=`
    fn reject_underscore(&self, expr: &Expr) -> Result<(), &'static str> {
        match expr.find_underscore() {
            Some(_) => Err("'_' can only be used as an assignment target"),
            None => Ok(()),
        }
    }

    /// Checks if the current token is in the given types
    fn does_match(&mut self, these: &[TokenType]) -> bool {
        for kind in these {
            if self.check_current(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    /// Advances one token
    fn advance(&mut self) {
        if !self.is_end() {
            let next = Parser::receive(&self.recv, self.current.position);
            self.previous = std::mem::replace(&mut self.current, next);
        }
    }

    /// Receives the next token; a closed channel reads as the end of input
    fn receive(recv: &Receiver<Token>, position: (usize, usize)) -> Token {
        recv.recv()
            .unwrap_or_else(|_| Token::eof(position.0, position.1))
    }

    /// Checks if the token type of the current token is the same as the expected token type
    fn check_current(&self, kind: TokenType) -> bool {
        self.current.kind == kind
    }

    /// Returns the previous token
    fn previous(&self) -> Token {
        self.previous.clone()
    }

    /// Checks if the end is reached
    fn is_end(&self) -> bool {
        self.current.kind == TokenType::EOF
    }

    fn is_statement_end(&self) -> bool {
        matches!(
            self.current.kind,
            TokenType::Newline | TokenType::SColon | TokenType::EOF
        )
    }

    /// Appends the error created with the given error message and the current line and column
    fn add_error(&mut self, message: &str) {
        let error = ParserError::new(message, self.current.position.0, self.current.position.1);
        self.errors.push(error);
    }

    /// Discards tokens until the start of the next statement
    fn synchronize(&mut self) {
        while !self.is_end() && !self.is_statement_end() {
            self.advance();
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use crate::frontend::ast::Stmt;
    use crate::parse;

    #[test]
    fn test_parser() {
        let source = r#"# Example 2
data = ['ACME', 50, 91.1, (2012, 12, 21)]
name, shares, price, date = data
print name
print(date)

name, shares, price, (year, mon, day) = data
print name; print year
"#;
        let expected = r#"(assign data (list "ACME" 50 91.1 (tuple 2012 12 21)))
(assign (targets name shares price date) data)
(print name)
(print date)
(assign (targets name shares price (targets year mon day)) data)
(print name)
(print year)"#;

        parse!(source, expected);
    }

    #[test]
    fn discard_targets() {
        let source = "_, shares, price, _ = data";
        let expected = "(assign (targets _ shares price _) data)";
        parse!(source, expected);
    }

    #[test]
    fn bracketed_and_parenthesized_targets() {
        let source = "[a, (b, c)] = x\n(d, e) = 1, 2\n(f) = 3";
        let expected = "(assign (targets a (targets b c)) x)
(assign (targets d e) (tuple 1 2))
(assign f 3)";
        parse!(source, expected);
    }

    #[test]
    fn tuple_forms() {
        let source = "t = ()\nt = (1,)\nt = 1,\nt = (1)";
        let expected = "(assign t (tuple))
(assign t (tuple 1))
(assign t (tuple 1))
(assign t (1))";
        parse!(source, expected);
    }

    #[test]
    fn arithmetic_precedence() {
        let source = "x = -1 + 2 * s[0] % len(s)";
        let expected = "(assign x (Plus (Minus 1) (Mod (Mul 2 (index s 0)) (len s))))";
        parse!(source, expected);
    }

    #[test]
    fn print_forms() {
        let source = "print\nprint 1, 'a'\nprint(x, None, True)";
        let expected = "(print)
(print 1 \"a\")
(print x None True)";
        parse!(source, expected);
    }

    #[test]
    fn multiline_literal() {
        let source = "data = [ 'ACME', 50,\n         91.1, (2012, 12, 21) ]";
        let expected = r#"(assign data (list "ACME" 50 91.1 (tuple 2012 12 21)))"#;
        parse!(source, expected);
    }

    #[test]
    fn underscore_cannot_be_read() {
        let errors = crate::frontend::parse("x = _").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].message(),
            "'_' can only be used as an assignment target"
        );

        let errors = crate::frontend::parse("print(_)").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn invalid_targets() {
        let errors = crate::frontend::parse("x + 1 = 2\nlen(s) = 3\nok = 1").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.message() == "invalid assignment target"));
        assert_eq!((errors[1].line, errors[1].col), (2, 10));
    }

    #[test]
    fn recovers_at_next_line() {
        let errors = crate::frontend::parse("x = 1 +\ny = 3\nz = ]").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "unexpected token");
        assert_eq!((errors[0].line, errors[0].col), (1, 8));
        assert_eq!(errors[1].line, 3);
    }

    #[test]
    fn nesting_limit() {
        let source = format!("x = {}1{}", "(".repeat(1000), ")".repeat(1000));
        let errors = crate::frontend::parse(&source).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "expression is too deeply nested");

        let source = format!("x = {}1{}\ny = 2", "[".repeat(1000), "]".repeat(1000));
        assert_eq!(crate::frontend::parse(&source).unwrap_err().len(), 1);

        let source = format!("x = {}1", "-".repeat(1000));
        let errors = crate::frontend::parse(&source).unwrap_err();
        assert_eq!(errors[0].message(), "expression is too deeply nested");

        let source = ["1"; 1000].join(" + ");
        let errors = crate::frontend::parse(&format!("x = {}", source)).unwrap_err();
        assert_eq!(errors[0].message(), "expression is too deeply nested");

        let source = format!("x = {}1{}", "(".repeat(50), ")".repeat(50));
        assert!(crate::frontend::parse(&source).is_ok());
        let source = format!(
            "x = {}\nprint len('ab'){}",
            ["2"; 100].join(" * "),
            "[0]".repeat(50)
        );
        assert!(crate::frontend::parse(&source).is_ok());
    }

    #[test]
    fn statements_need_separators() {
        let errors = crate::frontend::parse("x = 1 y = 2").unwrap_err();
        assert_eq!(errors[0].message(), "expected end of statement");
        let stmts = crate::frontend::parse("x = 1; y = 2").unwrap();
        assert_eq!(Stmt::pretty_print(&stmts), "(assign x 1)\n(assign y 2)");
    }
}
