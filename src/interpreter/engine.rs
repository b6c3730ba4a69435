use tracing::{debug, trace};

use super::destruct;
use super::scope::Scope;
use super::sink::Sink;
use super::value::Value;
use crate::error::{Error, ErrorKind, Result, RuntimeError};
use crate::frontend;
use crate::frontend::ast::{Expr, Stmt};
use crate::frontend::token::TokenType;

/// Executes parsed statements against one scope, writing `print` output to a sink
pub struct Engine<S: Sink> {
    // top level scope, preloaded with the builtins
    scope: Scope,
    sink: S,
}

impl<S: Sink> Engine<S> {
    pub fn new(sink: S) -> Self {
        Self {
            scope: Scope::with_builtins(),
            sink,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Parses and runs a script, stopping at the first runtime error
    pub fn run(&mut self, source: &str) -> Result<()> {
        let stmts = frontend::parse(source).map_err(Error::Parse)?;
        self.execute(&stmts)?;
        Ok(())
    }

    pub fn execute(&mut self, stmts: &[Stmt]) -> std::result::Result<(), RuntimeError> {
        for stmt in stmts {
            trace!(stmt = %stmt.print(), "executing");
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Stmt) -> std::result::Result<(), RuntimeError> {
        match stmt {
            Stmt::Expr { expr } => {
                self.evaluate(expr)?;
            }
            Stmt::Assign {
                token,
                target,
                value,
            } => {
                let value = self.evaluate(value)?;
                let bindings = destruct::assign(target, &value)
                    .map_err(|err| RuntimeError::new(err.into(), token.position))?;
                debug!(names = ?target.names(), "assigned");
                self.scope.commit(bindings);
            }
            Stmt::Print { token: _, values } => {
                let line = values
                    .iter()
                    .map(|v| self.evaluate(v).map(|v| v.string(false)))
                    .collect::<std::result::Result<Vec<String>, RuntimeError>>()?
                    .join(" ");
                self.sink.write_line(&line);
            }
        }
        Ok(())
    }

    fn evaluate(&self, expr: &Expr) -> std::result::Result<Value, RuntimeError> {
        match expr {
            Expr::Binary { left, right, op } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let result = match op.kind {
                    TokenType::Plus => &left + &right,
                    TokenType::Minus => &left - &right,
                    TokenType::Mul => &left * &right,
                    TokenType::Div => &left / &right,
                    TokenType::Mod => &left % &right,
                    _ => Err(ErrorKind::Type(format!("unknown operator {}", op.print()))),
                };
                result.map_err(|kind| RuntimeError::new(kind, op.position))
            }
            Expr::Group { expr } => self.evaluate(expr),
            Expr::Unary { right, op } => {
                let right = self.evaluate(right)?;
                (-&right).map_err(|kind| RuntimeError::new(kind, op.position))
            }
            Expr::StringLiteral { token: _, value } => Ok(Value::Str(value.clone())),
            Expr::FloatLiteral { token: _, value } => Ok(Value::Float(*value)),
            Expr::IntegerLiteral { token: _, value } => Ok(Value::Int(*value)),
            Expr::BoolLiteral { token: _, payload } => Ok(Value::Bool(*payload)),
            Expr::NoneLiteral { token: _ } => Ok(Value::None),
            // the parser rejects every read of `_`; this covers hand-built trees
            Expr::Underscore { token } => Err(RuntimeError::new(
                ErrorKind::Name(String::from("'_' can only be used as an assignment target")),
                token.position,
            )),
            Expr::TupleLiteral { token: _, values } => Ok(Value::Tuple(self.evaluate_all(values)?)),
            Expr::ListLiteral { token: _, values } => Ok(Value::List(self.evaluate_all(values)?)),
            Expr::Variable { name } => self
                .scope
                .get(&name.value)
                .cloned()
                .map_err(|msg| RuntimeError::new(ErrorKind::Name(msg), name.position)),
            Expr::Call {
                callee,
                args,
                token: _,
            } => {
                let func = self.evaluate(callee)?;
                let args = self.evaluate_all(args)?;
                match func {
                    Value::Native(func) => func
                        .call(args)
                        .map_err(|kind| RuntimeError::new(kind, callee.position())),
                    other => Err(RuntimeError::new(
                        ErrorKind::Type(format!("'{}' object is not callable", other.type_name())),
                        callee.position(),
                    )),
                }
            }
            Expr::Index { token, expr, index } => {
                let value = self.evaluate(expr)?;
                let index = self.evaluate(index)?;
                value
                    .index(&index)
                    .map_err(|kind| RuntimeError::new(kind, token.position))
            }
        }
    }

    fn evaluate_all(&self, exprs: &[Box<Expr>]) -> std::result::Result<Vec<Value>, RuntimeError> {
        exprs.iter().map(|e| self.evaluate(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::Token;
    use crate::interpreter::destruct::{ArityMismatch, Found};
    use crate::interpreter::sink::Buffer;

    fn run(source: &str) -> (Engine<Buffer>, Result<()>) {
        let mut engine = Engine::new(Buffer::new());
        let result = engine.run(source);
        (engine, result)
    }

    fn output(source: &str) -> Vec<String> {
        let (engine, result) = run(source);
        if let Err(err) = result {
            panic!("{}", err.report("<input>", source));
        }
        engine.into_sink().lines().to_vec()
    }

    fn s(v: &str) -> Value {
        Value::Str(String::from(v))
    }

    #[test]
    fn demo_pair() {
        assert_eq!(output(include_str!("../../demos/pair.unp")), vec!["4", "5"]);
    }

    #[test]
    fn demo_nested() {
        assert_eq!(
            output(include_str!("../../demos/nested.unp")),
            vec!["ACME", "(2012, 12, 21)", "ACME", "2012", "12", "21"]
        );
    }

    #[test]
    fn demo_mismatch() {
        let source = include_str!("../../demos/mismatch.unp");
        let (engine, result) = run(source);
        match result {
            Err(Error::Runtime(err)) => {
                assert_eq!(
                    err.kind,
                    ErrorKind::Unpack(ArityMismatch {
                        expected: 3,
                        found: Found::Len(2),
                        path: vec![],
                    })
                );
                assert!(!engine.scope().contains("x"));
                assert!(!engine.scope().contains("z"));
            }
            other => panic!("expected an arity mismatch, got {:?}", other),
        }
        assert!(engine.sink().lines().is_empty());
    }

    #[test]
    fn demo_string() {
        assert_eq!(
            output(include_str!("../../demos/string.unp")),
            vec!["H", "e", "o"]
        );
    }

    #[test]
    fn demo_discard() {
        assert_eq!(
            output(include_str!("../../demos/discard.unp")),
            vec!["50", "91.1"]
        );
    }

    #[test]
    fn failed_unpack_keeps_previous_bindings() {
        let (engine, result) = run("x, y = 1, 2\nx, (y, z) = 3, (4, 5, 6)");
        assert!(result.is_err());
        assert_eq!(engine.scope().get("x"), Ok(&Value::Int(1)));
        assert_eq!(engine.scope().get("y"), Ok(&Value::Int(2)));
        assert!(!engine.scope().contains("z"));
    }

    #[test]
    fn discard_never_binds() {
        let (engine, result) = run("_, a, _ = 'xyz'\n_ = 5");
        assert!(result.is_ok());
        assert!(!engine.scope().contains("_"));
        assert_eq!(engine.scope().get("a"), Ok(&s("y")));
    }

    #[test]
    fn swap() {
        assert_eq!(output("a, b = 1, 2\na, b = b, a\nprint a, b"), vec!["2 1"]);
    }

    #[test]
    fn stops_at_first_error() {
        let (engine, result) = run("print 1\nx, y, z = (4, 5)\nprint 2");
        assert!(matches!(result, Err(Error::Runtime(_))));
        assert_eq!(engine.sink().lines(), &[String::from("1")]);
    }

    #[test]
    fn error_positions() {
        let (_, result) = run("p = (4, 5)\n  x, y, z = p");
        match result {
            Err(Error::Runtime(err)) => assert_eq!((err.line, err.col), (2, 3)),
            other => panic!("unexpected {:?}", other),
        }

        let (_, result) = run("print undefined");
        match result {
            Err(Error::Runtime(err)) => {
                assert_eq!(
                    err.kind,
                    ErrorKind::Name(String::from("name 'undefined' is not defined"))
                );
                assert_eq!((err.line, err.col), (1, 7));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unpack_non_sequence() {
        let (_, result) = run("a, b = 5");
        match result {
            Err(Error::Runtime(err)) => assert_eq!(
                err.kind.to_string(),
                "cannot unpack non-sequence int (expected 2 values)"
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn builtins_and_expressions() {
        assert_eq!(
            output("s = 'Hello'\nprint(len(s), s[-1], type(s))\nprint str(1 + 2.5) + '!'\nprint list('ab'), tuple([1])"),
            vec!["5 o str", "3.5!", "['a', 'b'] (1,)"]
        );
    }

    #[test]
    fn calling_a_non_function() {
        let (_, result) = run("x = 1\nx(2)");
        match result {
            Err(Error::Runtime(err)) => {
                assert_eq!(
                    err.kind,
                    ErrorKind::Type(String::from("'int' object is not callable"))
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn discard_read_from_built_tree() {
        let token = Token::new(TokenType::Underscore, String::from("_"), 4, 2);
        let stmts = [Stmt::Print {
            token: token.clone(),
            values: vec![Expr::Underscore { token }],
        }];
        let mut engine = Engine::new(Buffer::new());
        let err = engine.execute(&stmts).unwrap_err();
        assert_eq!((err.line, err.col), (4, 2));

        // same wording as the parser's rejection of `print _`
        let (_, result) = run("print _");
        match result {
            Err(Error::Parse(errors)) => assert_eq!(
                ErrorKind::Name(String::from(errors[0].message())),
                err.kind
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let (engine, result) = run(&format!(
            "print 1\nx = {}1{}",
            "(".repeat(200_000),
            ")".repeat(200_000)
        ));
        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(engine.sink().lines().is_empty());

        assert_eq!(output(&format!("print {}", ["1"; 150].join(" + "))), vec!["150"]);
    }

    #[test]
    fn huge_repetition_fails_cleanly() {
        let (engine, result) = run("x = 1\ns = 'ab' * 9223372036854775807");
        match result {
            Err(Error::Runtime(err)) => {
                assert_eq!(err.kind, ErrorKind::Memory);
                assert_eq!((err.line, err.col), (2, 10));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(!engine.scope().contains("s"));
        assert_eq!(output("print len([0] * 3), ('a',) * -1"), vec!["3 ()"]);
    }

    #[test]
    fn parse_errors_run_nothing() {
        let (engine, result) = run("print 1\nx = (");
        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(engine.sink().lines().is_empty());
    }
}
