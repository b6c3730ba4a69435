use super::token::Token;
use crate::bulk_print;
use crate::interpreter::destruct::Target;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        right: Box<Expr>,
        op: Token,
    },
    Group {
        expr: Box<Expr>,
    },
    Unary {
        right: Box<Expr>,
        op: Token,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    FloatLiteral {
        token: Token,
        value: f64,
    },
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    BoolLiteral {
        token: Token,
        payload: bool,
    },
    Underscore {
        token: Token,
    },
    NoneLiteral {
        token: Token,
    },
    TupleLiteral {
        token: Token,
        values: Vec<Box<Expr>>,
    },
    ListLiteral {
        token: Token,
        values: Vec<Box<Expr>>,
    },
    Variable {
        name: Token,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Box<Expr>>,
        token: Token,
    },
    Index {
        token: Token,
        expr: Box<Expr>,
        index: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr {
        expr: Expr,
    },
    Assign {
        token: Token,
        target: Target,
        value: Expr,
    },
    Print {
        token: Token,
        values: Vec<Expr>,
    },
}

impl Expr {
    pub fn print(&self) -> String {
        match self {
            Expr::Binary { left, right, op } => {
                format!("({} {} {})", op.print(), left.print(), right.print())
            }
            Expr::Group { expr } => {
                format!("({})", expr.print())
            }
            Expr::Unary { right, op } => {
                format!("({} {})", op.print(), right.print())
            }
            Expr::StringLiteral { token: _, value } => {
                format!("\"{}\"", value)
            }
            Expr::IntegerLiteral { token: _, value } => {
                format!("{}", value)
            }
            Expr::FloatLiteral { token: _, value } => {
                format!("{}", value)
            }
            Expr::BoolLiteral { token: _, payload } => {
                String::from(if *payload { "True" } else { "False" })
            }
            Expr::Underscore { token: _ } => String::from("_"),
            Expr::NoneLiteral { token: _ } => String::from("None"),
            Expr::TupleLiteral { token: _, values } => {
                if !values.is_empty() {
                    format!("(tuple {})", bulk_print!(values, " "))
                } else {
                    String::from("(tuple)")
                }
            }
            Expr::ListLiteral { token: _, values } => {
                if !values.is_empty() {
                    format!("(list {})", bulk_print!(values, " "))
                } else {
                    String::from("(list)")
                }
            }
            Expr::Variable { name } => name.print(),
            Expr::Call {
                callee,
                args,
                token: _,
            } => {
                let mut builder = format!("({}", callee.print());
                if !args.is_empty() {
                    builder += &format!(" {})", bulk_print!(args, " "));
                } else {
                    builder += ")";
                }
                builder
            }
            Expr::Index {
                token: _,
                expr,
                index,
            } => {
                format!("(index {} {})", expr.print(), index.print())
            }
        }
    }

    /// Position of the token that starts this expression, for error reporting
    pub fn position(&self) -> (usize, usize) {
        match self {
            Expr::Binary { left, .. } => left.position(),
            Expr::Group { expr } => expr.position(),
            Expr::Call { callee, .. } => callee.position(),
            Expr::Index { expr, .. } => expr.position(),
            Expr::Variable { name } => name.position,
            Expr::Unary { op: token, .. }
            | Expr::StringLiteral { token, .. }
            | Expr::FloatLiteral { token, .. }
            | Expr::IntegerLiteral { token, .. }
            | Expr::BoolLiteral { token, .. }
            | Expr::Underscore { token }
            | Expr::NoneLiteral { token }
            | Expr::TupleLiteral { token, .. }
            | Expr::ListLiteral { token, .. } => token.position,
        }
    }

    /// The first `_` used as a value anywhere inside this expression
    pub fn find_underscore(&self) -> Option<&Token> {
        match self {
            Expr::Underscore { token } => Some(token),
            Expr::Binary { left, right, .. } => {
                left.find_underscore().or_else(|| right.find_underscore())
            }
            Expr::Group { expr } | Expr::Unary { right: expr, .. } => expr.find_underscore(),
            Expr::TupleLiteral { values, .. } | Expr::ListLiteral { values, .. } => {
                values.iter().find_map(|v| v.find_underscore())
            }
            Expr::Call { callee, args, .. } => callee
                .find_underscore()
                .or_else(|| args.iter().find_map(|a| a.find_underscore())),
            Expr::Index { expr, index, .. } => {
                expr.find_underscore().or_else(|| index.find_underscore())
            }
            _ => None,
        }
    }

    /// Reinterprets a parsed left-hand side as an assignment target
    pub fn to_target(&self) -> Result<Target, &'static str> {
        match self {
            Expr::Variable { name } => Ok(Target::Name(name.value.clone())),
            Expr::Underscore { token: _ } => Ok(Target::Discard),
            Expr::Group { expr } => expr.to_target(),
            Expr::TupleLiteral { token: _, values } | Expr::ListLiteral { token: _, values } => {
                Ok(Target::Nested(
                    values
                        .iter()
                        .map(|v| v.to_target())
                        .collect::<Result<Vec<Target>, &'static str>>()?,
                ))
            }
            _ => Err("invalid assignment target"),
        }
    }
}

impl Stmt {
    pub fn pretty_print(stmts: &[Stmt]) -> String {
        stmts
            .iter()
            .map(|stmt| stmt.print())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn print(&self) -> String {
        match self {
            Stmt::Expr { expr } => expr.print(),
            Stmt::Assign {
                token: _,
                target,
                value,
            } => {
                format!("(assign {} {})", target.print(), value.print())
            }
            Stmt::Print { token: _, values } => {
                if !values.is_empty() {
                    format!("(print {})", bulk_print!(values, " "))
                } else {
                    String::from("(print)")
                }
            }
        }
    }
}
