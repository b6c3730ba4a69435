use super::destruct::Sequence;
use super::native::NativeFunc;
use crate::error::ErrorKind;

#[derive(Clone, Debug)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    Native(Box<dyn NativeFunc>),
}

impl Value {
    /// Renders the value; `inside` quotes strings, as when they sit in a container
    pub fn string(&self, inside: bool) -> String {
        match self {
            Value::None => String::from("None"),
            Value::Bool(true) => String::from("True"),
            Value::Bool(false) => String::from("False"),
            Value::Int(v) => format!("{}", v),
            Value::Float(v) => float_string(*v),
            Value::Str(v) => {
                if inside {
                    quote(v)
                } else {
                    v.clone()
                }
            }
            Value::Tuple(items) => match items.as_slice() {
                [only] => format!("({},)", only.string(true)),
                _ => format!("({})", join(items)),
            },
            Value::List(items) => format!("[{}]", join(items)),
            Value::Native(func) => format!("<built-in function {}>", func.name()),
        }
    }

    /// Returns the type of Value, useful for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Native(_) => "builtin_function",
        }
    }

    /// Number of elements, if the value is a sequence
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Tuple(items) | Value::List(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Positional access; negative indices count from the end
    pub fn index(&self, index: &Value) -> Result<Value, ErrorKind> {
        let i = match index {
            Value::Int(i) => *i,
            Value::Bool(b) => *b as i64,
            _ => {
                return Err(ErrorKind::Type(format!(
                    "{} indices must be integers, not {}",
                    self.type_name(),
                    index.type_name()
                )))
            }
        };
        let len = match self.len() {
            Some(len) => len as i64,
            None => {
                return Err(ErrorKind::Type(format!(
                    "'{}' object is not subscriptable",
                    self.type_name()
                )))
            }
        };
        let position = if i < 0 { i + len } else { i };
        let element = if position < 0 {
            None
        } else {
            let position = position as usize;
            match self {
                Value::Str(s) => s.chars().nth(position).map(|c| Value::Str(c.to_string())),
                Value::Tuple(items) | Value::List(items) => items.get(position).cloned(),
                _ => None,
            }
        };
        element.ok_or_else(|| ErrorKind::Index(format!("{} index out of range", self.type_name())))
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(*b as i64 as f64),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn unsupported(&self, op: &str, rhs: &Value) -> ErrorKind {
        ErrorKind::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op,
            self.type_name(),
            rhs.type_name()
        ))
    }

    /// Applies an arithmetic operator to two numbers, widening to float when
    /// either side is a float.
    fn numeric(
        &self,
        rhs: &Value,
        op: &str,
        int: fn(i64, i64) -> Option<i64>,
        float: fn(f64, f64) -> f64,
    ) -> Result<Value, ErrorKind> {
        match (self.as_i64(), rhs.as_i64()) {
            (Some(l), Some(r)) => int(l, r).map(Value::Int).ok_or(ErrorKind::Overflow),
            _ => match (self.as_f64(), rhs.as_f64()) {
                (Some(l), Some(r)) => Ok(Value::Float(float(l, r))),
                _ => Err(self.unsupported(op, rhs)),
            },
        }
    }
}

impl Sequence for Value {
    fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::Str(s) => Some(s.chars().map(|c| Value::Str(c.to_string())).collect()),
            Value::Tuple(items) | Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        Value::type_name(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(l), Value::Str(r)) => l == r,
            (Value::Tuple(l), Value::Tuple(r)) | (Value::List(l), Value::List(r)) => l == r,
            (Value::Native(l), Value::Native(r)) => l.name() == r.name(),
            (Value::Int(l), Value::Int(r)) => l == r,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(l), Some(r)) => l == r,
                _ => false,
            },
        }
    }
}

fn join(items: &[Value]) -> String {
    items
        .iter()
        .map(|i| i.string(true))
        .collect::<Vec<String>>()
        .join(", ")
}

fn float_string(v: f64) -> String {
    if v.is_nan() {
        String::from("nan")
    } else if v.is_infinite() {
        String::from(if v > 0.0 { "inf" } else { "-inf" })
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut quoted = String::new();
    quoted.push(delimiter);
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

// Longest sequence (or string, in bytes) a repetition may build
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Length of `len` units repeated `times` times, refusing results past `MAX_REPEAT_LEN`
fn repeated_len(len: usize, times: i64) -> Result<usize, ErrorKind> {
    let times = usize::try_from(times.max(0)).map_err(|_| ErrorKind::Memory)?;
    match len.checked_mul(times) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(total),
        _ => Err(ErrorKind::Memory),
    }
}

fn repeat(items: &[Value], times: i64) -> Result<Vec<Value>, ErrorKind> {
    let total = repeated_len(items.len(), times)?;
    let mut repeated = Vec::with_capacity(total);
    while repeated.len() < total {
        repeated.extend_from_slice(items);
    }
    Ok(repeated)
}

/// Addition
impl std::ops::Add<&Value> for &Value {
    type Output = Result<Value, ErrorKind>;

    fn add(self, rhs: &Value) -> Self::Output {
        match (self, rhs) {
            (Value::Str(l), Value::Str(r)) => Ok(Value::Str(format!("{}{}", l, r))),
            (Value::Tuple(l), Value::Tuple(r)) => Ok(Value::Tuple([&l[..], &r[..]].concat())),
            (Value::List(l), Value::List(r)) => Ok(Value::List([&l[..], &r[..]].concat())),
            _ => self.numeric(rhs, "+", i64::checked_add, |l, r| l + r),
        }
    }
}

/// Sub
impl std::ops::Sub<&Value> for &Value {
    type Output = Result<Value, ErrorKind>;

    fn sub(self, rhs: &Value) -> Self::Output {
        self.numeric(rhs, "-", i64::checked_sub, |l, r| l - r)
    }
}

/// Mult
impl std::ops::Mul<&Value> for &Value {
    type Output = Result<Value, ErrorKind>;

    fn mul(self, rhs: &Value) -> Self::Output {
        match (self, rhs) {
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => {
                repeated_len(s.len(), *n)?;
                Ok(Value::Str(s.repeat((*n).max(0) as usize)))
            }
            (Value::Tuple(items), Value::Int(n)) | (Value::Int(n), Value::Tuple(items)) => {
                repeat(items, *n).map(Value::Tuple)
            }
            (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items)) => {
                repeat(items, *n).map(Value::List)
            }
            _ => self.numeric(rhs, "*", i64::checked_mul, |l, r| l * r),
        }
    }
}

/// Div, always true division
impl std::ops::Div<&Value> for &Value {
    type Output = Result<Value, ErrorKind>;

    fn div(self, rhs: &Value) -> Self::Output {
        match (self.as_f64(), rhs.as_f64()) {
            (Some(_), Some(r)) if r == 0.0 => Err(ErrorKind::ZeroDivision),
            (Some(l), Some(r)) => Ok(Value::Float(l / r)),
            _ => Err(self.unsupported("/", rhs)),
        }
    }
}

/// Mod, the result takes the sign of the divisor
impl std::ops::Rem<&Value> for &Value {
    type Output = Result<Value, ErrorKind>;

    fn rem(self, rhs: &Value) -> Self::Output {
        if rhs.as_f64() == Some(0.0) {
            return Err(ErrorKind::ZeroDivision);
        }
        self.numeric(
            rhs,
            "%",
            |l, r| l.checked_rem(r).map(|m| if m != 0 && (m < 0) != (r < 0) { m + r } else { m }),
            |l, r| {
                let m = l % r;
                if m != 0.0 && (m < 0.0) != (r < 0.0) {
                    m + r
                } else {
                    m
                }
            },
        )
    }
}

/// Negate
impl std::ops::Neg for &Value {
    type Output = Result<Value, ErrorKind>;

    fn neg(self) -> Self::Output {
        match self {
            Value::Int(v) => v.checked_neg().map(Value::Int).ok_or(ErrorKind::Overflow),
            Value::Bool(b) => Ok(Value::Int(-(*b as i64))),
            Value::Float(v) => Ok(Value::Float(-v)),
            _ => Err(ErrorKind::Type(format!(
                "bad operand type for unary -: '{}'",
                self.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::Str(String::from(v))
    }

    #[test]
    fn render() {
        let date = Value::Tuple(vec![Value::Int(2012), Value::Int(12), Value::Int(21)]);
        assert_eq!(date.string(false), "(2012, 12, 21)");

        let data = Value::List(vec![s("ACME"), Value::Int(50), Value::Float(91.1), date]);
        assert_eq!(data.string(false), "['ACME', 50, 91.1, (2012, 12, 21)]");

        assert_eq!(Value::Tuple(vec![Value::Int(1)]).string(false), "(1,)");
        assert_eq!(Value::Tuple(vec![]).string(false), "()");
        assert_eq!(Value::Float(2.0).string(false), "2.0");
        assert_eq!(Value::None.string(false), "None");
        assert_eq!(Value::Bool(true).string(false), "True");
        assert_eq!(s("H").string(false), "H");
        assert_eq!(s("it's").string(true), "\"it's\"");
    }

    #[test]
    fn string_elements_are_characters() {
        assert_eq!(
            s("Hey").elements(),
            Some(vec![s("H"), s("e"), s("y")])
        );
        assert_eq!(Value::Int(3).elements(), None);
        assert_eq!(Sequence::type_name(&Value::Float(1.5)), "float");
    }

    #[test]
    fn indexing() {
        let t = Value::Tuple(vec![Value::Int(4), Value::Int(5)]);
        assert_eq!(t.index(&Value::Int(0)), Ok(Value::Int(4)));
        assert_eq!(t.index(&Value::Int(-1)), Ok(Value::Int(5)));
        assert_eq!(
            t.index(&Value::Int(2)),
            Err(ErrorKind::Index(String::from("tuple index out of range")))
        );
        assert_eq!(s("Hello").index(&Value::Int(4)), Ok(s("o")));
        assert!(matches!(
            Value::Int(1).index(&Value::Int(0)),
            Err(ErrorKind::Type(_))
        ));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(&Value::Int(4) + &Value::Int(5), Ok(Value::Int(9)));
        assert_eq!(&Value::Int(1) + &Value::Float(0.5), Ok(Value::Float(1.5)));
        assert_eq!(&s("AC") + &s("ME"), Ok(s("ACME")));
        assert_eq!(&Value::Int(4) / &Value::Int(2), Ok(Value::Float(2.0)));
        assert_eq!(&Value::Int(-7) % &Value::Int(3), Ok(Value::Int(2)));
        assert_eq!(&Value::Int(7) % &Value::Int(-3), Ok(Value::Int(-2)));
        assert_eq!(&s("ab") * &Value::Int(2), Ok(s("abab")));
        assert_eq!(&Value::Int(1) / &Value::Int(0), Err(ErrorKind::ZeroDivision));
        assert_eq!(&Value::Int(i64::MAX) + &Value::Int(1), Err(ErrorKind::Overflow));
        assert_eq!(-&Value::Int(3), Ok(Value::Int(-3)));
        assert!(matches!(&s("a") - &Value::Int(1), Err(ErrorKind::Type(_))));
    }

    #[test]
    fn repetition() {
        let one = Value::List(vec![Value::Int(1)]);
        assert_eq!(
            &one * &Value::Int(3),
            Ok(Value::List(vec![Value::Int(1), Value::Int(1), Value::Int(1)]))
        );
        assert_eq!(&Value::Int(-2) * &s("ab"), Ok(s("")));
        assert_eq!(&Value::Tuple(vec![]) * &Value::Int(i64::MAX), Ok(Value::Tuple(vec![])));
        assert_eq!(&s("ab") * &Value::Int(i64::MAX), Err(ErrorKind::Memory));
        assert_eq!(&one * &Value::Int(i64::MAX), Err(ErrorKind::Memory));
        assert_eq!(&s("") * &Value::Int(i64::MAX), Ok(s("")));
    }

    #[test]
    fn equality_across_numbers() {
        assert_eq!(Value::Int(1), Value::Float(1.0));
        assert_ne!(Value::Int(1), s("1"));
        assert_ne!(
            Value::Tuple(vec![Value::Int(1)]),
            Value::List(vec![Value::Int(1)])
        );
    }
}
