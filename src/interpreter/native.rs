use std::fmt::Debug;

use dyn_clone::DynClone;

use super::destruct::Sequence;
use super::value::Value;
use crate::error::ErrorKind;

/// A builtin callable that lives in the scope like any other value
pub trait NativeFunc: DynClone + Debug {
    fn name(&self) -> &'static str;

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind>;
}

dyn_clone::clone_trait_object!(NativeFunc);

/// Every builtin, ready to be put into a fresh scope
pub fn builtins() -> Vec<Box<dyn NativeFunc>> {
    vec![
        Box::new(Len),
        Box::new(TypeOf),
        Box::new(Str),
        Box::new(Tuple),
        Box::new(List),
    ]
}

fn one_arg(name: &str, mut args: Vec<Value>) -> Result<Value, ErrorKind> {
    if args.len() == 1 {
        Ok(args.remove(0))
    } else {
        Err(ErrorKind::Type(format!(
            "{}() takes exactly one argument ({} given)",
            name,
            args.len()
        )))
    }
}

fn elements(name: &str, value: &Value) -> Result<Vec<Value>, ErrorKind> {
    value.elements().ok_or_else(|| {
        ErrorKind::Type(format!(
            "{}() argument must be a sequence, not '{}'",
            name,
            value.type_name()
        ))
    })
}

#[derive(Clone, Debug)]
pub struct Len;

impl NativeFunc for Len {
    fn name(&self) -> &'static str {
        "len"
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind> {
        let value = one_arg(self.name(), args)?;
        match value.len() {
            Some(len) => Ok(Value::Int(len as i64)),
            None => Err(ErrorKind::Type(format!(
                "object of type '{}' has no len()",
                value.type_name()
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TypeOf;

impl NativeFunc for TypeOf {
    fn name(&self) -> &'static str {
        "type"
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind> {
        let value = one_arg(self.name(), args)?;
        Ok(Value::Str(String::from(value.type_name())))
    }
}

#[derive(Clone, Debug)]
pub struct Str;

impl NativeFunc for Str {
    fn name(&self) -> &'static str {
        "str"
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind> {
        let value = one_arg(self.name(), args)?;
        Ok(Value::Str(value.string(false)))
    }
}

#[derive(Clone, Debug)]
pub struct Tuple;

impl NativeFunc for Tuple {
    fn name(&self) -> &'static str {
        "tuple"
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind> {
        let value = one_arg(self.name(), args)?;
        Ok(Value::Tuple(elements(self.name(), &value)?))
    }
}

#[derive(Clone, Debug)]
pub struct List;

impl NativeFunc for List {
    fn name(&self) -> &'static str {
        "list"
    }

    fn call(&self, args: Vec<Value>) -> Result<Value, ErrorKind> {
        let value = one_arg(self.name(), args)?;
        Ok(Value::List(elements(self.name(), &value)?))
    }
}
