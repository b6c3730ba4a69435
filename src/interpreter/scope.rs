use std::collections::HashMap;

use super::destruct::Bindings;
use super::native;
use super::value::Value;

#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope holding every builtin under its own name
    pub fn with_builtins() -> Self {
        let mut scope = Self::new();
        for func in native::builtins() {
            scope.put(func.name(), Value::Native(func));
        }
        scope
    }

    pub fn get(&self, name: &str) -> Result<&Value, String> {
        match self.vars.get(name) {
            Some(v) => Ok(v),
            None => Err(format!("name '{}' is not defined", name)),
        }
    }

    pub fn put(&mut self, name: &str, v: Value) {
        self.vars.insert(String::from(name), v);
    }

    /// Applies the bindings of one successful unpack
    pub fn commit(&mut self, bindings: Bindings<Value>) {
        for (name, v) in bindings {
            self.vars.insert(name, v);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}
