use std::collections::HashMap;

use crate::value::Value;

/// Variable bindings a template is rendered against.
pub trait Context {
    fn get(&self, name: &str) -> Option<&Value>;

    /// Binds `name`, returning the previous value.
    fn put(&mut self, name: &str, value: Value) -> Option<Value>;

    fn remove(&mut self, name: &str) -> Option<Value>;

    fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::put`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Context for TemplateContext {
    fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    fn put(&mut self, name: &str, value: Value) -> Option<Value> {
        self.variables.insert(name.to_string(), value)
    }

    fn remove(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(name)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for TemplateContext {
    fn from(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            variables: entries
                .into_iter()
                .map(|(name, value)| (name, Value::from(value)))
                .collect(),
        }
    }
}

impl FromIterator<(String, Value)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().collect(),
        }
    }
}
