//! Call arguments captured once per invocation of a bound callable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Positional and named values forwarded to the data-process factory and to
/// every predicate during argument delivery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub named: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional value.
    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named value, replacing any previous value under `name`.
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_positional_order() {
        let args = CallArgs::new().with_arg(1).with_arg("two").with_named("egg", "ham");
        assert_eq!(args.positional, vec![json!(1), json!("two")]);
        assert_eq!(args.named("egg"), Some(&json!("ham")));
        assert_eq!(args.arg(2), None);
        assert!(!args.is_empty());
    }

    #[test]
    fn deserializes_with_missing_sections() {
        let args: CallArgs = serde_json::from_str(r#"{"positional":[1,2]}"#).expect("parse");
        assert_eq!(args.positional.len(), 2);
        assert!(args.named.is_empty());
        assert!(CallArgs::new().is_empty());
    }
}
