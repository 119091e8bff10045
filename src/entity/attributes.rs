//! Named, dynamically typed attributes carried by individuals
//!
//! Attributes are tags set by activities at run time (for example "GrowOut"
//! on animals kept back for fattening). Selection can test for their presence
//! or sort on their stored value.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value stored against an attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(v) => write!(f, "{}", v),
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
        }
    }
}

/// Attribute map for one individual
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    values: AHashMap<String, AttributeValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_exists() {
        let mut attributes = Attributes::new();
        assert!(!attributes.exists("GrowOut"));
        attributes.insert("GrowOut", AttributeValue::Bool(true));
        assert!(attributes.exists("GrowOut"));
        assert_eq!(attributes.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut attributes = Attributes::new();
        attributes.insert("Genotype", AttributeValue::Float(0.8));
        assert_eq!(attributes.remove("Genotype"), Some(AttributeValue::Float(0.8)));
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_untagged_json() {
        let attributes: Attributes =
            serde_json::from_str(r#"{"GrowOut": true, "Score": 3, "Genotype": 0.5, "Line": "A"}"#)
                .unwrap();
        assert_eq!(attributes.get("Score"), Some(&AttributeValue::Int(3)));
        assert_eq!(attributes.get("Genotype"), Some(&AttributeValue::Float(0.5)));
        assert_eq!(attributes.get("Line"), Some(&AttributeValue::Text("A".to_string())));
    }
}
