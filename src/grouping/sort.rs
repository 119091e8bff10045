//! Multi-key sorting of selected individuals
//!
//! A sort chain is an ordered list of keys: the first is the primary key and
//! each later key only breaks ties left by those before it. Keys are
//! extracted once per individual and the sort is stable, so individuals that
//! tie on every key keep their filtered order.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::core::error::{Result, SelectionError};
use crate::entity::attributes::AttributeValue;
use crate::entity::parameter::{Filterable, Parameter, ResolveError};
use crate::entity::value::{Value, ValueKind};
use crate::grouping::validation::ConfigIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ascending")]
    Ascending,
    #[serde(alias = "descending")]
    Descending,
}

/// Type an attribute's stored value is read as when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeValueType {
    #[default]
    Float,
    Int,
    Bool,
}

impl AttributeValueType {
    fn kind(&self) -> ValueKind {
        match self {
            AttributeValueType::Float => ValueKind::Float,
            AttributeValueType::Int => ValueKind::Int,
            AttributeValueType::Bool => ValueKind::Bool,
        }
    }

    /// Parse a literal into the numeric sort value of this type
    pub fn parse(&self, attribute: &str, literal: &str) -> Result<f64> {
        self.kind()
            .parse(literal)
            .ok()
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SelectionError::AttributeType {
                attribute: attribute.to_string(),
                value: literal.to_string(),
                expected: self.kind().type_name().to_string(),
            })
    }

    fn read(&self, attribute: &str, stored: &AttributeValue) -> Result<f64> {
        match (self, stored) {
            (AttributeValueType::Float, AttributeValue::Float(v)) => Ok(*v),
            (AttributeValueType::Float, AttributeValue::Int(v)) => Ok(*v as f64),
            (AttributeValueType::Int, AttributeValue::Int(v)) => Ok(*v as f64),
            (AttributeValueType::Bool, AttributeValue::Bool(v)) => Ok(if *v { 1.0 } else { 0.0 }),
            (_, AttributeValue::Text(text)) => self.parse(attribute, text),
            (_, other) => Err(SelectionError::AttributeType {
                attribute: attribute.to_string(),
                value: other.to_string(),
                expected: self.kind().type_name().to_string(),
            }),
        }
    }
}

/// A comparable key extracted from one individual.
///
/// Missing values order after every present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SortValue {
    Number(OrderedFloat<f64>),
    Date(NaiveDate),
    Ordinal(usize),
    Text(String),
    Missing,
}

impl From<Value> for SortValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(v) => SortValue::Number(OrderedFloat(v as f64)),
            Value::Float(v) => SortValue::Number(OrderedFloat(v)),
            Value::Bool(v) => SortValue::Number(OrderedFloat(if v { 1.0 } else { 0.0 })),
            Value::Text(v) => SortValue::Text(v),
            Value::Date(v) => SortValue::Date(v),
            Value::Enum(v) => SortValue::Ordinal(v),
        }
    }
}

/// How a sort key reads its value
pub enum SortExtractor<T: 'static> {
    /// A typed member from the schema's registry
    Member(&'static Parameter<T>),
    /// 1 when the attribute is present, else 0
    AttributeExists(String),
    /// The attribute's stored value, or the fallback when absent
    AttributeValue {
        attribute: String,
        value_type: AttributeValueType,
        fallback: Option<f64>,
    },
    /// A fresh uniform value per individual per sort
    Random,
}

impl<T: 'static> fmt::Debug for SortExtractor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortExtractor::Member(p) => write!(f, "Member({})", p.qualified_name()),
            SortExtractor::AttributeExists(a) => write!(f, "AttributeExists({})", a),
            SortExtractor::AttributeValue {
                attribute,
                value_type,
                fallback,
            } => write!(f, "AttributeValue({}, {:?}, {:?})", attribute, value_type, fallback),
            SortExtractor::Random => f.write_str("Random"),
        }
    }
}

/// One key of a sort chain
pub struct SortKey<T: 'static> {
    /// Item name reported by validation
    pub name: String,
    pub extractor: SortExtractor<T>,
    pub direction: SortDirection,
}

impl<T: 'static> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("name", &self.name)
            .field("extractor", &self.extractor)
            .field("direction", &self.direction)
            .finish()
    }
}

/// The issue raised for a random key that is followed by another key
pub fn misplaced_random(owner: &str, key_name: &str) -> ConfigIssue {
    ConfigIssue::new(
        owner,
        key_name,
        "position",
        format!(
            "The random sort [{}] must be the last sort item in [{}]",
            key_name, owner
        ),
    )
}

impl<T: Filterable> SortKey<T> {
    /// Sort on a named member
    pub fn member(
        parameter: &str,
        direction: SortDirection,
    ) -> std::result::Result<Self, ResolveError> {
        let member = T::resolve_parameter(parameter)?;
        Ok(Self {
            name: format!("Sort by {}", parameter),
            extractor: SortExtractor::Member(member),
            direction,
        })
    }

    /// Sort on whether an attribute is present
    pub fn attribute_exists(attribute: &str, direction: SortDirection) -> Self {
        Self {
            name: format!("Sort by attribute {}", attribute),
            extractor: SortExtractor::AttributeExists(attribute.to_string()),
            direction,
        }
    }

    /// Sort on an attribute's value; `fallback` is used when it is absent
    pub fn attribute_value(
        attribute: &str,
        value_type: AttributeValueType,
        fallback: Option<&str>,
        direction: SortDirection,
    ) -> Result<Self> {
        let fallback = match fallback.map(str::trim).filter(|f| !f.is_empty()) {
            Some(raw) => Some(value_type.parse(attribute, raw)?),
            None => None,
        };
        Ok(Self {
            name: format!("Sort by attribute {}", attribute),
            extractor: SortExtractor::AttributeValue {
                attribute: attribute.to_string(),
                value_type,
                fallback,
            },
            direction,
        })
    }

    /// Random order, for shuffling ties left by earlier keys
    pub fn random() -> Self {
        Self {
            name: "Random order".to_string(),
            extractor: SortExtractor::Random,
            direction: SortDirection::Ascending,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn is_random(&self) -> bool {
        matches!(self.extractor, SortExtractor::Random)
    }

    /// Read this key from an individual
    pub fn extract<R: Rng + ?Sized>(&self, item: &T, rng: &mut R) -> Result<SortValue> {
        Ok(match &self.extractor {
            SortExtractor::Member(member) => member
                .read(item)
                .map(SortValue::from)
                .unwrap_or(SortValue::Missing),
            SortExtractor::AttributeExists(attribute) => {
                let present = item.attributes().exists(attribute);
                SortValue::Number(OrderedFloat(if present { 1.0 } else { 0.0 }))
            }
            SortExtractor::AttributeValue {
                attribute,
                value_type,
                fallback,
            } => match item.attributes().get(attribute) {
                Some(stored) => SortValue::Number(OrderedFloat(value_type.read(attribute, stored)?)),
                None => fallback
                    .map(|v| SortValue::Number(OrderedFloat(v)))
                    .unwrap_or(SortValue::Missing),
            },
            SortExtractor::Random => SortValue::Number(OrderedFloat(rng.gen::<f64>())),
        })
    }
}

/// Ordered sort keys owned by one group
pub struct SortChain<T: 'static> {
    /// Qualified name of the owning group
    pub owner: String,
    keys: Vec<SortKey<T>>,
}

impl<T: Filterable> SortChain<T> {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            keys: Vec::new(),
        }
    }

    pub fn then(mut self, key: SortKey<T>) -> Self {
        self.keys.push(key);
        self
    }

    pub fn push(&mut self, key: SortKey<T>) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[SortKey<T>] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// A random key anywhere but last would hide every key after it
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let last = self.keys.len().saturating_sub(1);
        self.keys
            .iter()
            .enumerate()
            .filter(|(index, key)| key.is_random() && *index != last)
            .map(|(_, key)| misplaced_random(&self.owner, &key.name))
            .collect()
    }

    fn compare(&self, a: &[SortValue], b: &[SortValue]) -> Ordering {
        for (key, (x, y)) in self.keys.iter().zip(a.iter().zip(b.iter())) {
            // missing values stay last in both directions
            let ordering = match (x, y, key.direction) {
                (SortValue::Missing, SortValue::Missing, _) => Ordering::Equal,
                (SortValue::Missing, _, _) => Ordering::Greater,
                (_, SortValue::Missing, _) => Ordering::Less,
                (_, _, SortDirection::Ascending) => x.cmp(y),
                (_, _, SortDirection::Descending) => y.cmp(x),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable multi-key sort
    pub fn sort<'a, R: Rng + ?Sized>(&self, items: Vec<&'a T>, rng: &mut R) -> Result<Vec<&'a T>> {
        if self.keys.is_empty() {
            return Ok(items);
        }

        let mut keyed: Vec<(Vec<SortValue>, &'a T)> = Vec::with_capacity(items.len());
        for item in items {
            let mut values = Vec::with_capacity(self.keys.len());
            for key in &self.keys {
                values.push(key.extract(item, rng)?);
            }
            keyed.push((values, item));
        }

        keyed.sort_by(|(a, _), (b, _)| self.compare(a, b));
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

impl<T: 'static> fmt::Debug for SortChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortChain")
            .field("owner", &self.owner)
            .field("keys", &self.keys)
            .finish()
    }
}
