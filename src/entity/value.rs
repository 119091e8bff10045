//! Typed values read from individuals and parsed from filter literals
//!
//! Every selectable member declares a [`ValueKind`]. Filter literals are parsed
//! into a [`Value`] of that kind once, when the rule is compiled, so evaluation
//! only ever compares two values of the same shape.

use chrono::{NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::fmt;

/// Names of an enum-typed member's variants, in declaration order
#[derive(Debug)]
pub struct EnumDomain {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumDomain {
    /// Case-insensitive lookup of a variant name
    pub fn parse(&self, literal: &str) -> Option<usize> {
        let literal = literal.trim();
        self.variants
            .iter()
            .position(|v| v.eq_ignore_ascii_case(literal))
    }

    pub fn variant_name(&self, index: usize) -> Option<&'static str> {
        self.variants.get(index).copied()
    }
}

/// The value type of a selectable member
#[derive(Debug, Clone, Copy)]
pub enum ValueKind {
    Int,
    Float,
    Bool,
    Text,
    Date,
    Enum(&'static EnumDomain),
}

impl ValueKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Int => "Int",
            ValueKind::Float => "Double",
            ValueKind::Bool => "Boolean",
            ValueKind::Text => "String",
            ValueKind::Date => "Date",
            ValueKind::Enum(domain) => domain.name,
        }
    }

    /// Whether `<`, `<=`, `>` and `>=` are meaningful for this kind
    pub fn is_ordered(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float | ValueKind::Date)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }

    /// Parse a literal into this kind, describing the accepted entries on failure
    pub fn parse(&self, literal: &str) -> Result<Value, String> {
        let trimmed = literal.trim();
        match self {
            ValueKind::Int => trimmed
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("[{}] is not a whole number", literal)),
            ValueKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::Float)
                .ok_or_else(|| format!("[{}] is not a number", literal)),
            ValueKind::Bool => parse_bool(trimmed).map(Value::Bool).ok_or_else(|| {
                format!(
                    "[{}] is not a valid Boolean\nValid entries are [True, true, False, false, 1, 0]",
                    literal
                )
            }),
            ValueKind::Text => Ok(Value::Text(literal.to_string())),
            ValueKind::Date => parse_date(trimmed)
                .map(Value::Date)
                .ok_or_else(|| format!("[{}] is not a date (expected YYYY-MM-DD)", literal)),
            ValueKind::Enum(domain) => domain.parse(trimmed).map(Value::Enum).ok_or_else(|| {
                format!(
                    "[{}] is not a valid {}\nValid entries are [{}]",
                    literal,
                    domain.name,
                    domain.variants.join(",")
                )
            }),
        }
    }
}

fn parse_bool(literal: &str) -> Option<bool> {
    if literal.eq_ignore_ascii_case("true") || literal == "1" {
        Some(true)
    } else if literal.eq_ignore_ascii_case("false") || literal == "0" {
        Some(false)
    } else {
        None
    }
}

fn parse_date(literal: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(literal, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// A value read from an individual or parsed from a literal
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Date(NaiveDate),
    /// Variant index within the member's [`EnumDomain`]
    Enum(usize),
}

impl Value {
    /// Compare two values of compatible kinds; numbers compare across int/float
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Enum(v) => write!(f, "#{}", v),
        }
    }
}
