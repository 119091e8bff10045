//! Declarative filter terms

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::entity::parameter::Filterable;
use crate::entity::value::ValueKind;

/// Comparison applied by a filter term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(alias = "==", alias = "=")]
    Equal,
    #[serde(alias = "!=", alias = "<>")]
    NotEqual,
    #[serde(alias = "<")]
    LessThan,
    #[serde(alias = "<=")]
    LessThanOrEqual,
    #[serde(alias = ">")]
    GreaterThan,
    #[serde(alias = ">=")]
    GreaterThanOrEqual,
    /// Boolean member is true; no compare value needed
    IsTrue,
    /// Boolean member is false; no compare value needed
    IsFalse,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "≠",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "≤",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => "≥",
            Operator::IsTrue => "is true",
            Operator::IsFalse => "is false",
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::LessThan
                | Operator::LessThanOrEqual
                | Operator::GreaterThan
                | Operator::GreaterThanOrEqual
        )
    }

    pub fn is_truth_test(&self) -> bool {
        matches!(self, Operator::IsTrue | Operator::IsFalse)
    }

    /// Whether the operator can be applied to a member of this kind
    pub fn supports(&self, kind: &ValueKind) -> bool {
        if self.is_ordering() {
            kind.is_ordered()
        } else if self.is_truth_test() {
            matches!(kind, ValueKind::Bool)
        } else {
            true
        }
    }

    /// Does `member.cmp(literal) == ordering` satisfy this operator
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Equal | Operator::IsTrue | Operator::IsFalse => ordering == Ordering::Equal,
            Operator::NotEqual => ordering != Ordering::Equal,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One declarative comparison: parameter, operator and literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterTerm {
    /// Display name of the term within its group
    #[serde(default)]
    pub name: String,
    pub parameter: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: Option<String>,
}

impl FilterTerm {
    pub fn new(parameter: &str, operator: Operator, value: &str) -> Self {
        Self {
            name: String::new(),
            parameter: parameter.to_string(),
            operator,
            value: Some(value.to_string()),
        }
    }

    /// An `IsTrue`/`IsFalse` term, which carries no value
    pub fn truth(parameter: &str, operator: Operator) -> Self {
        Self {
            name: String::new(),
            parameter: parameter.to_string(),
            operator,
            value: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Name used in messages: the configured name, else the parameter
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("Filter {}", self.parameter)
        } else {
            self.name.clone()
        }
    }

    /// The compare value, treating blank strings as absent
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.trim().is_empty())
    }

    fn reads_false(&self) -> bool {
        self.operator == Operator::IsFalse
            || self
                .value_str()
                .map(|v| v.trim().eq_ignore_ascii_case("false"))
                .unwrap_or(false)
    }

    /// Human-readable summary against the schema of `T`
    pub fn summary<T: Filterable>(&self) -> String {
        if self.parameter.trim().is_empty() {
            return "Filter: Not Set".to_string();
        }
        let member = match T::resolve_parameter(&self.parameter) {
            Ok(member) => member,
            Err(_) => return format!("Filter: Unknown: {}", self.parameter),
        };
        let value = self.value_str().unwrap_or("No value");
        let valid = self.operator.supports(&member.kind);

        match member.kind {
            ValueKind::Bool if valid => {
                let negated = if self.reads_false() { " not" } else { "" };
                format!("Filter:{} {}", negated, self.parameter)
            }
            ValueKind::Enum(_) if valid => {
                let verb = if self.operator == Operator::NotEqual || self.reads_false() {
                    "not"
                } else {
                    "is"
                };
                format!("Filter: {} {} {}", self.parameter, verb, value)
            }
            _ if !valid => format!(
                "Filter: {} {} is invalid for property {} {}",
                self.parameter,
                self.operator,
                member.kind.type_name(),
                value
            ),
            _ => format!("Filter: {} {} {}", self.parameter, self.operator, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Ruminant;

    #[test]
    fn test_operator_holds() {
        assert!(Operator::GreaterThanOrEqual.holds(Ordering::Equal));
        assert!(Operator::GreaterThanOrEqual.holds(Ordering::Greater));
        assert!(!Operator::GreaterThanOrEqual.holds(Ordering::Less));
        assert!(Operator::NotEqual.holds(Ordering::Less));
        assert!(!Operator::LessThan.holds(Ordering::Equal));
    }

    #[test]
    fn test_operator_support_by_kind() {
        assert!(!Operator::GreaterThan.supports(&ValueKind::Bool));
        assert!(!Operator::LessThan.supports(&ValueKind::Text));
        assert!(Operator::LessThan.supports(&ValueKind::Date));
        assert!(!Operator::IsTrue.supports(&ValueKind::Float));
        assert!(Operator::IsTrue.supports(&ValueKind::Bool));
    }

    #[test]
    fn test_operator_symbol_aliases() {
        #[derive(Deserialize)]
        struct Wrapper {
            op: Operator,
        }
        let w: Wrapper = toml::from_str("op = \">=\"").unwrap();
        assert_eq!(w.op, Operator::GreaterThanOrEqual);
        let w: Wrapper = toml::from_str("op = \"NotEqual\"").unwrap();
        assert_eq!(w.op, Operator::NotEqual);
    }

    #[test]
    fn test_summaries() {
        assert_eq!(
            FilterTerm::new("Age", Operator::GreaterThanOrEqual, "24").summary::<Ruminant>(),
            "Filter: Age ≥ 24"
        );
        assert_eq!(
            FilterTerm::truth("IsLactating", Operator::IsFalse).summary::<Ruminant>(),
            "Filter: not IsLactating"
        );
        assert_eq!(
            FilterTerm::new("Sex", Operator::Equal, "Female").summary::<Ruminant>(),
            "Filter: Sex is Female"
        );
        assert_eq!(
            FilterTerm::new("Horns", Operator::Equal, "2").summary::<Ruminant>(),
            "Filter: Unknown: Horns"
        );
        assert_eq!(
            FilterTerm::new("", Operator::Equal, "2").summary::<Ruminant>(),
            "Filter: Not Set"
        );
    }

    #[test]
    fn test_label_falls_back_to_parameter() {
        assert_eq!(FilterTerm::new("Age", Operator::Equal, "1").label(), "Filter Age");
        assert_eq!(
            FilterTerm::new("Age", Operator::Equal, "1").with_name("Adults").label(),
            "Adults"
        );
    }
}
