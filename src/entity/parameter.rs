//! Typed accessor registry for selectable members
//!
//! Each entity schema publishes one static table of [`Parameter`]s, built once
//! on first use. A parameter binds a member name to its value kind, the sex
//! that declares it (if only one sex carries the member) and a plain function
//! that reads the value from an individual.

use std::fmt;

use crate::core::types::{EntityId, Sex};
use crate::entity::attributes::Attributes;
use crate::entity::value::{Value, ValueKind};

/// One selectable member of an entity schema
pub struct Parameter<T> {
    /// Schema (or sex subtype) that declares the member, e.g. `RuminantFemale`
    pub declaring_type: &'static str,
    pub name: &'static str,
    pub kind: ValueKind,
    /// `Some(sex)` when only individuals of that sex carry the member
    pub declared_for: Option<Sex>,
    getter: fn(&T) -> Option<Value>,
}

impl<T> Parameter<T> {
    pub fn new(
        declaring_type: &'static str,
        name: &'static str,
        kind: ValueKind,
        getter: fn(&T) -> Option<Value>,
    ) -> Self {
        Self {
            declaring_type,
            name,
            kind,
            declared_for: None,
            getter,
        }
    }

    /// Mark the member as carried by one sex only
    pub fn only_for(mut self, sex: Sex) -> Self {
        self.declared_for = Some(sex);
        self
    }

    /// Read the member; `None` when the individual does not carry it
    pub fn read(&self, item: &T) -> Option<Value> {
        (self.getter)(item)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}

impl<T> fmt::Debug for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared_for", &self.declared_for)
            .finish()
    }
}

/// Why a parameter name could not be bound to a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    Unknown(String),
    Ambiguous { name: String, candidates: Vec<String> },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Unknown(name) => write!(f, "Unknown property [{}]", name),
            ResolveError::Ambiguous { name, candidates } => write!(
                f,
                "Property [{}] is ambiguous, use one of [{}]",
                name,
                candidates.join(", ")
            ),
        }
    }
}

/// Find the single parameter named `name`.
///
/// Accepts either the bare member name or `DeclaringType.MemberName`.
pub fn resolve<'a, T>(
    parameters: &'a [Parameter<T>],
    name: &str,
) -> Result<&'a Parameter<T>, ResolveError> {
    let name = name.trim();
    let matches: Vec<&Parameter<T>> = match name.rsplit_once('.') {
        Some((declaring, member)) => parameters
            .iter()
            .filter(|p| p.declaring_type == declaring && p.name == member)
            .collect(),
        None => parameters.iter().filter(|p| p.name == name).collect(),
    };

    match matches.as_slice() {
        [] => Err(ResolveError::Unknown(name.to_string())),
        [single] => Ok(*single),
        many => Err(ResolveError::Ambiguous {
            name: name.to_string(),
            candidates: many.iter().map(|p| p.qualified_name()).collect(),
        }),
    }
}

/// An entity schema the selection engine can filter and sort
pub trait Filterable: Sized + 'static {
    /// Name of the base schema, used in messages
    const TYPE_NAME: &'static str;

    /// The schema's accessor table
    fn parameters() -> &'static [Parameter<Self>];

    fn id(&self) -> EntityId;

    fn sex(&self) -> Sex;

    fn attributes(&self) -> &Attributes;

    fn resolve_parameter(name: &str) -> Result<&'static Parameter<Self>, ResolveError> {
        resolve(Self::parameters(), name)
    }

    /// True when some members are carried by one sex only
    fn is_sex_specialized() -> bool {
        Self::parameters().iter().any(|p| p.declared_for.is_some())
    }

    /// Qualified names of every selectable member, sorted
    fn parameter_names() -> Vec<String> {
        let mut names: Vec<String> = Self::parameters()
            .iter()
            .map(|p| p.qualified_name())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        age: i64,
        milk: Option<f64>,
    }

    fn table() -> Vec<Parameter<Probe>> {
        vec![
            Parameter::new("Probe", "Age", ValueKind::Int, |p: &Probe| Some(Value::Int(p.age))),
            Parameter::new("ProbeFemale", "Milk", ValueKind::Float, |p: &Probe| {
                p.milk.map(Value::Float)
            })
            .only_for(Sex::Female),
            Parameter::new("ProbeMale", "Milk", ValueKind::Float, |_: &Probe| None).only_for(Sex::Male),
        ]
    }

    #[test]
    fn test_resolve_bare_name() {
        let table = table();
        let param = resolve(&table, "Age").unwrap();
        assert_eq!(param.qualified_name(), "Probe.Age");
        assert_eq!(param.read(&Probe { age: 4, milk: None }), Some(Value::Int(4)));
    }

    #[test]
    fn test_resolve_qualified_name() {
        let table = table();
        let param = resolve(&table, "ProbeFemale.Milk").unwrap();
        assert_eq!(param.declared_for, Some(Sex::Female));
        assert_eq!(
            param.read(&Probe { age: 1, milk: Some(2.5) }),
            Some(Value::Float(2.5))
        );
    }

    #[test]
    fn test_resolve_ambiguous_bare_name() {
        let table = table();
        match resolve(&table, "Milk") {
            Err(ResolveError::Ambiguous { candidates, .. }) => {
                assert_eq!(candidates, vec!["ProbeFemale.Milk", "ProbeMale.Milk"]);
            }
            other => panic!("Expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_unknown() {
        let table = table();
        assert_eq!(
            resolve(&table, "Weight").unwrap_err(),
            ResolveError::Unknown("Weight".to_string())
        );
        assert!(resolve(&table, "Probe.Milk").is_err());
    }
}
