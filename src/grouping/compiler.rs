//! Compiles filter terms into predicates
//!
//! A term is first bound into a small rule AST (member, operator, literal):
//! the parameter name is resolved against the schema's accessor registry, the
//! operator is checked against the member's kind and the literal is parsed
//! into that kind. The AST is then closed over into a [`CompiledPredicate`].
//! All parsing happens here, never per individual.

use std::fmt;

use thiserror::Error;

use crate::entity::parameter::{Filterable, Parameter, ResolveError};
use crate::entity::value::{Value, ValueKind};
use crate::grouping::term::{FilterTerm, Operator};
use crate::grouping::validation::ConfigIssue;

/// Why a term could not be compiled
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("{0}")]
    UnknownParameter(ResolveError),

    #[error("A value to compare with [{parameter}] is required")]
    MissingValue { parameter: String },

    #[error("The value to compare is not valid for [{parameter}]: {message}")]
    InvalidValue { parameter: String, message: String },

    #[error("Invalid operator of type [{operator}] for [{type_name}] property [{parameter}]")]
    UnsupportedOperator {
        operator: Operator,
        type_name: &'static str,
        parameter: String,
    },
}

impl CompileError {
    /// Field of the term the error points at
    pub fn field(&self) -> &'static str {
        match self {
            CompileError::UnknownParameter(_) => "parameter",
            CompileError::MissingValue { .. } | CompileError::InvalidValue { .. } => "value",
            CompileError::UnsupportedOperator { .. } => "operator",
        }
    }

    pub fn into_issue(self, owner: &str, term: &FilterTerm) -> ConfigIssue {
        ConfigIssue::new(owner, term.label(), self.field(), self.to_string())
    }
}

/// A bound term: resolved member, operator and parsed literal
pub struct RuleAst<T: 'static> {
    pub member: &'static Parameter<T>,
    pub operator: Operator,
    pub literal: Value,
}

impl<T: 'static> fmt::Debug for RuleAst<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleAst")
            .field("member", &self.member.qualified_name())
            .field("operator", &self.operator)
            .field("literal", &self.literal)
            .finish()
    }
}

/// Resolve and type-check one term
pub fn bind<T: Filterable>(term: &FilterTerm) -> Result<RuleAst<T>, CompileError> {
    let member = T::resolve_parameter(&term.parameter).map_err(CompileError::UnknownParameter)?;

    if !term.operator.supports(&member.kind) {
        return Err(CompileError::UnsupportedOperator {
            operator: term.operator,
            type_name: member.kind.type_name(),
            parameter: term.parameter.clone(),
        });
    }

    let literal = if term.operator.is_truth_test() {
        Value::Bool(term.operator == Operator::IsTrue)
    } else {
        let raw = term.value_str().ok_or_else(|| CompileError::MissingValue {
            parameter: term.parameter.clone(),
        })?;
        match member.kind {
            ValueKind::Text => Value::Text(raw.to_string()),
            kind => kind.parse(raw).map_err(|message| CompileError::InvalidValue {
                parameter: term.parameter.clone(),
                message,
            })?,
        }
    };

    Ok(RuleAst {
        member,
        operator: term.operator,
        literal,
    })
}

/// A reusable `T -> bool` test built from one term
pub struct CompiledPredicate<T> {
    label: String,
    test: Box<dyn Fn(&T) -> bool>,
}

impl<T: Filterable> CompiledPredicate<T> {
    /// Close over a bound rule.
    ///
    /// Individuals that do not carry the member fail the predicate.
    pub fn from_ast(label: String, ast: RuleAst<T>) -> Self {
        let RuleAst {
            member,
            operator,
            literal,
        } = ast;
        let test = move |item: &T| match member.read(item) {
            Some(value) => value
                .compare(&literal)
                .map(|ordering| operator.holds(ordering))
                .unwrap_or(false),
            None => false,
        };
        Self {
            label,
            test: Box::new(test),
        }
    }

    pub fn evaluate(&self, item: &T) -> bool {
        (self.test)(item)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> fmt::Debug for CompiledPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("label", &self.label)
            .finish()
    }
}

/// Compile one term for schema `T`
pub fn compile<T: Filterable>(term: &FilterTerm) -> Result<CompiledPredicate<T>, CompileError> {
    let ast = bind::<T>(term)?;
    Ok(CompiledPredicate::from_ast(term.label(), ast))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{HerdChangeReason, Sex};
    use crate::entity::{LabourType, Ruminant};

    #[test]
    fn test_compile_numeric_comparison() {
        let predicate = compile::<Ruminant>(&FilterTerm::new(
            "Age",
            Operator::GreaterThanOrEqual,
            "24",
        ))
        .unwrap();
        assert!(predicate.evaluate(&Ruminant::female(1, 24, 300.0)));
        assert!(!predicate.evaluate(&Ruminant::female(2, 23, 300.0)));
    }

    #[test]
    fn test_compile_float_member_with_integer_literal() {
        let predicate =
            compile::<Ruminant>(&FilterTerm::new("Weight", Operator::LessThan, "300")).unwrap();
        assert!(predicate.evaluate(&Ruminant::male(1, 12, 299.5)));
        assert!(!predicate.evaluate(&Ruminant::male(2, 12, 300.0)));
    }

    #[test]
    fn test_compile_enum_is_case_insensitive() {
        let predicate =
            compile::<Ruminant>(&FilterTerm::new("SaleFlag", Operator::Equal, "maxagesale"))
                .unwrap();
        let mut old = Ruminant::female(1, 150, 400.0);
        old.sale_flag = HerdChangeReason::MaxAgeSale;
        assert!(predicate.evaluate(&old));
        assert!(!predicate.evaluate(&Ruminant::female(2, 30, 400.0)));
    }

    #[test]
    fn test_compile_truth_tests() {
        let is_true =
            compile::<LabourType>(&FilterTerm::truth("Hired", Operator::IsTrue)).unwrap();
        let is_false =
            compile::<LabourType>(&FilterTerm::truth("Hired", Operator::IsFalse)).unwrap();
        let hired = LabourType::new(1, "A", Sex::Female, 30).hired();
        assert!(is_true.evaluate(&hired));
        assert!(!is_false.evaluate(&hired));
    }

    #[test]
    fn test_female_member_on_male_is_false() {
        let predicate =
            compile::<Ruminant>(&FilterTerm::new("IsLactating", Operator::NotEqual, "true"))
                .unwrap();
        assert!(!predicate.evaluate(&Ruminant::male(1, 30, 400.0)));
        assert!(predicate.evaluate(&Ruminant::female(2, 30, 400.0)));
    }

    #[test]
    fn test_unknown_parameter() {
        let err = compile::<Ruminant>(&FilterTerm::new("Horns", Operator::Equal, "2")).unwrap_err();
        assert_eq!(err.field(), "parameter");
        assert!(err.to_string().contains("Horns"));
    }

    #[test]
    fn test_invalid_literal() {
        let err =
            compile::<Ruminant>(&FilterTerm::new("Age", Operator::Equal, "old")).unwrap_err();
        assert!(matches!(err, CompileError::InvalidValue { .. }));

        let err = compile::<Ruminant>(&FilterTerm::new("Sex", Operator::Equal, "Steer"))
            .unwrap_err();
        assert!(err.to_string().contains("Female,Male"));
    }

    #[test]
    fn test_missing_value() {
        let mut term = FilterTerm::new("Age", Operator::Equal, "");
        assert!(matches!(
            compile::<Ruminant>(&term).unwrap_err(),
            CompileError::MissingValue { .. }
        ));
        term.value = None;
        assert!(compile::<Ruminant>(&term).is_err());
    }

    #[test]
    fn test_unsupported_operators() {
        let ordering_on_bool =
            compile::<Ruminant>(&FilterTerm::new("Weaned", Operator::GreaterThan, "true"));
        assert!(matches!(
            ordering_on_bool.unwrap_err(),
            CompileError::UnsupportedOperator { .. }
        ));

        let truth_on_number = compile::<Ruminant>(&FilterTerm::truth("Age", Operator::IsTrue));
        let err = truth_on_number.unwrap_err();
        assert_eq!(err.field(), "operator");
        assert!(err.to_string().contains("[Int]"));
    }

    #[test]
    fn test_into_issue_locates_term() {
        let term = FilterTerm::new("Horns", Operator::Equal, "2").with_name("HornFilter");
        let issue = compile::<Ruminant>(&term)
            .unwrap_err()
            .into_issue("Farm.Herd.Cull", &term);
        assert_eq!(issue.owner, "Farm.Herd.Cull");
        assert_eq!(issue.item, "HornFilter");
        assert_eq!(issue.field, "parameter");
    }
}
