//! Declarative selection of individuals: filter, sort and window
//!
//! Groups are configured once, validated before a run, then evaluated many
//! times. Every call takes the caller's random generator so a run is
//! reproducible from its seed.

pub mod catalog;
pub mod compiler;
pub mod filter_group;
pub mod gender;
pub mod link;
pub mod loader;
pub mod sort;
pub mod term;
pub mod validation;
pub mod window;

pub use catalog::{GroupCatalog, SelectionGroup};
pub use compiler::{compile, CompileError, CompiledPredicate, RuleAst};
pub use filter_group::{CombinedRules, FilterGroup};
pub use gender::SexAffinity;
pub use link::GroupLink;
pub use loader::{Population, SelectionDefinitions, SelectionSet};
pub use sort::{AttributeValueType, SortChain, SortDirection, SortKey, SortValue};
pub use term::{FilterTerm, Operator};
pub use validation::{ConfigIssue, ValidationReport};
pub use window::{Window, WindowPosition, WindowStyle};

use rand::Rng;

use crate::core::error::Result;
use crate::entity::parameter::Filterable;

/// Individuals of `collection` that satisfy `group`
pub fn filter<'a, T, R>(collection: &'a [T], group: &FilterGroup<T>, rng: &mut R) -> Result<Vec<&'a T>>
where
    T: Filterable,
    R: Rng + ?Sized,
{
    group.filter(collection, rng)
}

/// `collection` ordered by `chain`
pub fn sort<'a, T, R>(collection: Vec<&'a T>, chain: &SortChain<T>, rng: &mut R) -> Result<Vec<&'a T>>
where
    T: Filterable,
    R: Rng + ?Sized,
{
    chain.sort(collection, rng)
}

/// The part of an ordered collection that `window` covers
pub fn window<'a, T>(ordered: Vec<&'a T>, window: &Window) -> Vec<&'a T> {
    window.apply(ordered)
}
