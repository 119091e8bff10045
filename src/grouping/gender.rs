//! Sex-partition handling for sex-specialized schemas
//!
//! Some members exist only on females or only on males. Before evaluating a
//! group, the sex each term implies is folded into one requirement. A group
//! that needs both sexes at once can never match and is short-circuited; a
//! group that needs one sex is evaluated only against that partition.

use crate::core::types::Sex;
use crate::entity::parameter::Filterable;
use crate::entity::SEX_DOMAIN;
use crate::grouping::term::{FilterTerm, Operator};

/// Member that every sex-specialized schema exposes for the individual's sex
pub const SEX_PARAMETER: &str = "Sex";

/// Sex requirement implied by one term or by a whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexAffinity {
    /// No sex implied
    Either,
    /// Only individuals of this sex can match
    Only(Sex),
    /// Terms imply two different sexes; nothing can match
    Both,
}

impl SexAffinity {
    /// Left fold step: `Either` is neutral, different sexes give `Both`
    pub fn combine(self, other: SexAffinity) -> SexAffinity {
        match (self, other) {
            (SexAffinity::Both, _) | (_, SexAffinity::Both) => SexAffinity::Both,
            (SexAffinity::Either, x) | (x, SexAffinity::Either) => x,
            (SexAffinity::Only(a), SexAffinity::Only(b)) if a == b => SexAffinity::Only(a),
            (SexAffinity::Only(_), SexAffinity::Only(_)) => SexAffinity::Both,
        }
    }
}

/// Sex implied by a single term.
///
/// Members declared by one sex imply that sex. A comparison on the sex member
/// itself implies the named sex for `Equal` and the other sex for `NotEqual`.
/// Terms that do not resolve imply nothing; they are reported by validation.
pub fn term_affinity<T: Filterable>(term: &FilterTerm) -> SexAffinity {
    let member = match T::resolve_parameter(&term.parameter) {
        Ok(member) => member,
        Err(_) => return SexAffinity::Either,
    };

    if let Some(sex) = member.declared_for {
        return SexAffinity::Only(sex);
    }

    if member.name == SEX_PARAMETER {
        let named = term
            .value_str()
            .and_then(|v| SEX_DOMAIN.parse(v))
            .map(|index| if index == 0 { Sex::Female } else { Sex::Male });
        return match (term.operator, named) {
            (Operator::Equal, Some(sex)) => SexAffinity::Only(sex),
            (Operator::NotEqual, Some(sex)) => SexAffinity::Only(sex.opposite()),
            _ => SexAffinity::Either,
        };
    }

    SexAffinity::Either
}

/// Fold the affinities of all terms, left to right
pub fn fold_affinity<T: Filterable>(terms: &[FilterTerm]) -> SexAffinity {
    terms
        .iter()
        .map(term_affinity::<T>)
        .fold(SexAffinity::Either, SexAffinity::combine)
}

/// The equality term added when a group is evaluated against one sex
pub fn implied_term(sex: Sex) -> FilterTerm {
    FilterTerm::new(SEX_PARAMETER, Operator::Equal, sex.as_str()).with_name("Implied sex")
}

/// Individuals of one sex, compared directly rather than through a predicate
pub fn partition<'a, T, I>(source: I, sex: Sex) -> Vec<&'a T>
where
    T: Filterable,
    I: IntoIterator<Item = &'a T>,
{
    source.into_iter().filter(|item| item.sex() == sex).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LabourType, Ruminant};

    #[test]
    fn test_combine_rules() {
        let f = SexAffinity::Only(Sex::Female);
        let m = SexAffinity::Only(Sex::Male);
        assert_eq!(SexAffinity::Either.combine(f), f);
        assert_eq!(f.combine(SexAffinity::Either), f);
        assert_eq!(f.combine(f), f);
        assert_eq!(f.combine(m), SexAffinity::Both);
        assert_eq!(SexAffinity::Both.combine(SexAffinity::Either), SexAffinity::Both);
    }

    #[test]
    fn test_term_affinity_from_declaring_sex() {
        let lactating = FilterTerm::truth("IsLactating", Operator::IsTrue);
        assert_eq!(
            term_affinity::<Ruminant>(&lactating),
            SexAffinity::Only(Sex::Female)
        );
        let sire = FilterTerm::truth("RuminantMale.IsSire", Operator::IsTrue);
        assert_eq!(term_affinity::<Ruminant>(&sire), SexAffinity::Only(Sex::Male));
        let age = FilterTerm::new("Age", Operator::GreaterThan, "12");
        assert_eq!(term_affinity::<Ruminant>(&age), SexAffinity::Either);
    }

    #[test]
    fn test_term_affinity_from_sex_member() {
        let female = FilterTerm::new("Sex", Operator::Equal, "female");
        assert_eq!(term_affinity::<Ruminant>(&female), SexAffinity::Only(Sex::Female));
        let not_female = FilterTerm::new("Sex", Operator::NotEqual, "Female");
        assert_eq!(term_affinity::<Ruminant>(&not_female), SexAffinity::Only(Sex::Male));
        let labour = FilterTerm::new("Sex", Operator::Equal, "Male");
        assert_eq!(term_affinity::<LabourType>(&labour), SexAffinity::Only(Sex::Male));
    }

    #[test]
    fn test_fold_mixed_sexes_is_both() {
        let terms = vec![
            FilterTerm::new("Age", Operator::GreaterThan, "12"),
            FilterTerm::truth("IsLactating", Operator::IsTrue),
            FilterTerm::truth("IsSire", Operator::IsTrue),
        ];
        assert_eq!(fold_affinity::<Ruminant>(&terms), SexAffinity::Both);
    }

    #[test]
    fn test_partition_by_sex() {
        let herd = vec![
            Ruminant::female(1, 30, 350.0),
            Ruminant::male(2, 30, 450.0),
            Ruminant::female(3, 10, 150.0),
        ];
        let ids: Vec<u32> = partition(&herd, Sex::Female).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
