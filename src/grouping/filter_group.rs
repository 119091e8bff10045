//! Filter groups: AND-combined terms with optional proportional sampling

use once_cell::unsync::OnceCell;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::core::config::ProportionPolicy;
use crate::core::error::{Result, SelectionError};
use crate::entity::parameter::Filterable;
use crate::grouping::compiler::{compile, CompiledPredicate};
use crate::grouping::gender::{self, SexAffinity, SEX_PARAMETER};
use crate::grouping::term::FilterTerm;
use crate::grouping::validation::ConfigIssue;

/// The compiled, AND-combined predicates of one group
pub struct CombinedRules<T> {
    pub requirement: SexAffinity,
    pub predicates: Vec<CompiledPredicate<T>>,
}

impl<T: Filterable> CombinedRules<T> {
    fn build(owner: &str, terms: &[FilterTerm]) -> std::result::Result<Self, ConfigIssue> {
        let requirement = if T::is_sex_specialized() {
            gender::fold_affinity::<T>(terms)
        } else {
            SexAffinity::Either
        };

        let mut predicates = Vec::with_capacity(terms.len() + 1);
        if requirement != SexAffinity::Both {
            for term in terms {
                predicates.push(compile::<T>(term).map_err(|e| e.into_issue(owner, term))?);
            }
        }

        if let SexAffinity::Only(sex) = requirement {
            if T::resolve_parameter(SEX_PARAMETER).is_ok() {
                let implied = gender::implied_term(sex);
                predicates
                    .push(compile::<T>(&implied).map_err(|e| e.into_issue(owner, &implied))?);
            }
        }

        Ok(Self {
            requirement,
            predicates,
        })
    }

    /// Every predicate holds; stops at the first that does not
    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p.evaluate(item))
    }
}

/// An ordered set of filter terms applied as one conjunctive rule
pub struct FilterGroup<T> {
    /// Qualified `Owner.Name` of the group, used in messages
    pub name: String,
    terms: Vec<FilterTerm>,
    /// Fraction in (0, 1] of the filtered individuals to keep
    pub proportion: f64,
    pub proportion_policy: ProportionPolicy,
    rules: OnceCell<CombinedRules<T>>,
}

impl<T: Filterable> FilterGroup<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            terms: Vec::new(),
            proportion: 1.0,
            proportion_policy: ProportionPolicy::default(),
            rules: OnceCell::new(),
        }
    }

    pub fn with_terms(name: &str, terms: Vec<FilterTerm>) -> Self {
        let mut group = Self::new(name);
        group.terms = terms;
        group
    }

    pub fn with_proportion(mut self, proportion: f64) -> Self {
        self.proportion = proportion;
        self
    }

    pub fn with_policy(mut self, policy: ProportionPolicy) -> Self {
        self.proportion_policy = policy;
        self
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// Append a term; the compiled rules are rebuilt on next use
    pub fn add_term(&mut self, term: FilterTerm) {
        self.terms.push(term);
        self.rules = OnceCell::new();
    }

    /// Replace all terms; the compiled rules are rebuilt on next use
    pub fn set_terms(&mut self, terms: Vec<FilterTerm>) {
        self.terms = terms;
        self.rules = OnceCell::new();
    }

    pub fn is_compiled(&self) -> bool {
        self.rules.get().is_some()
    }

    /// The combined rules, compiled on first use and cached
    pub fn rules(&self) -> Result<&CombinedRules<T>> {
        self.rules.get_or_try_init(|| {
            let rules = CombinedRules::build(&self.name, &self.terms)
                .map_err(|issue| SelectionError::Evaluation(issue.to_string()))?;
            tracing::debug!(
                group = %self.name,
                terms = self.terms.len(),
                requirement = ?rules.requirement,
                "compiled filter rules"
            );
            Ok(rules)
        })
    }

    /// Individuals satisfying every term, in source order, then sampled
    pub fn filter<'a, I, R>(&self, source: I, rng: &mut R) -> Result<Vec<&'a T>>
    where
        I: IntoIterator<Item = &'a T>,
        R: Rng + ?Sized,
    {
        if self.terms.is_empty() {
            return Ok(source.into_iter().collect());
        }

        let rules = self.rules()?;
        let mut selected: Vec<&'a T> = match rules.requirement {
            SexAffinity::Both => {
                tracing::debug!(group = %self.name, "terms require both sexes, nothing selected");
                return Ok(Vec::new());
            }
            SexAffinity::Either => source.into_iter().filter(|i| rules.matches(i)).collect(),
            SexAffinity::Only(sex) => gender::partition(source, sex)
                .into_iter()
                .filter(|i| rules.matches(i))
                .collect(),
        };

        self.sample(&mut selected, rng);
        Ok(selected)
    }

    /// As [`filter`](Self::filter), for callers whose source may be absent
    pub fn try_filter<'a, I, R>(&self, source: Option<I>, rng: &mut R) -> Result<Vec<&'a T>>
    where
        I: IntoIterator<Item = &'a T>,
        R: Rng + ?Sized,
    {
        match source {
            Some(source) => self.filter(source, rng),
            None => Err(SelectionError::NullInput {
                group: self.name.clone(),
            }),
        }
    }

    /// Does a single individual satisfy every term
    pub fn matches(&self, item: &T) -> Result<bool> {
        if self.terms.is_empty() {
            return Ok(true);
        }
        let rules = self.rules()?;
        Ok(match rules.requirement {
            SexAffinity::Both => false,
            SexAffinity::Either => rules.matches(item),
            SexAffinity::Only(sex) => item.sex() == sex && rules.matches(item),
        })
    }

    fn sample<R: Rng + ?Sized>(&self, selected: &mut Vec<&T>, rng: &mut R) {
        if self.proportion >= 1.0 || selected.is_empty() {
            return;
        }
        selected.shuffle(rng);
        let keep = self
            .proportion_policy
            .sample_size(selected.len(), self.proportion);
        tracing::debug!(
            group = %self.name,
            filtered = selected.len(),
            keep,
            proportion = self.proportion,
            "proportional sample"
        );
        selected.truncate(keep);
    }

    /// Every problem with the terms and proportion, without stopping at the first
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .terms
            .iter()
            .filter_map(|term| compile::<T>(term).err().map(|e| e.into_issue(&self.name, term)))
            .collect();

        if !(self.proportion > 0.0 && self.proportion <= 1.0) {
            issues.push(ConfigIssue::new(
                &self.name,
                &self.name,
                "proportion",
                format!(
                    "Proportion [{}] must be greater than 0 and no more than 1",
                    self.proportion
                ),
            ));
        }
        issues
    }
}

impl<T> fmt::Debug for FilterGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterGroup")
            .field("name", &self.name)
            .field("terms", &self.terms)
            .field("proportion", &self.proportion)
            .field("proportion_policy", &self.proportion_policy)
            .field("compiled", &self.rules.get().is_some())
            .finish()
    }
}
