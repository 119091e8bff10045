//! Named indirection to another configured group
//!
//! A link names its target by `Owner.Name` (or by bare name when that is
//! unique) and searches the subtree enclosing its owner unless given an
//! explicit scope. It is resolved once, before a run, to the target's [`GroupId`];
//! after that every call is forwarded to the target through the id, so a
//! later rename of the target does not re-point the link.

use rand::Rng;

use crate::core::error::{Result, SelectionError};
use crate::core::types::GroupId;
use crate::entity::parameter::Filterable;
use crate::grouping::catalog::{qualified, GroupCatalog, SelectionGroup};
use crate::grouping::sort::SortChain;
use crate::grouping::validation::ConfigIssue;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupLink {
    pub name: String,
    pub owner: String,
    /// Target group as `Owner.Name` or a bare name
    pub target: String,
    /// Owner path that limits the search; `None` searches the subtree
    /// enclosing the link's owner, an empty path the whole catalog
    pub scope: Option<String>,
    /// Disabled links are never validated, resolved or run
    pub enabled: bool,
    resolved: Option<GroupId>,
}

impl GroupLink {
    pub fn new(owner: &str, name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            target: target.trim().to_string(),
            scope: None,
            enabled: true,
            resolved: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn full_name(&self) -> String {
        qualified(&self.owner, &self.name)
    }

    pub fn resolved(&self) -> Option<GroupId> {
        self.resolved
    }

    /// Owner path the search is limited to
    pub fn search_scope(&self) -> &str {
        match &self.scope {
            Some(scope) => scope,
            None => self
                .owner
                .rsplit_once('.')
                .map(|(parent, _)| parent)
                .unwrap_or(""),
        }
    }

    fn in_scope(&self, owner: &str) -> bool {
        let scope = self.search_scope();
        scope.is_empty()
            || owner == scope
            || owner
                .strip_prefix(scope)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    fn names<T: Filterable>(&self, group: &SelectionGroup<T>) -> bool {
        if self.target.contains('.') {
            group.full_name() == self.target
        } else {
            group.name == self.target
        }
    }

    fn issue(&self, message: String) -> ConfigIssue {
        ConfigIssue::new(&self.owner, self.full_name(), "target", message)
    }

    /// Find the single enabled group this link names, without binding it
    pub fn locate<T: Filterable>(
        &self,
        catalog: &GroupCatalog<T>,
    ) -> std::result::Result<GroupId, ConfigIssue> {
        if self.target.is_empty() {
            return Err(self.issue("No target group has been named".to_string()));
        }

        let candidates: Vec<&SelectionGroup<T>> = catalog
            .enabled()
            .filter(|g| self.in_scope(&g.owner) && self.names(g))
            .collect();

        match candidates.as_slice() {
            [] => Err(self.issue(format!(
                "Unable to find an enabled {} group named [{}]",
                T::TYPE_NAME,
                self.target
            ))),
            [single] => Ok(single.id),
            many => Err(self.issue(format!(
                "The group name [{}] is ambiguous, use one of [{}]",
                self.target,
                many.iter()
                    .map(|g| g.full_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    pub(crate) fn bind(&mut self, id: GroupId) {
        tracing::debug!(link = %self.full_name(), target = %self.target, %id, "resolved group link");
        self.resolved = Some(id);
    }

    /// Bind the link to its target for the rest of the run
    pub fn resolve<T: Filterable>(&mut self, catalog: &GroupCatalog<T>) -> Result<GroupId> {
        let id = self.locate(catalog)?;
        self.bind(id);
        Ok(id)
    }

    fn target_group<'c, T: Filterable>(
        &self,
        catalog: &'c GroupCatalog<T>,
    ) -> Result<&'c SelectionGroup<T>> {
        let id = self.resolved.ok_or_else(|| {
            SelectionError::Evaluation(format!(
                "Group link [{}] to [{}] has not been resolved",
                self.full_name(),
                self.target
            ))
        })?;
        catalog.target(id)
    }

    /// The target's filter step
    pub fn filter<'a, T, I, R>(
        &self,
        catalog: &GroupCatalog<T>,
        source: I,
        rng: &mut R,
    ) -> Result<Vec<&'a T>>
    where
        T: Filterable,
        I: IntoIterator<Item = &'a T>,
        R: Rng + ?Sized,
    {
        self.target_group(catalog)?.filter.filter(source, rng)
    }

    /// The target's sort chain
    pub fn sort_chain<'c, T: Filterable>(
        &self,
        catalog: &'c GroupCatalog<T>,
    ) -> Result<&'c SortChain<T>> {
        Ok(&self.target_group(catalog)?.sort)
    }

    /// The target's full filter, sort and window pipeline
    pub fn select<'a, T, I, R>(
        &self,
        catalog: &GroupCatalog<T>,
        source: I,
        rng: &mut R,
    ) -> Result<Vec<&'a T>>
    where
        T: Filterable,
        I: IntoIterator<Item = &'a T>,
        R: Rng + ?Sized,
    {
        self.target_group(catalog)?.select(source, rng)
    }

    pub fn matches<T: Filterable>(&self, catalog: &GroupCatalog<T>, item: &T) -> Result<bool> {
        self.target_group(catalog)?.matches(item)
    }
}
