//! Selection groups and the catalog that owns them
//!
//! A [`SelectionGroup`] is the full pipeline for one configured group:
//! filter, then sort, then each window in turn. The catalog hands every group
//! a stable [`GroupId`] when it is added; links resolve to those ids.

use rand::Rng;

use crate::core::error::{Result, SelectionError};
use crate::core::types::GroupId;
use crate::entity::parameter::Filterable;
use crate::grouping::filter_group::FilterGroup;
use crate::grouping::link::GroupLink;
use crate::grouping::sort::SortChain;
use crate::grouping::validation::{ConfigIssue, ValidationReport};
use crate::grouping::window::Window;

/// Join an owner path and a name into `Owner.Name`
pub fn qualified(owner: &str, name: &str) -> String {
    if owner.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", owner, name)
    }
}

#[derive(Debug)]
pub struct SelectionGroup<T: 'static> {
    /// Assigned by [`GroupCatalog::add`]
    pub id: GroupId,
    pub name: String,
    pub owner: String,
    pub enabled: bool,
    pub filter: FilterGroup<T>,
    pub sort: SortChain<T>,
    pub windows: Vec<Window>,
}

impl<T: Filterable> SelectionGroup<T> {
    pub fn new(owner: &str, name: &str) -> Self {
        let full_name = qualified(owner, name);
        Self {
            id: GroupId(0),
            name: name.to_string(),
            owner: owner.to_string(),
            enabled: true,
            filter: FilterGroup::new(&full_name),
            sort: SortChain::new(&full_name),
            windows: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: FilterGroup<T>) -> Self {
        self.filter = filter;
        self.filter.name = self.full_name();
        self
    }

    pub fn with_sort(mut self, sort: SortChain<T>) -> Self {
        self.sort = sort;
        self.sort.owner = self.full_name();
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.windows.push(window);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn full_name(&self) -> String {
        qualified(&self.owner, &self.name)
    }

    /// Filter, sort, then window the source
    pub fn select<'a, I, R>(&self, source: I, rng: &mut R) -> Result<Vec<&'a T>>
    where
        I: IntoIterator<Item = &'a T>,
        R: Rng + ?Sized,
    {
        let filtered = self.filter.filter(source, rng)?;
        let mut ordered = self.sort.sort(filtered, rng)?;
        for window in &self.windows {
            ordered = window.apply(ordered);
        }
        Ok(ordered)
    }

    pub fn matches(&self, item: &T) -> Result<bool> {
        self.filter.matches(item)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let owner = self.full_name();
        let mut issues = self.filter.validate();
        issues.extend(self.sort.validate());
        for window in &self.windows {
            issues.extend(window.validate(&owner));
        }
        issues
    }
}

/// All groups and links configured for one entity schema
#[derive(Debug)]
pub struct GroupCatalog<T: 'static> {
    groups: Vec<SelectionGroup<T>>,
    links: Vec<GroupLink>,
}

impl<T: 'static> Default for GroupCatalog<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            links: Vec::new(),
        }
    }
}

impl<T: Filterable> GroupCatalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group and assign its id
    pub fn add(&mut self, mut group: SelectionGroup<T>) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        group.id = id;
        self.groups.push(group);
        id
    }

    pub fn get(&self, id: GroupId) -> Option<&SelectionGroup<T>> {
        self.groups.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut SelectionGroup<T>> {
        self.groups.get_mut(id.0 as usize)
    }

    /// Find a group by its qualified name
    pub fn find(&self, full_name: &str) -> Option<&SelectionGroup<T>> {
        self.groups.iter().find(|g| g.full_name() == full_name)
    }

    pub fn groups(&self) -> &[SelectionGroup<T>] {
        &self.groups
    }

    pub fn enabled(&self) -> impl Iterator<Item = &SelectionGroup<T>> {
        self.groups.iter().filter(|g| g.enabled)
    }

    pub fn add_link(&mut self, link: GroupLink) {
        self.links.push(link);
    }

    pub fn links(&self) -> &[GroupLink] {
        &self.links
    }

    pub fn link(&self, full_name: &str) -> Option<&GroupLink> {
        self.links.iter().find(|l| l.full_name() == full_name)
    }

    pub fn enabled_links(&self) -> impl Iterator<Item = &GroupLink> {
        self.links.iter().filter(|l| l.enabled)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.links.is_empty()
    }

    /// Bind every enabled link to its target, collecting the links that fail
    pub fn resolve_links(&mut self) -> Vec<ConfigIssue> {
        let mut links = std::mem::take(&mut self.links);
        let mut issues = Vec::new();
        for link in links.iter_mut().filter(|l| l.enabled) {
            match link.locate(&*self) {
                Ok(id) => link.bind(id),
                Err(issue) => issues.push(issue),
            }
        }
        self.links = links;
        issues
    }

    /// Check every enabled group and every link in one pass
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for group in self.enabled() {
            report.add_issues(group.validate());
        }
        for link in self.enabled_links() {
            if let Err(issue) = link.locate(self) {
                report.add(issue);
            }
        }
        for issue in &report.issues {
            tracing::warn!(owner = %issue.owner, item = %issue.item, field = %issue.field, "{}", issue.message);
        }
        report
    }

    /// Run every enabled group and every enabled link over one population
    pub fn select_all<'a, R: Rng + ?Sized>(
        &self,
        source: &'a [T],
        rng: &mut R,
    ) -> Result<Vec<(String, Vec<&'a T>)>> {
        let mut results = Vec::with_capacity(self.groups.len() + self.links.len());
        for group in self.enabled() {
            results.push((group.full_name(), group.select(source, rng)?));
        }
        for link in self.enabled_links() {
            results.push((link.full_name(), link.select(self, source, rng)?));
        }
        Ok(results)
    }

    /// The group a resolved id points at, or an evaluation error
    pub fn target(&self, id: GroupId) -> Result<&SelectionGroup<T>> {
        self.get(id)
            .ok_or_else(|| SelectionError::Evaluation(format!("No group with id {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Ruminant;
    use crate::grouping::sort::{SortDirection, SortKey};
    use crate::grouping::term::{FilterTerm, Operator};
    use crate::grouping::window::{WindowPosition, WindowStyle};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn herd() -> Vec<Ruminant> {
        [10, 20, 20, 5, 30]
            .iter()
            .enumerate()
            .map(|(i, age)| Ruminant::female(i as u32 + 1, *age, 200.0))
            .collect()
    }

    fn cull() -> SelectionGroup<Ruminant> {
        SelectionGroup::new("Farm.Herd", "Cull")
            .with_filter(FilterGroup::with_terms(
                "",
                vec![FilterTerm::new("Age", Operator::GreaterThanOrEqual, "10")],
            ))
            .with_sort(
                SortChain::new("").then(SortKey::member("Age", SortDirection::Ascending).unwrap()),
            )
            .with_window(Window::take(2))
    }

    #[test]
    fn test_pipeline_filter_sort_window() {
        let herd = herd();
        let group = cull();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ages: Vec<i64> = group
            .select(&herd, &mut rng)
            .unwrap()
            .iter()
            .map(|r| r.age)
            .collect();
        assert_eq!(ages, vec![10, 20]);
    }

    #[test]
    fn test_child_names_follow_group() {
        let group = cull();
        assert_eq!(group.full_name(), "Farm.Herd.Cull");
        assert_eq!(group.filter.name, "Farm.Herd.Cull");
        assert_eq!(group.sort.owner, "Farm.Herd.Cull");
    }

    #[test]
    fn test_catalog_assigns_ids() {
        let mut catalog = GroupCatalog::new();
        let a = catalog.add(cull());
        let b = catalog.add(SelectionGroup::new("Farm.Herd", "Keep"));
        assert_eq!(a, GroupId(0));
        assert_eq!(b, GroupId(1));
        assert_eq!(catalog.get(b).unwrap().name, "Keep");
        assert_eq!(catalog.find("Farm.Herd.Cull").unwrap().id, a);
        assert!(catalog.find("Farm.Cull").is_none());
    }

    #[test]
    fn test_validate_skips_disabled_groups() {
        let broken = SelectionGroup::new("Farm.Herd", "Broken").with_window(Window::new(
            WindowStyle::TakeProportion,
            WindowPosition::Start,
            2.0,
        ));
        let mut catalog = GroupCatalog::<Ruminant>::new();
        catalog.add(broken);
        assert_eq!(catalog.validate().len(), 1);

        let mut catalog = GroupCatalog::<Ruminant>::new();
        catalog.add(
            SelectionGroup::new("Farm.Herd", "Broken")
                .with_window(Window::new(WindowStyle::TakeProportion, WindowPosition::Start, 2.0))
                .disabled(),
        );
        assert!(catalog.validate().is_valid());
    }

    #[test]
    fn test_select_all_runs_enabled_groups() {
        let herd = herd();
        let mut catalog = GroupCatalog::new();
        catalog.add(cull());
        catalog.add(SelectionGroup::new("Farm.Herd", "Off").disabled());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let results = catalog.select_all(&herd, &mut rng).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "Farm.Herd.Cull");
        assert_eq!(results[0].1.len(), 2);
    }

    #[test]
    fn test_disabled_links_are_skipped() {
        let herd = herd();
        let mut catalog = GroupCatalog::new();
        catalog.add(cull());
        catalog.add_link(GroupLink::new("Farm.Dairy", "Gone", "Farm.Herd.Nobody").disabled());
        assert!(catalog.validate().is_valid());
        assert!(catalog.resolve_links().is_empty());
        assert_eq!(catalog.links()[0].resolved(), None);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let results = catalog.select_all(&herd, &mut rng).unwrap();
        assert_eq!(results.len(), 1);
    }
}
