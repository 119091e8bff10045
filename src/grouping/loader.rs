//! Load selection groups from TOML and populations from JSON
//!
//! Loading builds typed catalogs but does not validate them. Problems found
//! while building (an unknown sort member, an unreadable fallback) are kept
//! and reported by the next [`SelectionSet::validate`] alongside everything
//! else.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::config::{EngineConfig, ProportionPolicy};
use crate::core::error::Result;
use crate::core::types::EntityKind;
use crate::entity::parameter::Filterable;
use crate::entity::{LabourType, Ruminant, RuminantCohort};
use crate::grouping::catalog::{qualified, GroupCatalog, SelectionGroup};
use crate::grouping::filter_group::FilterGroup;
use crate::grouping::link::GroupLink;
use crate::grouping::sort::{
    misplaced_random, AttributeValueType, SortChain, SortDirection, SortKey,
};
use crate::grouping::term::FilterTerm;
use crate::grouping::validation::{ConfigIssue, ValidationReport};
use crate::grouping::window::Window;

fn default_enabled() -> bool {
    true
}

fn default_proportion() -> f64 {
    1.0
}

/// What an attribute sort key reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    #[default]
    Exists,
    Value,
}

/// One `[[group.sort]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "lowercase")]
pub enum SortKeyDef {
    Member {
        #[serde(default)]
        name: String,
        parameter: String,
        #[serde(default)]
        direction: SortDirection,
    },
    Attribute {
        #[serde(default)]
        name: String,
        attribute: String,
        #[serde(default)]
        mode: AttributeMode,
        #[serde(default)]
        value_type: AttributeValueType,
        /// Used when the attribute is absent; any TOML scalar
        #[serde(default)]
        fallback: Option<toml::Value>,
        #[serde(default)]
        direction: SortDirection,
    },
    Random {
        #[serde(default)]
        name: String,
    },
}

impl SortKeyDef {
    fn name(&self) -> &str {
        match self {
            SortKeyDef::Member { name, parameter, .. } if name.is_empty() => parameter,
            SortKeyDef::Attribute { name, attribute, .. } if name.is_empty() => attribute,
            SortKeyDef::Random { name } if name.is_empty() => "Random",
            SortKeyDef::Member { name, .. }
            | SortKeyDef::Attribute { name, .. }
            | SortKeyDef::Random { name } => name,
        }
    }

    fn build<T: Filterable>(&self, owner: &str) -> std::result::Result<SortKey<T>, ConfigIssue> {
        let key = match self {
            SortKeyDef::Member {
                parameter,
                direction,
                ..
            } => SortKey::member(parameter, *direction)
                .map_err(|e| ConfigIssue::new(owner, self.name(), "parameter", e.to_string()))?,
            SortKeyDef::Attribute {
                attribute,
                mode: AttributeMode::Exists,
                direction,
                ..
            } => SortKey::attribute_exists(attribute, *direction),
            SortKeyDef::Attribute {
                attribute,
                mode: AttributeMode::Value,
                value_type,
                fallback,
                direction,
                ..
            } => {
                let fallback = fallback.as_ref().map(scalar_text);
                SortKey::attribute_value(attribute, *value_type, fallback.as_deref(), *direction)
                    .map_err(|e| ConfigIssue::new(owner, self.name(), "fallback", e.to_string()))?
            }
            SortKeyDef::Random { .. } => SortKey::random(),
        };
        Ok(key.with_name(self.name()))
    }
}

fn scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One `[[group]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDef {
    pub name: String,
    #[serde(default)]
    pub owner: String,
    pub kind: EntityKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_proportion")]
    pub proportion: f64,
    /// When set, this entry is a link to the named group
    #[serde(default)]
    pub link: Option<String>,
    /// Owner path that limits link resolution
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterTerm>,
    #[serde(default, rename = "sort")]
    pub sorts: Vec<SortKeyDef>,
    #[serde(default, rename = "window")]
    pub windows: Vec<Window>,
}

/// A complete definitions file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionDefinitions {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupDef>,
}

impl SelectionDefinitions {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

fn add_definition<T: Filterable>(
    catalog: &mut GroupCatalog<T>,
    def: &GroupDef,
    policy: ProportionPolicy,
    issues: &mut ValidationReport,
) {
    let full_name = qualified(&def.owner, &def.name);

    if let Some(target) = &def.link {
        let mut link = GroupLink::new(&def.owner, &def.name, target);
        if let Some(scope) = &def.scope {
            link = link.with_scope(scope);
        }
        link.enabled = def.enabled;
        let has_items = !def.filters.is_empty() || !def.sorts.is_empty() || !def.windows.is_empty();
        if def.enabled && has_items {
            issues.add(ConfigIssue::new(
                &def.owner,
                full_name,
                "link",
                "A linked group cannot define its own filter, sort or window items",
            ));
        }
        catalog.add_link(link);
        return;
    }

    let filter = FilterGroup::with_terms(&full_name, def.filters.clone())
        .with_proportion(def.proportion)
        .with_policy(policy);

    let mut sort = SortChain::new(&full_name);
    let mut built = Vec::with_capacity(def.sorts.len());
    for key in &def.sorts {
        match key.build::<T>(&full_name) {
            Ok(key) => {
                sort.push(key);
                built.push(true);
            }
            Err(issue) => {
                if def.enabled {
                    issues.add(issue);
                }
                built.push(false);
            }
        }
    }

    // A random key followed only by keys that failed to build is last in the
    // chain but not in the definition.
    if def.enabled {
        for (i, key) in def.sorts.iter().enumerate() {
            let later = &built[i + 1..];
            if matches!(key, SortKeyDef::Random { .. })
                && !later.is_empty()
                && !later.contains(&true)
            {
                issues.add(misplaced_random(&full_name, key.name()));
            }
        }
    }

    let mut group = SelectionGroup::new(&def.owner, &def.name)
        .with_filter(filter)
        .with_sort(sort);
    group.windows = def.windows.clone();
    group.enabled = def.enabled;

    let id = catalog.add(group);
    tracing::debug!(group = %full_name, %id, kind = T::TYPE_NAME, "loaded group");
}

/// Typed catalogs for every selectable schema
#[derive(Debug, Default)]
pub struct SelectionSet {
    pub engine: EngineConfig,
    pub ruminants: GroupCatalog<Ruminant>,
    pub labour: GroupCatalog<LabourType>,
    pub cohorts: GroupCatalog<RuminantCohort>,
    build_issues: ValidationReport,
}

impl SelectionSet {
    pub fn from_definitions(definitions: SelectionDefinitions) -> Self {
        let mut set = SelectionSet {
            engine: definitions.engine,
            ..Default::default()
        };
        let policy = set.engine.proportion_policy;
        for def in &definitions.groups {
            match def.kind {
                EntityKind::Ruminant => {
                    add_definition(&mut set.ruminants, def, policy, &mut set.build_issues)
                }
                EntityKind::Labour => {
                    add_definition(&mut set.labour, def, policy, &mut set.build_issues)
                }
                EntityKind::Cohort => {
                    add_definition(&mut set.cohorts, def, policy, &mut set.build_issues)
                }
            }
        }
        set
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(Self::from_definitions(SelectionDefinitions::from_toml_str(
            content,
        )?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Problems found while building keys from their definitions
    pub fn build_issues(&self) -> &ValidationReport {
        &self.build_issues
    }

    /// Bind every link in every catalog
    pub fn resolve_links(&mut self) -> ValidationReport {
        let mut report = ValidationReport::new();
        report.add_issues(self.ruminants.resolve_links());
        report.add_issues(self.labour.resolve_links());
        report.add_issues(self.cohorts.resolve_links());
        report
    }

    /// Every configuration problem across all catalogs
    pub fn validate(&self) -> ValidationReport {
        let mut report = self.build_issues.clone();
        report.merge(self.ruminants.validate());
        report.merge(self.labour.validate());
        report.merge(self.cohorts.validate());
        report
    }

    /// Start-of-run preparation: validate, then resolve links
    pub fn prepare(&mut self) -> Result<()> {
        self.validate().into_result()?;
        self.resolve_links().into_result()
    }
}

/// Individuals available to the selection engine for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Population {
    pub ruminants: Vec<Ruminant>,
    pub labour: Vec<LabourType>,
    pub cohorts: Vec<RuminantCohort>,
}

impl Population {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.ruminants.len() + self.labour.len() + self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
