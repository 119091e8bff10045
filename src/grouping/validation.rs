//! Configuration problems collected by a validation pass

use std::fmt;

use crate::core::error::{Result, SelectionError};

/// One configuration problem, located by owner, item and field
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    /// Group (or link owner) that holds the offending item
    pub owner: String,
    /// Offending item, e.g. a filter term or sort key
    pub item: String,
    /// Field of the item that is wrong
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(
        owner: impl Into<String>,
        item: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            item: item.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] in [{}] ({}): {}",
            self.item, self.owner, self.field, self.message
        )
    }
}

/// Result of a validation pass over groups, sorts, windows and links
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn add(&mut self, issue: ConfigIssue) {
        self.issues.push(issue);
    }

    pub fn add_issues(&mut self, issues: Vec<ConfigIssue>) {
        self.issues.extend(issues);
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.issues.extend(other.issues);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues raised against one owner
    pub fn for_owner<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a ConfigIssue> {
        self.issues.iter().filter(move |i| i.owner == owner)
    }

    /// Turn a report with problems into an error
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SelectionError::InvalidConfiguration(self))
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  {}", issue)?;
        }
        Ok(())
    }
}
