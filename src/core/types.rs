//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a simulated individual (animal, worker or cohort)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable handle for a configured selection group, assigned at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sex of an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn opposite(&self) -> Sex {
        match self {
            Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason an individual is flagged to leave (or has joined) the herd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HerdChangeReason {
    #[default]
    None,
    Died,
    Consumed,
    MaxAgeSale,
    TradeSale,
    ExcessBreederSale,
    ExcessSireSale,
    ExcessHeiferSale,
    DryBreederSale,
    WeanerSale,
    Purchase,
    Born,
}

impl HerdChangeReason {
    /// Variant names in declaration order, used for literal parsing
    pub const NAMES: &'static [&'static str] = &[
        "None",
        "Died",
        "Consumed",
        "MaxAgeSale",
        "TradeSale",
        "ExcessBreederSale",
        "ExcessSireSale",
        "ExcessHeiferSale",
        "DryBreederSale",
        "WeanerSale",
        "Purchase",
        "Born",
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Which kind of entity a selection group operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Ruminant,
    Labour,
    Cohort,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Ruminant => f.write_str("ruminant"),
            EntityKind::Labour => f.write_str("labour"),
            EntityKind::Cohort => f.write_str("cohort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_opposite() {
        assert_eq!(Sex::Female.opposite(), Sex::Male);
        assert_eq!(Sex::Male.opposite(), Sex::Female);
    }

    #[test]
    fn test_herd_change_reason_names_match_indices() {
        assert_eq!(HerdChangeReason::NAMES[HerdChangeReason::None.index()], "None");
        assert_eq!(HerdChangeReason::NAMES[HerdChangeReason::Born.index()], "Born");
        assert_eq!(
            HerdChangeReason::NAMES[HerdChangeReason::DryBreederSale.index()],
            "DryBreederSale"
        );
    }

    #[test]
    fn test_entity_kind_deserializes_lowercase() {
        let kind: EntityKind = serde_json::from_str("\"cohort\"").unwrap();
        assert_eq!(kind, EntityKind::Cohort);
    }
}
