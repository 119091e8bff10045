//! Selectable entity schemas and their accessor registries

pub mod attributes;
pub mod cohort;
pub mod labour;
pub mod parameter;
pub mod ruminant;
pub mod value;

pub use attributes::{AttributeValue, Attributes};
pub use cohort::RuminantCohort;
pub use labour::LabourType;
pub use parameter::{Filterable, Parameter, ResolveError};
pub use ruminant::{FemaleDetails, MaleDetails, Ruminant, RuminantSex};
pub use value::{EnumDomain, Value, ValueKind};

use crate::core::types::{HerdChangeReason, Sex};

/// Variant names for every `Sex` member
pub static SEX_DOMAIN: EnumDomain = EnumDomain {
    name: "Sex",
    variants: &["Female", "Male"],
};

/// Variant names for sale/change flags
pub static HERD_CHANGE_DOMAIN: EnumDomain = EnumDomain {
    name: "HerdChangeReason",
    variants: HerdChangeReason::NAMES,
};

/// Read a sex as a value in [`SEX_DOMAIN`]
pub fn sex_value(sex: Sex) -> Value {
    match sex {
        Sex::Female => Value::Enum(0),
        Sex::Male => Value::Enum(1),
    }
}
