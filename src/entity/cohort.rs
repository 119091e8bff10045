//! Animal cohorts: groups of identical animals tracked as one unit

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Sex};
use crate::entity::attributes::Attributes;
use crate::entity::parameter::{Filterable, Parameter};
use crate::entity::value::{Value, ValueKind};
use crate::entity::{sex_value, SEX_DOMAIN};

/// A cohort of animals sharing breed, sex, age and weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuminantCohort {
    pub id: EntityId,
    #[serde(default)]
    pub breed: String,
    pub sex: Sex,
    /// Age in months
    pub age: i64,
    /// Mean live weight (kg)
    pub weight: f64,
    /// Number of animals in the cohort
    pub number: i64,
    #[serde(default)]
    pub suckled: bool,
    #[serde(default)]
    pub sire: bool,
    #[serde(default)]
    pub attributes: Attributes,
}

impl RuminantCohort {
    pub fn new(id: u32, sex: Sex, age: i64, weight: f64, number: i64) -> Self {
        Self {
            id: EntityId(id),
            breed: String::new(),
            sex,
            age,
            weight,
            number,
            suckled: false,
            sire: false,
            attributes: Attributes::new(),
        }
    }
}

fn cohort(
    name: &'static str,
    kind: ValueKind,
    getter: fn(&RuminantCohort) -> Option<Value>,
) -> Parameter<RuminantCohort> {
    Parameter::new("RuminantTypeCohort", name, kind, getter)
}

static COHORT_PARAMETERS: Lazy<Vec<Parameter<RuminantCohort>>> = Lazy::new(|| {
    vec![
        cohort("ID", ValueKind::Int, |c| Some(Value::Int(c.id.0 as i64))),
        cohort("Breed", ValueKind::Text, |c| Some(Value::Text(c.breed.clone()))),
        cohort("Sex", ValueKind::Enum(&SEX_DOMAIN), |c| Some(sex_value(c.sex))),
        cohort("Age", ValueKind::Int, |c| Some(Value::Int(c.age))),
        cohort("Weight", ValueKind::Float, |c| Some(Value::Float(c.weight))),
        cohort("Number", ValueKind::Int, |c| Some(Value::Int(c.number))),
        cohort("Suckled", ValueKind::Bool, |c| Some(Value::Bool(c.suckled))),
        cohort("Sire", ValueKind::Bool, |c| Some(Value::Bool(c.sire))),
    ]
});

impl Filterable for RuminantCohort {
    const TYPE_NAME: &'static str = "RuminantTypeCohort";

    fn parameters() -> &'static [Parameter<Self>] {
        &COHORT_PARAMETERS
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn sex(&self) -> Sex {
        self.sex
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
