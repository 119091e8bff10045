//! Labour-pool workers

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Sex};
use crate::entity::attributes::Attributes;
use crate::entity::parameter::{Filterable, Parameter};
use crate::entity::value::{Value, ValueKind};
use crate::entity::{sex_value, SEX_DOMAIN};

/// One person (or one hired position) in the labour pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourType {
    pub id: EntityId,
    pub name: String,
    /// Age in years
    pub age: i64,
    pub sex: Sex,
    #[serde(default)]
    pub hired: bool,
    /// Days available this month
    #[serde(default)]
    pub available_days: f64,
    #[serde(default)]
    pub attributes: Attributes,
}

impl LabourType {
    pub fn new(id: u32, name: &str, sex: Sex, age: i64) -> Self {
        Self {
            id: EntityId(id),
            name: name.to_string(),
            age,
            sex,
            hired: false,
            available_days: 0.0,
            attributes: Attributes::new(),
        }
    }

    pub fn hired(mut self) -> Self {
        self.hired = true;
        self
    }
}

fn labour(name: &'static str, kind: ValueKind, getter: fn(&LabourType) -> Option<Value>) -> Parameter<LabourType> {
    Parameter::new("LabourType", name, kind, getter)
}

static LABOUR_PARAMETERS: Lazy<Vec<Parameter<LabourType>>> = Lazy::new(|| {
    vec![
        labour("ID", ValueKind::Int, |l| Some(Value::Int(l.id.0 as i64))),
        labour("Name", ValueKind::Text, |l| Some(Value::Text(l.name.clone()))),
        labour("Age", ValueKind::Int, |l| Some(Value::Int(l.age))),
        labour("Sex", ValueKind::Enum(&SEX_DOMAIN), |l| Some(sex_value(l.sex))),
        labour("Hired", ValueKind::Bool, |l| Some(Value::Bool(l.hired))),
        labour("AvailableDays", ValueKind::Float, |l| {
            Some(Value::Float(l.available_days))
        }),
    ]
});

impl Filterable for LabourType {
    const TYPE_NAME: &'static str = "LabourType";

    fn parameters() -> &'static [Parameter<Self>] {
        &LABOUR_PARAMETERS
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labour_is_not_sex_specialized() {
        assert!(!LabourType::is_sex_specialized());
    }

    #[test]
    fn test_labour_members() {
        let worker = LabourType::new(1, "Hired hand", Sex::Male, 35).hired();
        let hired = LabourType::resolve_parameter("Hired").unwrap();
        assert_eq!(hired.read(&worker), Some(Value::Bool(true)));
        let name = LabourType::resolve_parameter("LabourType.Name").unwrap();
        assert_eq!(name.read(&worker), Some(Value::Text("Hired hand".to_string())));
    }

    #[test]
    fn test_parameter_names_are_sorted_and_qualified() {
        let names = LabourType::parameter_names();
        assert_eq!(names.first().map(String::as_str), Some("LabourType.Age"));
        assert!(names.contains(&"LabourType.Hired".to_string()));
    }
}
