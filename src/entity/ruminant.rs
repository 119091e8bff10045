//! Ruminant individuals, the sex-specialized schema
//!
//! Members common to every animal are declared by `Ruminant`; reproductive
//! members exist only on `RuminantFemale` or `RuminantMale`. Reading a
//! female-only member from a male yields no value.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, HerdChangeReason, Sex};
use crate::entity::attributes::Attributes;
use crate::entity::parameter::{Filterable, Parameter};
use crate::entity::value::{Value, ValueKind};
use crate::entity::{sex_value, HERD_CHANGE_DOMAIN, SEX_DOMAIN};

/// Age in months at which an animal is no longer a weaner
const WEANER_AGE_LIMIT: i64 = 12;

/// Female reproductive state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FemaleDetails {
    /// Age in months when the female may first be mated
    pub age_at_first_mating: i64,
    pub is_lactating: bool,
    pub is_pregnant: bool,
    pub number_of_births: i64,
    pub months_since_last_birth: i64,
}

impl Default for FemaleDetails {
    fn default() -> Self {
        Self {
            age_at_first_mating: 24,
            is_lactating: false,
            is_pregnant: false,
            number_of_births: 0,
            months_since_last_birth: 0,
        }
    }
}

/// Male breeding state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaleDetails {
    pub is_sire: bool,
    pub is_castrated: bool,
    pub is_wild_breeder: bool,
}

/// Sex-specific part of a ruminant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sex")]
pub enum RuminantSex {
    Female(FemaleDetails),
    Male(MaleDetails),
}

/// A single animal in a herd
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruminant {
    pub id: EntityId,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub herd_name: String,
    #[serde(default)]
    pub location: String,
    /// Age in months
    pub age: i64,
    /// Live weight (kg)
    pub weight: f64,
    /// Highest weight achieved (kg)
    #[serde(default)]
    pub high_weight: f64,
    /// Standard reference weight of the breed (kg)
    #[serde(default)]
    pub standard_reference_weight: f64,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub weaned: bool,
    #[serde(default)]
    pub replacement_breeder: bool,
    #[serde(default)]
    pub sale_flag: HerdChangeReason,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(flatten)]
    pub details: RuminantSex,
}

impl Ruminant {
    pub fn new(id: u32, sex: Sex, age: i64, weight: f64) -> Self {
        let details = match sex {
            Sex::Female => RuminantSex::Female(FemaleDetails::default()),
            Sex::Male => RuminantSex::Male(MaleDetails::default()),
        };
        Self {
            id: EntityId(id),
            breed: String::new(),
            herd_name: String::new(),
            location: String::new(),
            age,
            weight,
            high_weight: weight,
            standard_reference_weight: 0.0,
            date_of_birth: None,
            weaned: age >= 6,
            replacement_breeder: false,
            sale_flag: HerdChangeReason::None,
            attributes: Attributes::new(),
            details,
        }
    }

    pub fn female(id: u32, age: i64, weight: f64) -> Self {
        Self::new(id, Sex::Female, age, weight)
    }

    pub fn male(id: u32, age: i64, weight: f64) -> Self {
        Self::new(id, Sex::Male, age, weight)
    }

    pub fn with_breed(mut self, breed: &str) -> Self {
        self.breed = breed.to_string();
        self
    }

    pub fn sex(&self) -> Sex {
        match self.details {
            RuminantSex::Female(_) => Sex::Female,
            RuminantSex::Male(_) => Sex::Male,
        }
    }

    pub fn female_details(&self) -> Option<&FemaleDetails> {
        match &self.details {
            RuminantSex::Female(f) => Some(f),
            RuminantSex::Male(_) => None,
        }
    }

    pub fn female_details_mut(&mut self) -> Option<&mut FemaleDetails> {
        match &mut self.details {
            RuminantSex::Female(f) => Some(f),
            RuminantSex::Male(_) => None,
        }
    }

    pub fn male_details(&self) -> Option<&MaleDetails> {
        match &self.details {
            RuminantSex::Male(m) => Some(m),
            RuminantSex::Female(_) => None,
        }
    }

    pub fn male_details_mut(&mut self) -> Option<&mut MaleDetails> {
        match &mut self.details {
            RuminantSex::Male(m) => Some(m),
            RuminantSex::Female(_) => None,
        }
    }

    pub fn is_weaner(&self) -> bool {
        self.weaned && self.age < WEANER_AGE_LIMIT
    }

    pub fn is_ready_for_sale(&self) -> bool {
        self.sale_flag != HerdChangeReason::None
    }

    pub fn is_breeder(&self) -> Option<bool> {
        self.female_details()
            .map(|f| self.weaned && self.age >= f.age_at_first_mating)
    }

    pub fn is_able_to_breed(&self) -> bool {
        match &self.details {
            RuminantSex::Female(f) => self.is_breeder().unwrap_or(false) && !f.is_pregnant,
            RuminantSex::Male(m) => m.is_sire && !m.is_castrated,
        }
    }

    fn proportion_of(&self, reference: f64) -> f64 {
        if reference > 0.0 {
            self.weight / reference
        } else {
            0.0
        }
    }
}

fn common(name: &'static str, kind: ValueKind, getter: fn(&Ruminant) -> Option<Value>) -> Parameter<Ruminant> {
    Parameter::new("Ruminant", name, kind, getter)
}

fn female_only(
    name: &'static str,
    kind: ValueKind,
    getter: fn(&Ruminant) -> Option<Value>,
) -> Parameter<Ruminant> {
    Parameter::new("RuminantFemale", name, kind, getter).only_for(Sex::Female)
}

fn male_only(
    name: &'static str,
    kind: ValueKind,
    getter: fn(&Ruminant) -> Option<Value>,
) -> Parameter<Ruminant> {
    Parameter::new("RuminantMale", name, kind, getter).only_for(Sex::Male)
}

static RUMINANT_PARAMETERS: Lazy<Vec<Parameter<Ruminant>>> = Lazy::new(|| {
    vec![
        common("ID", ValueKind::Int, |r| Some(Value::Int(r.id.0 as i64))),
        common("Age", ValueKind::Int, |r| Some(Value::Int(r.age))),
        common("Weight", ValueKind::Float, |r| Some(Value::Float(r.weight))),
        common("HighWeight", ValueKind::Float, |r| Some(Value::Float(r.high_weight))),
        common("ProportionOfHighWeight", ValueKind::Float, |r| {
            Some(Value::Float(r.proportion_of(r.high_weight)))
        }),
        common("ProportionOfSRW", ValueKind::Float, |r| {
            Some(Value::Float(r.proportion_of(r.standard_reference_weight)))
        }),
        common("Sex", ValueKind::Enum(&SEX_DOMAIN), |r| Some(sex_value(r.sex()))),
        common("Breed", ValueKind::Text, |r| Some(Value::Text(r.breed.clone()))),
        common("HerdName", ValueKind::Text, |r| Some(Value::Text(r.herd_name.clone()))),
        common("Location", ValueKind::Text, |r| Some(Value::Text(r.location.clone()))),
        common("DateOfBirth", ValueKind::Date, |r| r.date_of_birth.map(Value::Date)),
        common("Weaned", ValueKind::Bool, |r| Some(Value::Bool(r.weaned))),
        common("IsWeaner", ValueKind::Bool, |r| Some(Value::Bool(r.is_weaner()))),
        common("IsCalf", ValueKind::Bool, |r| Some(Value::Bool(!r.weaned))),
        common("ReplacementBreeder", ValueKind::Bool, |r| {
            Some(Value::Bool(r.replacement_breeder))
        }),
        common("IsAbleToBreed", ValueKind::Bool, |r| {
            Some(Value::Bool(r.is_able_to_breed()))
        }),
        common("SaleFlag", ValueKind::Enum(&HERD_CHANGE_DOMAIN), |r| {
            Some(Value::Enum(r.sale_flag.index()))
        }),
        common("ReadyForSale", ValueKind::Bool, |r| {
            Some(Value::Bool(r.is_ready_for_sale()))
        }),
        female_only("IsBreeder", ValueKind::Bool, |r| r.is_breeder().map(Value::Bool)),
        female_only("IsPreBreeder", ValueKind::Bool, |r| {
            r.is_breeder().map(|b| Value::Bool(r.weaned && !b))
        }),
        female_only("IsHeifer", ValueKind::Bool, |r| {
            let f = r.female_details()?;
            let breeder = r.is_breeder()?;
            Some(Value::Bool(breeder && f.number_of_births == 0 && !f.is_pregnant))
        }),
        female_only("IsLactating", ValueKind::Bool, |r| {
            r.female_details().map(|f| Value::Bool(f.is_lactating))
        }),
        female_only("IsPregnant", ValueKind::Bool, |r| {
            r.female_details().map(|f| Value::Bool(f.is_pregnant))
        }),
        female_only("NumberOfBirths", ValueKind::Int, |r| {
            r.female_details().map(|f| Value::Int(f.number_of_births))
        }),
        female_only("MonthsSinceLastBirth", ValueKind::Int, |r| {
            r.female_details().map(|f| Value::Int(f.months_since_last_birth))
        }),
        male_only("IsSire", ValueKind::Bool, |r| {
            r.male_details().map(|m| Value::Bool(m.is_sire))
        }),
        male_only("IsCastrated", ValueKind::Bool, |r| {
            r.male_details().map(|m| Value::Bool(m.is_castrated))
        }),
        male_only("IsWildBreeder", ValueKind::Bool, |r| {
            r.male_details().map(|m| Value::Bool(m.is_wild_breeder))
        }),
    ]
});

impl Filterable for Ruminant {
    const TYPE_NAME: &'static str = "Ruminant";

    fn parameters() -> &'static [Parameter<Self>] {
        &RUMINANT_PARAMETERS
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn sex(&self) -> Sex {
        Ruminant::sex(self)
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruminant_is_sex_specialized() {
        assert!(Ruminant::is_sex_specialized());
    }

    #[test]
    fn test_female_only_member_absent_on_male() {
        let param = Ruminant::resolve_parameter("IsLactating").unwrap();
        assert_eq!(param.declared_for, Some(Sex::Female));
        assert_eq!(param.read(&Ruminant::male(1, 30, 400.0)), None);

        let mut cow = Ruminant::female(2, 30, 380.0);
        cow.female_details_mut().unwrap().is_lactating = true;
        assert_eq!(param.read(&cow), Some(Value::Bool(true)));
    }

    #[test]
    fn test_qualified_and_bare_names_agree() {
        let bare = Ruminant::resolve_parameter("IsSire").unwrap();
        let qualified = Ruminant::resolve_parameter("RuminantMale.IsSire").unwrap();
        assert!(std::ptr::eq(bare, qualified));
        assert!(Ruminant::resolve_parameter("Ruminant.IsSire").is_err());
    }

    #[test]
    fn test_breeder_derivation() {
        let heifer = Ruminant::female(3, 26, 300.0);
        assert_eq!(heifer.is_breeder(), Some(true));
        let param = Ruminant::resolve_parameter("IsHeifer").unwrap();
        assert_eq!(param.read(&heifer), Some(Value::Bool(true)));

        let young = Ruminant::female(4, 10, 150.0);
        let pre = Ruminant::resolve_parameter("IsPreBreeder").unwrap();
        assert_eq!(pre.read(&young), Some(Value::Bool(true)));
    }

    #[test]
    fn test_deserialize_flattened_sex() {
        let json = r#"{"id": 7, "age": 30, "weight": 410.0, "sex": "Male", "is_sire": true}"#;
        let bull: Ruminant = serde_json::from_str(json).unwrap();
        assert_eq!(bull.sex(), Sex::Male);
        assert!(bull.male_details().unwrap().is_sire);
    }
}
