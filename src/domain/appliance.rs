//! Household appliances and their daily usage.
//!
//! The catalog carries the rated wattage of common appliances so a user can
//! pick one by name; anything else is entered with an explicit wattage.

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator};
use validator::Validate;

use super::types::{Energy, Power};
use crate::errors::CalcError;

/// Built-in appliance catalog
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum ApplianceKind {
    #[strum(to_string = "Fan", serialize = "fan")]
    Fan,
    #[strum(to_string = "Air Conditioner", serialize = "air_conditioner")]
    AirConditioner,
    #[strum(to_string = "Refrigerator", serialize = "refrigerator")]
    Refrigerator,
    #[strum(to_string = "LED Bulb", serialize = "led_bulb")]
    LedBulb,
    #[strum(to_string = "Washing Machine", serialize = "washing_machine")]
    WashingMachine,
    #[strum(to_string = "Television", serialize = "television")]
    Television,
    #[strum(to_string = "Iron", serialize = "iron")]
    Iron,
    #[strum(to_string = "Microwave Oven", serialize = "microwave_oven")]
    MicrowaveOven,
}

impl ApplianceKind {
    /// Rated power draw
    pub fn rated_power(self) -> Power {
        let watts = match self {
            Self::Fan => 75.0,
            Self::AirConditioner => 1500.0,
            Self::Refrigerator => 200.0,
            Self::LedBulb => 10.0,
            Self::WashingMachine => 500.0,
            Self::Television => 100.0,
            Self::Iron => 1000.0,
            Self::MicrowaveOven => 1200.0,
        };
        Power::watts(watts)
    }

    pub fn catalog() -> Vec<CatalogEntry> {
        Self::iter()
            .map(|kind| CatalogEntry {
                kind,
                name: kind.to_string(),
                watts: kind.rated_power().as_watts(),
            })
            .collect()
    }
}

/// One row of the appliance catalog as exposed to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub kind: ApplianceKind,
    pub name: String,
    pub watts: f64,
}

/// Upper bound on a single appliance's rated power
pub const MAX_APPLIANCE_WATTS: f64 = 100_000.0;

fn default_quantity() -> u32 {
    1
}

fn default_selected() -> bool {
    true
}

/// An appliance as entered by a user: either a catalog kind, an explicit
/// wattage, or both (the explicit wattage wins).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ApplianceInput {
    #[serde(default)]
    pub kind: Option<ApplianceKind>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100000.0))]
    pub watts: Option<f64>,
    #[validate(range(min = 0.0, max = 24.0))]
    pub hours_per_day: f64,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 1000))]
    pub quantity: u32,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

impl ApplianceInput {
    pub fn from_kind(kind: ApplianceKind, hours_per_day: f64) -> Self {
        Self {
            kind: Some(kind),
            name: None,
            watts: None,
            hours_per_day,
            quantity: 1,
            selected: true,
        }
    }

    pub fn custom(name: impl Into<String>, watts: f64, hours_per_day: f64) -> Self {
        Self {
            kind: None,
            name: Some(name.into()),
            watts: Some(watts),
            hours_per_day,
            quantity: 1,
            selected: true,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn deselected(mut self) -> Self {
        self.selected = false;
        self
    }

    /// Fill in the wattage from the catalog and check the numbers.
    pub fn resolve(&self) -> Result<ApplianceUsage, CalcError> {
        let name = match (&self.name, self.kind) {
            (Some(name), _) => name.clone(),
            (None, Some(kind)) => kind.to_string(),
            (None, None) => "appliance".to_string(),
        };

        let watts = match (self.watts, self.kind) {
            (Some(w), _) => w,
            (None, Some(kind)) => kind.rated_power().as_watts(),
            (None, None) => return Err(CalcError::MissingWattage(name)),
        };

        Ok(ApplianceUsage {
            name,
            power: Power::watts(CalcError::check_range("watts", watts, 0.0, MAX_APPLIANCE_WATTS)?),
            hours_per_day: CalcError::check_range("hours_per_day", self.hours_per_day, 0.0, 24.0)?,
            quantity: self.quantity,
            selected: self.selected,
        })
    }
}

/// A resolved appliance usage record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplianceUsage {
    pub name: String,
    pub power: Power,
    pub hours_per_day: f64,
    pub quantity: u32,
    pub selected: bool,
}

impl ApplianceUsage {
    /// Daily energy of all units of this appliance, zero when not selected
    pub fn daily_energy(&self) -> Energy {
        if !self.selected {
            return Energy::ZERO;
        }
        self.power.over_hours(self.hours_per_day) * f64::from(self.quantity)
    }
}
