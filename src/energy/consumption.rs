use serde::{Deserialize, Serialize};

use crate::domain::{ApplianceInput, ApplianceUsage, Energy};
use crate::errors::CalcError;

/// Energy use of a single appliance line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplianceConsumption {
    pub name: String,
    pub selected: bool,
    pub daily_energy_wh: f64,
    pub monthly_energy_kwh: f64,
    /// Share of the household's daily demand
    pub share_percent: f64,
}

/// Household consumption, per appliance and in total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionBreakdown {
    pub appliances: Vec<ApplianceConsumption>,
    pub daily_energy_wh: f64,
    pub daily_energy_kwh: f64,
    pub monthly_energy_kwh: f64,
}

impl ConsumptionBreakdown {
    pub fn daily_energy(&self) -> Energy {
        Energy::watt_hours(self.daily_energy_wh)
    }
}

pub fn resolve_all(inputs: &[ApplianceInput]) -> Result<Vec<ApplianceUsage>, CalcError> {
    inputs.iter().map(ApplianceInput::resolve).collect()
}

/// Sum of watt x hours x quantity over the selected appliances
pub fn daily_energy(usages: &[ApplianceUsage]) -> Energy {
    usages.iter().map(ApplianceUsage::daily_energy).sum()
}

pub fn breakdown(usages: &[ApplianceUsage], days_per_month: f64) -> ConsumptionBreakdown {
    let total = daily_energy(usages);

    let appliances = usages
        .iter()
        .map(|usage| {
            let daily = usage.daily_energy();
            let share_percent = if total.as_watt_hours() > 0.0 {
                daily.as_watt_hours() / total.as_watt_hours() * 100.0
            } else {
                0.0
            };
            ApplianceConsumption {
                name: usage.name.clone(),
                selected: usage.selected,
                daily_energy_wh: daily.as_watt_hours(),
                monthly_energy_kwh: (daily * days_per_month).as_kilowatt_hours(),
                share_percent,
            }
        })
        .collect();

    ConsumptionBreakdown {
        appliances,
        daily_energy_wh: total.as_watt_hours(),
        daily_energy_kwh: total.as_kilowatt_hours(),
        monthly_energy_kwh: (total * days_per_month).as_kilowatt_hours(),
    }
}
