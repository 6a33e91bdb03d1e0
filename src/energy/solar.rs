use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Energy, Percentage, Power};
use crate::errors::CalcError;

fn default_efficiency() -> f64 {
    90.0
}

/// Installed (or proposed) solar array
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SolarSetup {
    /// Rated output of one panel in watts
    #[validate(range(min = 1.0, max = 10000.0))]
    pub panel_watt: f64,
    #[validate(range(max = 10000))]
    pub panel_count: u32,
    #[serde(default = "default_efficiency")]
    #[validate(range(min = 1.0, max = 100.0))]
    pub efficiency_percent: f64,
}

impl SolarSetup {
    pub fn new(panel_watt: f64, panel_count: u32, efficiency_percent: f64) -> Self {
        Self {
            panel_watt,
            panel_count,
            efficiency_percent,
        }
    }

    pub fn array_power(&self) -> Power {
        Power::watts(self.panel_watt * f64::from(self.panel_count))
    }
}

/// Daily generation: panel watt x count x efficiency x sun hours
pub fn solar_generation(setup: &SolarSetup, sun_hours: f64) -> Result<Energy, CalcError> {
    CalcError::check_positive("panel_watt", setup.panel_watt)?;
    let efficiency = CalcError::check_range("efficiency_percent", setup.efficiency_percent, 0.0, 100.0)?;
    if efficiency == 0.0 {
        return Err(CalcError::NotPositive {
            field: "efficiency_percent",
            value: efficiency,
        });
    }
    let sun_hours = CalcError::check_positive("sun_hours", sun_hours)?;

    let derate = Percentage::new(efficiency).as_ratio();
    Ok(Energy::watt_hours(
        setup.array_power().over_hours(sun_hours).as_watt_hours() * derate,
    ))
}

/// How a day's demand is split between solar and the grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnergyBalance {
    pub demand_wh: f64,
    pub solar_wh: f64,
    /// Demand not covered by solar
    pub grid_wh: f64,
    /// Solar in excess of demand, exported
    pub excess_wh: f64,
    /// Share of demand covered by solar, 0-100
    pub solar_coverage_percent: f64,
}

impl EnergyBalance {
    pub fn grid(&self) -> Energy {
        Energy::watt_hours(self.grid_wh)
    }

    pub fn excess(&self) -> Energy {
        Energy::watt_hours(self.excess_wh)
    }
}

pub fn energy_balance(demand: Energy, solar: Energy) -> EnergyBalance {
    let grid = demand.saturating_sub(solar);
    let excess = solar.saturating_sub(demand);
    let coverage = if demand.as_watt_hours() > 0.0 {
        Percentage::from_ratio(solar.as_watt_hours() / demand.as_watt_hours())
    } else {
        Percentage::new(100.0)
    };

    EnergyBalance {
        demand_wh: demand.as_watt_hours(),
        solar_wh: solar.as_watt_hours(),
        grid_wh: grid.as_watt_hours(),
        excess_wh: excess.as_watt_hours(),
        solar_coverage_percent: coverage.as_percent(),
    }
}
