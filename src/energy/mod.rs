//! Energy, billing and sizing calculations
//!
//! Everything here is a pure function of its inputs:
//! - consumption: appliance usage to daily and monthly energy
//! - solar: array generation and the grid/export split
//! - billing: bill with and without solar, net of export credit
//! - sizing: panels, battery and inverter for a day's demand, with cost
//! - recommendation: verdict on how well the setup covers the household

pub mod billing;
pub mod consumption;
pub mod recommendation;
pub mod sizing;
pub mod solar;

pub use billing::{compute_bill, Bill, BillPeriod};
pub use consumption::{breakdown, daily_energy, resolve_all, ApplianceConsumption, ConsumptionBreakdown};
pub use recommendation::{recommend, Recommendation};
pub use sizing::{size_system, CostBreakdown, CostTable, SystemSizing};
pub use solar::{energy_balance, solar_generation, EnergyBalance, SolarSetup};

use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::domain::{ApplianceInput, Rate};
use crate::errors::CalcError;

/// Fixed assumptions the calculations run under
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct Assumptions {
    /// Peak-equivalent sunlight hours per day
    #[validate(range(min = 0.1, max = 24.0))]
    pub sun_hours: f64,
    #[validate(range(min = 1.0, max = 31.0))]
    pub days_per_month: f64,
    /// Grid tariff in currency units per kWh
    #[validate(range(min = 0.0))]
    pub tariff_per_kwh: f64,
    /// Credit per exported kWh
    #[validate(range(min = 0.0))]
    pub export_credit_per_kwh: f64,
    #[validate(length(min = 1, max = 8))]
    pub currency: String,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            sun_hours: 5.0,
            days_per_month: 30.0,
            tariff_per_kwh: 8.0,
            export_credit_per_kwh: 5.0,
            currency: "INR".to_string(),
        }
    }
}

impl Assumptions {
    pub fn tariff(&self) -> Rate {
        Rate::per_kwh(self.tariff_per_kwh)
    }

    pub fn export_credit(&self) -> Rate {
        Rate::per_kwh(self.export_credit_per_kwh)
    }
}

/// Appliances plus the solar setup to evaluate against them
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct EstimateRequest {
    #[validate(length(max = 200), nested)]
    pub appliances: Vec<ApplianceInput>,
    #[validate(nested)]
    pub solar: SolarSetup,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimateReport {
    pub consumption: ConsumptionBreakdown,
    pub balance: EnergyBalance,
    pub monthly_solar_kwh: f64,
    pub bill: Bill,
    pub sizing: SystemSizing,
    pub recommendation: Recommendation,
    pub message: String,
}

pub fn estimate(
    request: &EstimateRequest,
    assumptions: &Assumptions,
    costs: &CostTable,
) -> Result<EstimateReport, CalcError> {
    let usages = resolve_all(&request.appliances)?;
    let consumption = breakdown(&usages, assumptions.days_per_month);
    let demand = consumption.daily_energy();

    let solar = solar_generation(&request.solar, assumptions.sun_hours)?;
    let balance = energy_balance(demand, solar);
    let bill = compute_bill(
        &balance,
        assumptions.tariff(),
        assumptions.export_credit(),
        assumptions.days_per_month,
        &assumptions.currency,
    );
    let sizing = size_system(demand, request.solar.panel_watt, assumptions.sun_hours, costs)?;
    let recommendation = recommend(&bill, &balance);

    debug!(
        daily_wh = balance.demand_wh,
        solar_wh = balance.solar_wh,
        monthly_bill = bill.monthly.with_solar,
        %recommendation,
        "estimate computed"
    );

    Ok(EstimateReport {
        monthly_solar_kwh: (solar * assumptions.days_per_month).as_kilowatt_hours(),
        consumption,
        balance,
        bill,
        sizing,
        message: recommendation.message().to_string(),
        recommendation,
    })
}
