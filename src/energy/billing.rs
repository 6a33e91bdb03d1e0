use serde::{Deserialize, Serialize};

use super::solar::EnergyBalance;
use crate::domain::{Energy, Rate};

/// Amounts for one billing period, all in currency units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BillPeriod {
    pub without_solar: f64,
    pub with_solar: f64,
    /// Value of the exported surplus at the export credit rate
    pub export_credit_earned: f64,
    /// Part of the earned credit applied against the grid charge
    pub export_credit_applied: f64,
    pub savings: f64,
}

impl BillPeriod {
    fn scaled(&self, factor: f64) -> Self {
        Self {
            without_solar: self.without_solar * factor,
            with_solar: self.with_solar * factor,
            export_credit_earned: self.export_credit_earned * factor,
            export_credit_applied: self.export_credit_applied * factor,
            savings: self.savings * factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bill {
    pub currency: String,
    pub tariff_per_kwh: f64,
    pub export_credit_per_kwh: f64,
    pub daily: BillPeriod,
    pub monthly: BillPeriod,
}

impl Bill {
    pub fn is_zero(&self) -> bool {
        self.monthly.with_solar <= 0.0
    }
}

/// Bill for one day of demand. Grid energy is charged at `tariff`, exported
/// energy is credited at `export_credit`, and the credit never takes the
/// bill below zero.
pub fn daily_bill(balance: &EnergyBalance, tariff: Rate, export_credit: Rate) -> BillPeriod {
    let without_solar = tariff * Energy::watt_hours(balance.demand_wh);
    let grid_charge = tariff * balance.grid();
    let earned_credit = export_credit * balance.excess();

    let applied_credit = earned_credit.min(grid_charge);
    let with_solar = (grid_charge - applied_credit).max(0.0);

    BillPeriod {
        without_solar,
        with_solar,
        export_credit_earned: earned_credit,
        export_credit_applied: applied_credit,
        savings: (without_solar - with_solar).max(0.0),
    }
}

pub fn compute_bill(
    balance: &EnergyBalance,
    tariff: Rate,
    export_credit: Rate,
    days_per_month: f64,
    currency: &str,
) -> Bill {
    let daily = daily_bill(balance, tariff, export_credit);
    Bill {
        currency: currency.to_string(),
        tariff_per_kwh: tariff.as_per_kwh(),
        export_credit_per_kwh: export_credit.as_per_kwh(),
        daily,
        monthly: daily.scaled(days_per_month),
    }
}
