//! Solar system sizing
//!
//! Sizes an array, a battery bank and an inverter for a day's demand, and
//! prices the result from a per-unit cost table.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Energy, Power};
use crate::errors::CalcError;

/// Usable share of battery capacity per cycle
pub const BATTERY_DEPTH_OF_DISCHARGE: f64 = 0.5;

/// Inverter headroom over the expected peak
pub const INVERTER_HEADROOM: f64 = 1.2;

/// Per-unit component prices in currency units
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct CostTable {
    #[validate(range(min = 0.0))]
    pub panel_unit_cost: f64,
    #[validate(range(min = 0.0))]
    pub battery_cost_per_kwh: f64,
    #[validate(range(min = 0.0))]
    pub inverter_cost_per_kw: f64,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            panel_unit_cost: 12_000.0,
            battery_cost_per_kwh: 15_000.0,
            inverter_cost_per_kw: 10_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub panels: f64,
    pub battery: f64,
    pub inverter: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSizing {
    pub panel_watt: f64,
    pub panels_required: u32,
    pub array_capacity_w: f64,
    pub battery_capacity_kwh: f64,
    pub inverter_capacity_w: f64,
    pub cost: CostBreakdown,
}

pub fn panels_required(daily: Energy, panel: Power, sun_hours: f64) -> u32 {
    let per_panel = panel.over_hours(sun_hours).as_watt_hours();
    (daily.as_watt_hours() / per_panel).ceil() as u32
}

/// Battery capacity covering one day of demand at the usable depth of discharge
pub fn battery_capacity_kwh(daily: Energy) -> f64 {
    (daily.as_kilowatt_hours() / BATTERY_DEPTH_OF_DISCHARGE).ceil()
}

pub fn inverter_capacity(daily: Energy, panel: Power, sun_hours: f64) -> Power {
    let average_load = daily.as_watt_hours() / sun_hours;
    Power::watts(panel.as_watts().max(average_load) * INVERTER_HEADROOM)
}

pub fn size_system(
    daily: Energy,
    panel_watt: f64,
    sun_hours: f64,
    costs: &CostTable,
) -> Result<SystemSizing, CalcError> {
    let daily = Energy::watt_hours(CalcError::check_finite("daily_energy_wh", daily.as_watt_hours())?.max(0.0));
    let panel = Power::watts(CalcError::check_positive("panel_watt", panel_watt)?);
    let sun_hours = CalcError::check_positive("sun_hours", sun_hours)?;

    let panels = panels_required(daily, panel, sun_hours);
    let battery_kwh = battery_capacity_kwh(daily);
    let inverter = inverter_capacity(daily, panel, sun_hours);

    let panels_cost = f64::from(panels) * costs.panel_unit_cost;
    let battery_cost = battery_kwh * costs.battery_cost_per_kwh;
    let inverter_cost = inverter.as_kilowatts() * costs.inverter_cost_per_kw;

    Ok(SystemSizing {
        panel_watt: panel.as_watts(),
        panels_required: panels,
        array_capacity_w: panel.as_watts() * f64::from(panels),
        battery_capacity_kwh: battery_kwh,
        inverter_capacity_w: inverter.as_watts(),
        cost: CostBreakdown {
            panels: panels_cost,
            battery: battery_cost,
            inverter: inverter_cost,
            total: panels_cost + battery_cost + inverter_cost,
        },
    })
}
