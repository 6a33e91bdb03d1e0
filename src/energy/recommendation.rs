use serde::{Deserialize, Serialize};

use super::billing::Bill;
use super::solar::EnergyBalance;

/// Verdict on how well a solar setup covers the household
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Recommendation {
    FullyCovered,
    SignificantReduction,
    IncreaseCapacity,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Self::FullyCovered => {
                "Your solar system fully covers your energy needs! No electricity bill!"
            }
            Self::SignificantReduction => "Great! Your solar panels significantly reduce your bill.",
            Self::IncreaseCapacity => "Consider increasing solar capacity to save more!",
        }
    }
}

pub fn recommend(bill: &Bill, balance: &EnergyBalance) -> Recommendation {
    if bill.is_zero() {
        Recommendation::FullyCovered
    } else if balance.solar_wh > balance.demand_wh / 2.0 {
        Recommendation::SignificantReduction
    } else {
        Recommendation::IncreaseCapacity
    }
}
