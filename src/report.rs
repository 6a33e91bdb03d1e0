//! Household files and the plain-text estimate report
//!
//! A household file holds an [`EstimateRequest`] as TOML or JSON.

use anyhow::{Context, Result};
use std::fmt::{self, Write};
use std::path::Path;
use validator::Validate;

use crate::energy::{EstimateReport, EstimateRequest};

pub fn parse_household(text: &str, path: &Path) -> Result<EstimateRequest> {
    let request: EstimateRequest = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(text).context("invalid TOML household file")?,
        Some("json") => serde_json::from_str(text).context("invalid JSON household file")?,
        other => anyhow::bail!(
            "unsupported household file extension {:?}, expected .toml or .json",
            other.unwrap_or("")
        ),
    };
    request.validate().context("household file failed validation")?;
    Ok(request)
}

pub fn load_household(path: impl AsRef<Path>) -> Result<EstimateRequest> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read household file {}", path.display()))?;
    parse_household(&text, path).with_context(|| format!("in {}", path.display()))
}

/// Renders the report the way the estimator prints it
pub fn render_text(report: &EstimateReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

pub fn write_report<W: Write>(out: &mut W, report: &EstimateReport) -> fmt::Result {
    let c = &report.consumption;
    let b = &report.balance;
    let bill = &report.bill;
    let s = &report.sizing;
    let cur = &bill.currency;

    writeln!(out, "Consumption")?;
    for a in c.appliances.iter().filter(|a| a.selected) {
        writeln!(
            out,
            "  {:<24} {:>10.0} Wh/day {:>5.1}%",
            a.name, a.daily_energy_wh, a.share_percent
        )?;
    }
    writeln!(
        out,
        "  {:<24} {:>10.0} Wh/day ({:.2} kWh/month)",
        "Total", c.daily_energy_wh, c.monthly_energy_kwh
    )?;

    writeln!(out, "\nSolar")?;
    writeln!(out, "  Generation       {:>10.0} Wh/day", b.solar_wh)?;
    writeln!(out, "  Monthly          {:>10.2} kWh", report.monthly_solar_kwh)?;
    writeln!(out, "  From grid        {:>10.0} Wh/day", b.grid_wh)?;
    writeln!(out, "  Exported         {:>10.0} Wh/day", b.excess_wh)?;
    writeln!(out, "  Coverage         {:>10.1} %", b.solar_coverage_percent)?;

    writeln!(out, "\nMonthly bill ({} {:.2}/kWh)", cur, bill.tariff_per_kwh)?;
    writeln!(out, "  Without solar    {:>10.2} {}", bill.monthly.without_solar, cur)?;
    writeln!(out, "  With solar       {:>10.2} {}", bill.monthly.with_solar, cur)?;
    writeln!(out, "  Export credit    {:>10.2} {}", bill.monthly.export_credit_applied, cur)?;
    writeln!(out, "  Savings          {:>10.2} {}", bill.monthly.savings, cur)?;

    writeln!(out, "\nRecommended system ({:.0} W panels)", s.panel_watt)?;
    writeln!(out, "  Panels           {:>10}", s.panels_required)?;
    writeln!(out, "  Battery          {:>10.0} kWh", s.battery_capacity_kwh)?;
    writeln!(out, "  Inverter         {:>10.0} W", s.inverter_capacity_w)?;
    writeln!(out, "  Cost             {:>10.0} {}", s.cost.total, cur)?;

    writeln!(out, "\n{}", report.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::{estimate, Assumptions, CostTable};

    const HOUSEHOLD_TOML: &str = r#"
        [solar]
        panel_watt = 400.0
        panel_count = 4

        [[appliances]]
        kind = "fan"
        hours_per_day = 10.0
        quantity = 2

        [[appliances]]
        name = "Water pump"
        watts = 750.0
        hours_per_day = 1.0
    "#;

    #[test]
    fn test_parse_toml_household() {
        let req = parse_household(HOUSEHOLD_TOML, Path::new("home.toml")).unwrap();
        assert_eq!(req.appliances.len(), 2);
        assert_eq!(req.solar.panel_count, 4);
        assert_eq!(req.solar.efficiency_percent, 90.0);
        assert_eq!(req.appliances[0].quantity, 2);
    }

    #[test]
    fn test_parse_json_household() {
        let json = r#"{
            "appliances": [{"kind": "led_bulb", "hours_per_day": 6, "quantity": 5}],
            "solar": {"panel_watt": 330, "panel_count": 2, "efficiency_percent": 85}
        }"#;
        let req = parse_household(json, Path::new("home.json")).unwrap();
        assert_eq!(req.appliances[0].quantity, 5);
        assert_eq!(req.solar.efficiency_percent, 85.0);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let err = parse_household("", Path::new("home.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported household file extension"));
    }

    #[test]
    fn test_load_household_missing_file() {
        let err = load_household("no/such/home.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read household file"));
    }

    #[test]
    fn test_render_text_mentions_every_section() {
        let req = parse_household(HOUSEHOLD_TOML, Path::new("home.toml")).unwrap();
        let report = estimate(&req, &Assumptions::default(), &CostTable::default()).unwrap();
        let text = render_text(&report).unwrap();
        for heading in ["Consumption", "Solar", "Monthly bill", "Recommended system"] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("Water pump"));
        assert!(text.contains(&report.message));
    }

    /// Accepts a fixed number of bytes, then refuses
    struct Capped {
        buf: String,
        cap: usize,
    }

    impl Write for Capped {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            if self.buf.len() + s.len() > self.cap {
                return Err(fmt::Error);
            }
            self.buf.push_str(s);
            Ok(())
        }
    }

    #[test]
    fn test_write_report_stops_at_first_failed_write() {
        let req = parse_household(HOUSEHOLD_TOML, Path::new("home.toml")).unwrap();
        let report = estimate(&req, &Assumptions::default(), &CostTable::default()).unwrap();
        let mut out = Capped {
            buf: String::new(),
            cap: 40,
        };
        assert!(write_report(&mut out, &report).is_err());
        assert!(out.buf.starts_with("Consumption"));
        assert!(!out.buf.contains("Solar"));
    }
}
