//! Terminal tables for a finished run.

use prettytable::{Table, row};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::collections::BTreeMap;
use unisim_simulation::agents::AgentKind;
use unisim_simulation::engine::PoolReport;

const DISPLAY_DP: u32 = 6;

fn fmt(value: Decimal) -> String {
    value.round_dp(DISPLAY_DP).normalize().to_string()
}

// Prices near the tick limits fall back to scientific notation.
fn fmt_price(value: f64) -> String {
    match Decimal::from_f64(value) {
        Some(price) if (1e-6..1e12).contains(&value) => fmt(price),
        _ => format!("{value:.6e}"),
    }
}

/// One row per recorded step.
pub fn records_table(report: &PoolReport<'_>) -> Table {
    let mut table = Table::new();
    table.set_titles(row![
        "step", "tick", "price0", "price1", "volume0", "volume1", "reserve0", "reserve1"
    ]);
    for r in report.records {
        table.add_row(row![
            r.step,
            r.tick,
            fmt_price(r.price0),
            fmt_price(r.price1),
            fmt(r.volume0),
            fmt(r.volume1),
            fmt(r.reserve0),
            fmt(r.reserve1)
        ]);
    }
    table
}

pub fn agents_table(counts: &BTreeMap<AgentKind, usize>) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["agent", "count"]);
    for (kind, count) in counts {
        table.add_row(row![kind, count]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agents_table_rows() {
        let counts = BTreeMap::from([
            (AgentKind::ZiTrader, 100),
            (AgentKind::LiquidityProvider, 10),
        ]);
        let table = agents_table(&counts);
        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("zi-trader"));
        assert!(rendered.contains("liquidity-provider"));
    }

    #[test]
    fn test_fmt_rounds() {
        assert_eq!(fmt(Decimal::new(123_456_789, 8)), "1.234568");
        assert_eq!(fmt(Decimal::new(900, 0)), "900");
    }

    #[test]
    fn test_fmt_price_switches_to_exponent_at_extremes() {
        assert_eq!(fmt_price(1.0), "1");
        assert_eq!(fmt_price(0.25), "0.25");
        assert_eq!(fmt_price(3.4025678669876368e38), "3.402568e38");
        assert_eq!(fmt_price(2.9389568087743114e-39), "2.938957e-39");
    }
}
