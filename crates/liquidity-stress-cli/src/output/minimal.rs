use serde_json::Value;

use super::format::{decimal_of, fmt_ratio, scalar};

/// Print the one-line verdict for a stress run, or the bare value otherwise.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let metrics = &value["result"]["metrics"];
    if let Some(breach) = metrics["breach"].as_bool() {
        let status = if breach { "BREACH" } else { "PASS" };
        let coverage = decimal_of(&metrics["liquidity_coverage"])
            .map(fmt_ratio)
            .unwrap_or_default();
        return format!(
            "{} coverage={} days={}",
            status,
            coverage,
            scalar(&metrics["days_to_liquidity"])
        );
    }

    if let Some(total) = value.get("total_fund_value") {
        return scalar(total);
    }

    scalar(value)
}
