use colored::{ColoredString, Colorize};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use liquidity_stress_core::portfolio::LiquidityTier;

use super::format::{decimal_of, fmt_bn, fmt_pct, fmt_ratio, money_cell, scalar};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_stress_report(result, map);
            } else if let Some(Value::Array(buckets)) = map.get("buckets") {
                print_profile(buckets, map.get("total_fund_value"));
            } else {
                print_flat_object(map);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_stress_report(result: &Value, envelope: &Map<String, Value>) {
    let metrics = &result["metrics"];
    let breach = metrics["breach"].as_bool().unwrap_or(false);
    println!("Liquidity Status: {}", status_label(breach));
    println!();

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record([
        "Liquidity Coverage".to_string(),
        decimal_of(&metrics["liquidity_coverage"])
            .map(fmt_ratio)
            .unwrap_or_default(),
    ]);
    builder.push_record([
        "Days to Liquidity".to_string(),
        scalar(&metrics["days_to_liquidity"]),
    ]);
    builder.push_record(["Cash Required".to_string(), money_cell(&metrics["cash_required"])]);
    builder.push_record(["Cash Raised".to_string(), money_cell(&metrics["cash_raised"])]);
    builder.push_record([
        "Shortfall".to_string(),
        decimal_of(&metrics["shortfall_pct"])
            .map(fmt_pct)
            .unwrap_or_default(),
    ]);
    builder.push_record([
        "Total Fund Value".to_string(),
        money_cell(&result["total_fund_value"]),
    ]);
    println!("{}", Table::from(builder));

    if let Value::Array(rows) = &result["waterfall"] {
        println!("\nLiquidity Waterfall");
        let mut builder = Builder::default();
        builder.push_record([
            "Asset Bucket",
            "Stressed Value",
            "Cash Used",
            "Remaining Value",
            "Days to Cash",
        ]);
        for row in rows {
            builder.push_record(waterfall_cells(row));
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_profile(buckets: &[Value], total: Option<&Value>) {
    let mut builder = Builder::default();
    builder.push_record([
        "Asset Bucket",
        "Market Value",
        "Days to Cash",
        "Stress Loss",
        "Available",
    ]);
    for b in buckets {
        let days = b["days_to_cash"].as_u64().unwrap_or_default();
        builder.push_record([
            scalar(&b["name"]),
            money_cell(&b["market_value"]),
            days_cell(days).to_string(),
            decimal_of(&b["stress_loss_pct"])
                .map(fmt_pct)
                .unwrap_or_default(),
            scalar(&b["available"]),
        ]);
    }
    println!("{}", Table::from(builder));

    if let Some(total) = total {
        println!("\nTotal Fund Value: {}", money_cell(total));
    }
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn waterfall_cells(row: &Value) -> Vec<String> {
    let cash_used = decimal_of(&row["cash_used"]).unwrap_or_default();
    let drawn = cash_used > Decimal::ZERO;
    let days = row["days_to_cash"].as_u64().unwrap_or_default();

    let cash_cell = if drawn {
        fmt_bn(cash_used).green().bold()
    } else {
        fmt_bn(cash_used).dimmed()
    };
    let remaining = money_cell(&row["remaining_value"]);
    let remaining_cell = if drawn {
        remaining.red().bold()
    } else {
        remaining.normal()
    };

    vec![
        scalar(&row["name"]),
        money_cell(&row["stressed_value"]),
        cash_cell.to_string(),
        remaining_cell.to_string(),
        days_cell(days).to_string(),
    ]
}

fn days_cell(days: u64) -> ColoredString {
    let tier = LiquidityTier::for_days(u32::try_from(days).unwrap_or(u32::MAX));
    let text = days.to_string();
    match tier {
        LiquidityTier::Immediate => text.green().bold(),
        LiquidityTier::ShortTerm => text.yellow(),
        LiquidityTier::LongDated => text.red().bold(),
    }
}

fn status_label(breach: bool) -> ColoredString {
    if breach {
        "BREACH".red().bold()
    } else {
        "PASS".green().bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_waterfall_cells_plain_values() {
        colored::control::set_override(false);
        let row = json!({
            "name": "Public Equities [T+1]",
            "stressed_value": "29750000000",
            "cash_used": "5000000000",
            "remaining_value": "24750000000",
            "days_to_cash": 1
        });
        let cells = waterfall_cells(&row);
        assert_eq!(
            cells,
            vec![
                "Public Equities [T+1]".to_string(),
                "$29.75 bn".to_string(),
                "$5.00 bn".to_string(),
                "$24.75 bn".to_string(),
                "1".to_string(),
            ]
        );
    }

    #[test]
    fn test_status_label_text() {
        colored::control::set_override(false);
        assert_eq!(status_label(true).to_string(), "BREACH");
        assert_eq!(status_label(false).to_string(), "PASS");
    }
}
