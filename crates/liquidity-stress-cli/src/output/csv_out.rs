use serde_json::Value;
use std::io::{self, Write};

use super::format::scalar;

const LEDGER_COLUMNS: [&str; 5] = [
    "name",
    "stressed_value",
    "cash_used",
    "remaining_value",
    "days_to_cash",
];

/// Write output as CSV to stdout.
///
/// A stress run writes its waterfall ledger; a profile writes its buckets;
/// anything else becomes field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let _ = write_csv(stdout.lock(), value);
}

fn write_csv<W: Write>(out: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    if let Value::Array(rows) = &value["result"]["waterfall"] {
        wtr.write_record(LEDGER_COLUMNS)?;
        for row in rows {
            wtr.write_record(LEDGER_COLUMNS.iter().map(|c| scalar(&row[*c])))?;
        }
    } else if let Value::Array(buckets) = &value["buckets"] {
        write_object_rows(&mut wtr, buckets)?;
    } else if let Value::Object(map) = value {
        wtr.write_record(["field", "value"])?;
        for (key, val) in map {
            wtr.write_record([key.as_str(), &scalar(val)])?;
        }
    } else {
        wtr.write_record([scalar(value)])?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_object_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        wtr.write_record(headers.iter().map(|h| scalar(&row[*h])))?;
    }
    Ok(())
}
