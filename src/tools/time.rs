//! Time tools: `current_time`, `days_between`.

use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::core::catalog::{Catalog, CatalogError, ParamType, ToolSpec, handler};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn register(catalog: &mut Catalog) -> Result<(), CatalogError> {
    catalog.register_tool(
        ToolSpec::new("current_time", "Returns the current UTC time in ISO-8601 format.")
            .returns(ParamType::Text),
        handler(|_args| Ok(json!(Utc::now().to_rfc3339()))),
    )?;

    catalog.register_tool(
        ToolSpec::new(
            "days_between",
            "Calculates the number of days between two YYYY-MM-DD dates. Returns -1 if a date is malformed.",
        )
        .required("start_date", ParamType::Text, "Start date (YYYY-MM-DD)")
        .required("end_date", ParamType::Text, "End date (YYYY-MM-DD)")
        .returns(ParamType::Number),
        handler(|args| {
            let start = args.text("start_date")?;
            let end = args.text("end_date")?;
            Ok(json!(days_between(start, end)))
        }),
    )?;

    Ok(())
}

/// Absolute day difference between two `YYYY-MM-DD` dates. Malformed input
/// yields the in-band sentinel `-1`; the tool's return type is a plain
/// integer, so callers check the sentinel instead of an error channel.
fn days_between(start: &str, end: &str) -> i64 {
    let parsed = NaiveDate::parse_from_str(start, DATE_FORMAT)
        .and_then(|s| NaiveDate::parse_from_str(end, DATE_FORMAT).map(|e| (s, e)));
    match parsed {
        Ok((start, end)) => (end - start).num_days().abs(),
        Err(_) => -1,
    }
}
