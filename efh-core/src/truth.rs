use crate::error::Result;
use crate::target::Target;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use efh_utils::dates::parse_date_lenient;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Observed value for one location and target on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TruthRecord {
    pub date: NaiveDate,
    pub value: f64,
}

/// Truth records grouped `location -> target -> records`, each list sorted by date.
pub type TruthTable = HashMap<String, HashMap<Target, Vec<TruthRecord>>>;

/// One row of `truth_to_plot.csv`.
#[derive(Debug, Deserialize)]
struct RawTruthRow {
    date: String,
    location: String,
    #[serde(default)]
    inc_case: String,
    #[serde(default)]
    inc_death: String,
}

/// Parse a truth CSV with headers `date,location,inc_case,inc_death`.
///
/// Each row contributes one record per target. A value that does not parse
/// only drops that target's record; a bad date drops the row.
pub fn parse_truth_csv(csv_data: &str) -> Result<TruthTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_data.as_bytes());

    let mut table = TruthTable::new();
    let mut count = 0u32;
    let mut skipped = 0u32;
    for result in rdr.deserialize::<RawTruthRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                skipped += 1;
                log::debug!("[EFH] loader: skipping truth row: {}", e);
                continue;
            }
        };
        let Ok(date) = parse_date_lenient(&row.date) else {
            skipped += 1;
            continue;
        };
        let by_target = table.entry(row.location).or_default();
        for (target, raw) in [(Target::Cases, &row.inc_case), (Target::Death, &row.inc_death)] {
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    by_target.entry(target).or_default().push(TruthRecord { date, value });
                    count += 1;
                }
                _ => skipped += 1,
            }
        }
    }

    for records in table.values_mut().flat_map(|t| t.values_mut()) {
        records.sort_by_key(|r| r.date);
    }
    log::info!(
        "[EFH] loader: Loaded {} truth records, skipped {} non-numeric",
        count,
        skipped
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUTH_CSV: &str = "\
date,location,inc_case,inc_death
2021-03-13,DE,60000,1500
2021-03-06,DE,55000,NA
2021-03-06,FR,150000,2100
not-a-date,FR,1,1
";

    #[test]
    fn test_parse_truth_csv() {
        let table = parse_truth_csv(TRUTH_CSV).unwrap();
        assert_eq!(table.len(), 2);

        let de_cases = &table["DE"][&Target::Cases];
        assert_eq!(de_cases.len(), 2);
        // sorted by date
        assert_eq!(de_cases[0].date, NaiveDate::from_ymd_opt(2021, 3, 6).unwrap());
        assert_eq!(de_cases[1].value, 60000.0);

        // the NA death value only drops that one record
        let de_deaths = &table["DE"][&Target::Death];
        assert_eq!(de_deaths.len(), 1);
        assert_eq!(de_deaths[0].value, 1500.0);

        assert_eq!(table["FR"][&Target::Death].len(), 1);
    }
}
