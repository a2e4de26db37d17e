//! Customer record loading from CSV and JSON exports.
//!
//! CSV files carry a header row; JSON files hold an array of objects. Both
//! accept camelCase, snake_case and the Korean column names of the
//! per-manager exports.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::customer::RawCustomerRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read input file `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("CSV parse error at line {line}: {source}")]
    Csv { line: u64, source: csv::Error },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported input format for `{0}`; expected .csv or .json")]
    UnsupportedFormat(PathBuf),
}

pub fn load_records<R: Read>(
    reader: R,
    format: InputFormat,
) -> Result<Vec<RawCustomerRecord>, IngestError> {
    match format {
        InputFormat::Csv => load_csv(reader),
        InputFormat::Json => Ok(serde_json::from_reader(reader)?),
    }
}

pub fn load_records_file(path: &Path) -> Result<Vec<RawCustomerRecord>, IngestError> {
    let format =
        InputFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat(path.to_path_buf()))?;
    let file =
        File::open(path).map_err(|source| IngestError::Io { path: path.to_path_buf(), source })?;
    load_records(BufReader::new(file), format)
}

/// Keep the records of one manager. Matching ignores case and surrounding
/// whitespace; records without a manager never match.
pub fn filter_by_manager(records: Vec<RawCustomerRecord>, manager: &str) -> Vec<RawCustomerRecord> {
    let wanted = manager.trim().to_lowercase();
    records
        .into_iter()
        .filter(|record| {
            record.manager.as_deref().is_some_and(|name| name.trim().to_lowercase() == wanted)
        })
        .collect()
}

fn load_csv<R: Read>(reader: R) -> Result<Vec<RawCustomerRecord>, IngestError> {
    let mut csv_reader =
        csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for (index, result) in csv_reader.deserialize().enumerate() {
        let record: RawCustomerRecord = result.map_err(|source: csv::Error| {
            let line = source.position().map_or(index as u64 + 2, |position| position.line());
            IngestError::Csv { line, source }
        })?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::Path;

    use super::{filter_by_manager, load_records, load_records_file, InputFormat, IngestError};
    use crate::domain::customer::{CustomerRecord, NumericCell};

    const SAMPLE_CSV: &str = "\
거래처코드,거래처명,지역,담당자,recentMonthSales,totalSales,growthVs3Month,growthVsYearAgo,uniqueProducts
 A-001 ,이내과의원,서울,김영업,42770000,480000000,1870000,3060000,4
A-002,한빛약국,부산,박매니저,\"19,340,000\",,3680000,2270000,2
A-003,새봄의원,서울, 김영업 ,10500000,120000000,-540000,-2790000,
";

    #[test]
    fn load_sample_csv_with_korean_headers() {
        let records = load_records(SAMPLE_CSV.as_bytes(), InputFormat::Csv).expect("csv loads");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].account_code, "A-001");
        assert_eq!(records[0].account_name, "이내과의원");
        assert_eq!(records[0].manager.as_deref(), Some("김영업"));
        assert_eq!(records[0].recent_month_sales, Some(NumericCell::Value(42_770_000.0)));
        assert_eq!(records[1].recent_month_sales, Some(NumericCell::Value(19_340_000.0)));
        assert_eq!(records[1].total_sales, None);
        assert_eq!(records[2].unique_products, None);
    }

    #[test]
    fn csv_rows_convert_to_validated_records() {
        let records = load_records(SAMPLE_CSV.as_bytes(), InputFormat::Csv).expect("csv loads");
        let converted: Vec<CustomerRecord> = records
            .into_iter()
            .map(CustomerRecord::try_from)
            .collect::<Result<_, _>>()
            .expect("all rows valid");

        assert_eq!(converted[2].growth_vs_year_ago, -2_790_000);
        assert_eq!(converted[1].total_sales, 0);
        assert_eq!(converted[0].unique_products, 4);
    }

    #[test]
    fn malformed_csv_row_reports_line() {
        let csv = "accountCode,recentMonthSales\nA-1,100\nA-2,5,extra\n";
        let error = load_records(csv.as_bytes(), InputFormat::Csv).expect_err("ragged row");

        match error {
            IngestError::Csv { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_cell_loads_and_only_that_row_is_rejected() {
        let csv = "accountCode,recentMonthSales\nA-1,42770000\nA-2,n/a\nA-3,19340000\n";
        let records = load_records(csv.as_bytes(), InputFormat::Csv).expect("csv loads");

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].recent_month_sales, Some(NumericCell::Invalid("n/a".into())));

        let outcomes: Vec<bool> =
            records.into_iter().map(|raw| CustomerRecord::try_from(raw).is_ok()).collect();
        assert_eq!(outcomes, vec![true, false, true]);
    }

    #[test]
    fn json_array_loads() {
        let json = r#"[{"accountCode":"J-1","recent_month_sales":5000000,"manager":"Lee"}]"#;
        let records = load_records(json.as_bytes(), InputFormat::Json).expect("json loads");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recent_month_sales, Some(NumericCell::Value(5_000_000.0)));
    }

    #[test]
    fn manager_filter_is_case_and_space_insensitive() {
        let json = r#"[
            {"accountCode":"1","manager":"Kim"},
            {"accountCode":"2","manager":" kim "},
            {"accountCode":"3","manager":"Park"},
            {"accountCode":"4"}
        ]"#;
        let records = load_records(json.as_bytes(), InputFormat::Json).expect("json loads");
        let kept = filter_by_manager(records, "KIM");

        let codes: Vec<&str> = kept.iter().map(|r| r.account_code.as_str()).collect();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[test]
    fn file_loading_infers_format_from_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("customers.CSV");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(SAMPLE_CSV.as_bytes()).expect("write");

        let records = load_records_file(&path).expect("file loads");
        assert_eq!(records.len(), 3);

        let error = load_records_file(Path::new("customers.xlsx")).expect_err("unsupported");
        assert!(matches!(error, IngestError::UnsupportedFormat(_)));

        let error = load_records_file(&dir.path().join("missing.json")).expect_err("missing");
        assert!(matches!(error, IngestError::Io { .. }));
    }
}
