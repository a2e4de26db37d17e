use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DomainError;

/// A validated customer sales record. Amounts are whole currency units (KRW).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub account_code: String,
    pub account_name: String,
    pub region: Option<String>,
    pub manager: Option<String>,
    pub recent_month_sales: i64,
    pub total_sales: i64,
    pub growth_vs_3_month: i64,
    pub growth_vs_year_ago: i64,
    pub unique_products: u32,
    /// Long-run growth percentage feeding the BCG growth axis.
    pub year_over_year_growth_rate: Option<f64>,
    pub half_year_growth_rate: Option<f64>,
}

impl CustomerRecord {
    pub fn new(account_code: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account_code: account_code.into(),
            account_name: account_name.into(),
            ..Self::default()
        }
    }

    pub fn with_recent_month_sales(mut self, amount: i64) -> Self {
        self.recent_month_sales = amount;
        self
    }

    pub fn with_total_sales(mut self, amount: i64) -> Self {
        self.total_sales = amount;
        self
    }

    pub fn with_growth(mut self, vs_3_month: i64, vs_year_ago: i64) -> Self {
        self.growth_vs_3_month = vs_3_month;
        self.growth_vs_year_ago = vs_year_ago;
        self
    }

    pub fn with_unique_products(mut self, count: u32) -> Self {
        self.unique_products = count;
        self
    }

    pub fn with_bcg_growth_rates(mut self, year_over_year: f64, half_year: f64) -> Self {
        self.year_over_year_growth_rate = Some(year_over_year);
        self.half_year_growth_rate = Some(half_year);
        self
    }

    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = Some(manager.into());
        self
    }
}

/// Customer row as produced by an input provider, before boundary validation.
///
/// Accepts camelCase (dashboard JSON), snake_case, and the Korean column
/// headers of the per-manager CSV exports. Every numeric cell is optional,
/// and a cell that does not parse is kept so the row can be rejected on its
/// own instead of failing the whole file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCustomerRecord {
    #[serde(default, alias = "account_code", alias = "거래처코드")]
    pub account_code: String,
    #[serde(default, alias = "account_name", alias = "거래처명")]
    pub account_name: String,
    #[serde(default, deserialize_with = "optional_text", alias = "지역")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "optional_text", alias = "담당자")]
    pub manager: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", alias = "recent_month_sales")]
    pub recent_month_sales: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "total_sales")]
    pub total_sales: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "growth_vs_3_month")]
    pub growth_vs_3_month: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "growth_vs_year_ago")]
    pub growth_vs_year_ago: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "unique_products")]
    pub unique_products: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "year_over_year_growth_rate")]
    pub year_over_year_growth_rate: Option<NumericCell>,
    #[serde(default, deserialize_with = "lenient_number", alias = "half_year_growth_rate")]
    pub half_year_growth_rate: Option<NumericCell>,
}

/// One numeric cell after lenient parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum NumericCell {
    Value(f64),
    /// Original text of a cell that is not a number.
    Invalid(String),
}

impl From<f64> for NumericCell {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl TryFrom<RawCustomerRecord> for CustomerRecord {
    type Error = DomainError;

    fn try_from(raw: RawCustomerRecord) -> Result<Self, Self::Error> {
        let code = raw.account_code.trim().to_owned();
        let check = FieldCheck { account_code: &code };

        let recent_month_sales = check.amount("recent_month_sales", raw.recent_month_sales, true)?;
        let total_sales = check.amount("total_sales", raw.total_sales, true)?;
        let growth_vs_3_month = check.amount("growth_vs_3_month", raw.growth_vs_3_month, false)?;
        let growth_vs_year_ago =
            check.amount("growth_vs_year_ago", raw.growth_vs_year_ago, false)?;
        let unique_products = check.count("unique_products", raw.unique_products)?;
        let year_over_year_growth_rate =
            check.rate("year_over_year_growth_rate", raw.year_over_year_growth_rate)?;
        let half_year_growth_rate =
            check.rate("half_year_growth_rate", raw.half_year_growth_rate)?;

        Ok(Self {
            account_code: code,
            account_name: raw.account_name.trim().to_owned(),
            region: raw.region,
            manager: raw.manager,
            recent_month_sales,
            total_sales,
            growth_vs_3_month,
            growth_vs_year_ago,
            unique_products,
            year_over_year_growth_rate,
            half_year_growth_rate,
        })
    }
}

struct FieldCheck<'a> {
    account_code: &'a str,
}

impl FieldCheck<'_> {
    fn reject(&self, field: &'static str, reason: impl Into<String>) -> DomainError {
        DomainError::InvalidRecord {
            account_code: self.account_code.to_owned(),
            field,
            reason: reason.into(),
        }
    }

    fn number(
        &self,
        field: &'static str,
        cell: Option<NumericCell>,
    ) -> Result<Option<f64>, DomainError> {
        match cell {
            None => Ok(None),
            Some(NumericCell::Value(value)) => Ok(Some(value)),
            Some(NumericCell::Invalid(text)) => {
                Err(self.reject(field, format!("expected a numeric value, got `{text}`")))
            }
        }
    }

    fn amount(
        &self,
        field: &'static str,
        cell: Option<NumericCell>,
        non_negative: bool,
    ) -> Result<i64, DomainError> {
        let value = self.number(field, cell)?.unwrap_or(0.0);
        if !value.is_finite() {
            return Err(self.reject(field, format!("expected a finite amount, got {value}")));
        }
        if non_negative && value < 0.0 {
            return Err(self.reject(field, format!("amount must not be negative, got {value}")));
        }
        if value.abs() > i64::MAX as f64 {
            return Err(self.reject(field, "amount is out of range"));
        }
        Ok(value.round() as i64)
    }

    fn count(&self, field: &'static str, cell: Option<NumericCell>) -> Result<u32, DomainError> {
        let value = self.number(field, cell)?.unwrap_or(0.0);
        if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
            return Err(self.reject(field, format!("expected a non-negative count, got {value}")));
        }
        Ok(value.round() as u32)
    }

    fn rate(
        &self,
        field: &'static str,
        cell: Option<NumericCell>,
    ) -> Result<Option<f64>, DomainError> {
        match self.number(field, cell)? {
            Some(rate) if !rate.is_finite() => {
                Err(self.reject(field, format!("expected a finite percentage, got {rate}")))
            }
            other => Ok(other),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberCell {
    Number(f64),
    Text(String),
}

/// Numbers, numeric strings with thousands separators, and blank cells.
/// Anything else is kept as [`NumericCell::Invalid`].
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<NumericCell>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = match Option::<NumberCell>::deserialize(deserializer)? {
        None => None,
        Some(NumberCell::Number(value)) => Some(NumericCell::Value(value)),
        Some(NumberCell::Text(text)) => {
            let cleaned: String =
                text.trim().chars().filter(|ch| *ch != ',' && *ch != '_').collect();
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned.parse::<f64>().map_or(NumericCell::Invalid(text), NumericCell::Value))
            }
        }
    };
    Ok(cell)
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.map(|text| text.trim().to_owned()).filter(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::{CustomerRecord, NumericCell, RawCustomerRecord};
    use crate::errors::DomainError;

    fn raw(json: &str) -> RawCustomerRecord {
        serde_json::from_str(json).expect("raw record should deserialize")
    }

    #[test]
    fn camel_case_json_converts_with_defaults() {
        let record = CustomerRecord::try_from(raw(
            r#"{"accountCode":" C-1 ","accountName":"이내과의원","recentMonthSales":42770000,
                "growthVs3Month":1870000,"growthVsYearAgo":3060000}"#,
        ))
        .expect("valid record");

        assert_eq!(record.account_code, "C-1");
        assert_eq!(record.recent_month_sales, 42_770_000);
        assert_eq!(record.growth_vs_3_month, 1_870_000);
        assert_eq!(record.total_sales, 0);
        assert_eq!(record.unique_products, 0);
        assert_eq!(record.year_over_year_growth_rate, None);
    }

    #[test]
    fn numeric_strings_with_separators_are_accepted() {
        let record = CustomerRecord::try_from(raw(
            r#"{"account_code":"C-2","recent_month_sales":"19,340,000","unique_products":"4"}"#,
        ))
        .expect("valid record");

        assert_eq!(record.recent_month_sales, 19_340_000);
        assert_eq!(record.unique_products, 4);
    }

    #[test]
    fn blank_and_null_cells_default_to_zero() {
        let record = CustomerRecord::try_from(raw(
            r#"{"accountCode":"C-3","recentMonthSales":"","totalSales":null}"#,
        ))
        .expect("valid record");

        assert_eq!(record.recent_month_sales, 0);
        assert_eq!(record.total_sales, 0);
    }

    #[test]
    fn negative_sales_are_rejected_at_the_boundary() {
        let error = CustomerRecord::try_from(raw(r#"{"accountCode":"C-4","recentMonthSales":-5}"#))
            .expect_err("negative sales must be rejected");

        assert!(matches!(
            error,
            DomainError::InvalidRecord { ref account_code, field: "recent_month_sales", .. }
                if account_code == "C-4"
        ));
    }

    #[test]
    fn non_finite_text_is_rejected() {
        let error =
            CustomerRecord::try_from(raw(r#"{"accountCode":"C-5","growthVs3Month":"NaN"}"#))
                .expect_err("NaN must be rejected");
        assert!(matches!(error, DomainError::InvalidRecord { field: "growth_vs_3_month", .. }));

        let error =
            CustomerRecord::try_from(raw(r#"{"accountCode":"C-5","halfYearGrowthRate":"inf"}"#))
                .expect_err("infinite rate must be rejected");
        assert!(matches!(error, DomainError::InvalidRecord { field: "half_year_growth_rate", .. }));
    }

    #[test]
    fn negative_growth_deltas_are_allowed() {
        let record = CustomerRecord::try_from(raw(
            r#"{"accountCode":"C-6","recentMonthSales":10500000,"growthVs3Month":-540000}"#,
        ))
        .expect("valid record");
        assert_eq!(record.growth_vs_3_month, -540_000);
    }

    #[test]
    fn garbage_number_is_rejected_per_record() {
        let raw = raw(r#"{"accountCode":"C-7","recentMonthSales":"twelve million"}"#);
        assert_eq!(raw.recent_month_sales, Some(NumericCell::Invalid("twelve million".into())));

        let error = CustomerRecord::try_from(raw).expect_err("text amount must be rejected");
        match error {
            DomainError::InvalidRecord { account_code, field, reason } => {
                assert_eq!(account_code, "C-7");
                assert_eq!(field, "recent_month_sales");
                assert_eq!(reason, "expected a numeric value, got `twelve million`");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn korean_headers_are_aliases() {
        let record = CustomerRecord::try_from(raw(
            r#"{"거래처코드":"K-1","거래처명":"연세봄안과의원","담당자":"김영업","recentMonthSales":1}"#,
        ))
        .expect("valid record");
        assert_eq!(record.account_code, "K-1");
        assert_eq!(record.account_name, "연세봄안과의원");
        assert_eq!(record.manager.as_deref(), Some("김영업"));
    }
}
