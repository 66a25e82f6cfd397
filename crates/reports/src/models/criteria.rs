use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{ReportsError, Result};

/// Report family served by the remote service.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFamily {
    Analytics,
    Sales,
    Finance,
}

impl ReportFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analytics => "analytics",
            Self::Sales => "sales",
            Self::Finance => "finance",
        }
    }
}

/// Access type of an analytics report request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    OneTimeSnapshot,
    #[default]
    Ongoing,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTimeSnapshot => "ONE_TIME_SNAPSHOT",
            Self::Ongoing => "ONGOING",
        }
    }
}

/// Granularity of an analytics instance, or frequency of a sales report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    #[default]
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
        }
    }
}

/// Finance report flavour; decides the parsing strategy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinanceReportType {
    #[default]
    Financial,
    FinanceDetail,
}

impl FinanceReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "FINANCIAL",
            Self::FinanceDetail => "FINANCE_DETAIL",
        }
    }
}

fn default_category() -> String {
    "APP_USAGE".to_string()
}

fn default_report_name() -> String {
    "App Store Installation and Deletion Standard".to_string()
}

/// Selectors for an analytics report (resolved through the discovery chain).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsCriteria {
    pub app_id: String,

    #[serde(default, alias = "access_type")]
    pub access_type: AccessType,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_report_name")]
    pub report_name: String,

    #[serde(default)]
    pub granularity: Frequency,

    /// Processing date (YYYY-MM-DD)
    pub report_date: String,
}

/// Selectors for a summary sales report.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesCriteria {
    pub vendor_number: String,

    #[serde(default)]
    pub frequency: Frequency,

    /// Report date (YYYY-MM-DD, or YYYY-MM for monthly)
    pub report_date: String,
}

/// Selectors for a finance report.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceCriteria {
    pub vendor_number: String,

    #[serde(default)]
    pub report_type: FinanceReportType,

    /// Region code, `ZZ` or `Z1` for all regions
    pub region_code: String,

    /// Fiscal month (YYYY-MM)
    pub report_date: String,
}

/// What to fetch: the report family plus its family-specific selectors.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum ResolutionCriteria {
    Analytics(AnalyticsCriteria),
    Sales(SalesCriteria),
    Finance(FinanceCriteria),
}

impl ResolutionCriteria {
    pub fn family(&self) -> ReportFamily {
        match self {
            Self::Analytics(_) => ReportFamily::Analytics,
            Self::Sales(_) => ReportFamily::Sales,
            Self::Finance(_) => ReportFamily::Finance,
        }
    }

    /// The entity the report belongs to: the app for analytics, the vendor otherwise.
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Analytics(c) => &c.app_id,
            Self::Sales(c) => &c.vendor_number,
            Self::Finance(c) => &c.vendor_number,
        }
    }

    pub fn report_date(&self) -> &str {
        match self {
            Self::Analytics(c) => &c.report_date,
            Self::Sales(c) => &c.report_date,
            Self::Finance(c) => &c.report_date,
        }
    }

    /// Reject empty selectors before any request is made.
    pub fn validate(&self) -> Result<()> {
        let required: Vec<(&str, &str)> = match self {
            Self::Analytics(c) => vec![
                ("appId", c.app_id.as_str()),
                ("category", c.category.as_str()),
                ("reportName", c.report_name.as_str()),
                ("reportDate", c.report_date.as_str()),
            ],
            Self::Sales(c) => vec![
                ("vendorNumber", c.vendor_number.as_str()),
                ("reportDate", c.report_date.as_str()),
            ],
            Self::Finance(c) => vec![
                ("vendorNumber", c.vendor_number.as_str()),
                ("regionCode", c.region_code.as_str()),
                ("reportDate", c.report_date.as_str()),
            ],
        };

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ReportsError::invalid_parameter(format!(
                    "{} is required for {} reports",
                    name,
                    self.family().as_str()
                )));
            }
        }

        let date = self.report_date();
        if !is_report_date(date) {
            return Err(ReportsError::invalid_parameter(format!(
                "reportDate must be YYYY-MM-DD or YYYY-MM, got {:?}",
                date
            )));
        }
        Ok(())
    }
}

/// `YYYY-MM-DD` (daily, weekly) or `YYYY-MM` (monthly, finance periods).
fn is_report_date(value: &str) -> bool {
    match value.len() {
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok(),
        _ => false,
    }
}
