//! Tabular report parsing.
//!
//! Report files are tab separated text without an explicit schema. The
//! layout depends on the report family:
//!
//! ```text
//! Plain            header / rows
//! FinanceStandard  header / rows / Total_Rows ... / aggregated rows
//! FinanceDetail    key<TAB>value metadata / Transaction Date header / rows /
//!                  Country Of Sale ... / aggregated rows
//! ```
//!
//! Parsing never fails. Short rows are zipped positionally and simply lack
//! the trailing fields; aggregated rows with fewer than four columns are dropped.

mod finance;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{FinanceReportType, RawPayload, ResolutionCriteria};

/// One parsed row, keyed by column name in header order.
pub type Record = IndexMap<String, String>;

/// Ordered rows of one section.
pub type ParsedSection = Vec<Record>;

/// A row of the per-country summary at the end of finance reports.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    pub country: String,
    pub currency: String,
    pub quantity: String,
    pub extended_partner_share: String,
}

/// Minimum column count of an aggregated row.
pub const AGGREGATED_MIN_COLUMNS: usize = 4;

/// How a payload is laid out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseStrategy {
    /// Header line followed by rows (analytics, sales)
    Plain,
    /// Detail rows, `Total_Rows` sentinel, then the aggregated summary
    FinanceStandard,
    /// Metadata block, detail rows, `Country Of Sale` sentinel, then the summary
    FinanceDetail,
}

impl ParseStrategy {
    pub fn for_criteria(criteria: &ResolutionCriteria) -> Self {
        match criteria {
            ResolutionCriteria::Analytics(_) | ResolutionCriteria::Sales(_) => Self::Plain,
            ResolutionCriteria::Finance(c) => match c.report_type {
                FinanceReportType::Financial => Self::FinanceStandard,
                FinanceReportType::FinanceDetail => Self::FinanceDetail,
            },
        }
    }
}

/// Structured content of a report file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParsedReport {
    Plain {
        rows: ParsedSection,
    },
    FinanceStandard {
        detailed: ParsedSection,
        aggregated: Vec<AggregatedRow>,
    },
    FinanceDetail {
        meta: IndexMap<String, String>,
        detailed: ParsedSection,
        aggregated: Vec<AggregatedRow>,
    },
}

impl ParsedReport {
    /// Output fields for this report under `result_field`:
    /// `<field>` for plain reports, `<field>_meta`, `<field>_detailed` and
    /// `<field>_aggregated` for finance reports.
    pub fn into_fields(self, result_field: &str) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::Plain { rows } => {
                fields.insert(result_field.to_string(), to_value(&rows));
            }
            Self::FinanceStandard {
                detailed,
                aggregated,
            } => {
                fields.insert(format!("{}_detailed", result_field), to_value(&detailed));
                fields.insert(
                    format!("{}_aggregated", result_field),
                    to_value(&aggregated),
                );
            }
            Self::FinanceDetail {
                meta,
                detailed,
                aggregated,
            } => {
                fields.insert(format!("{}_meta", result_field), to_value(&meta));
                fields.insert(format!("{}_detailed", result_field), to_value(&detailed));
                fields.insert(
                    format!("{}_aggregated", result_field),
                    to_value(&aggregated),
                );
            }
        }
        fields
    }

    /// Number of detail rows (plain rows for plain reports).
    pub fn detail_len(&self) -> usize {
        match self {
            Self::Plain { rows } => rows.len(),
            Self::FinanceStandard { detailed, .. } | Self::FinanceDetail { detailed, .. } => {
                detailed.len()
            }
        }
    }
}

// Maps of strings and plain structs always serialize.
fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Parse a decompressed payload with the given strategy.
pub fn parse(payload: &RawPayload, strategy: ParseStrategy) -> ParsedReport {
    let text = payload.as_text();
    let lines = split_lines(&text);

    match strategy {
        ParseStrategy::Plain => ParsedReport::Plain {
            rows: parse_plain(&lines),
        },
        ParseStrategy::FinanceStandard => finance::parse_standard(&lines),
        ParseStrategy::FinanceDetail => finance::parse_detail(&lines),
    }
}

/// Trim the payload and split it into lines without their terminators.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

pub(crate) fn split_fields(line: &str) -> Vec<&str> {
    line.split('\t').collect()
}

/// Zip a row against its header by position. Missing trailing values are
/// left out; surplus values are ignored.
pub(crate) fn zip_row(header: &[&str], row: &[&str]) -> Record {
    header
        .iter()
        .zip(row.iter())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn parse_plain(lines: &[&str]) -> ParsedSection {
    let Some((header_line, rows)) = lines.split_first() else {
        return Vec::new();
    };
    let header = split_fields(header_line);
    rows.iter()
        .map(|line| zip_row(&header, &split_fields(line)))
        .collect()
}
