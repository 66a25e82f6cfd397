//! Finance report layouts: detail rows followed by a per-country summary.

use indexmap::IndexMap;

use super::{split_fields, zip_row, AggregatedRow, ParsedReport, ParsedSection, AGGREGATED_MIN_COLUMNS};

/// First field of the row closing the detail section of a financial report.
pub const TOTAL_ROWS_SENTINEL: &str = "Total_Rows";

/// Prefix of the detail header in a finance detail report.
pub const TRANSACTION_DATE_SENTINEL: &str = "Transaction Date";

/// Prefix of the summary header in finance reports.
pub const COUNTRY_OF_SALE_SENTINEL: &str = "Country Of Sale";

pub(super) fn parse_standard(lines: &[&str]) -> ParsedReport {
    let Some((header_line, rest)) = lines.split_first() else {
        return ParsedReport::FinanceStandard {
            detailed: Vec::new(),
            aggregated: Vec::new(),
        };
    };
    let header = split_fields(header_line);

    let sentinel = rest
        .iter()
        .position(|line| split_fields(line)[0] == TOTAL_ROWS_SENTINEL);

    let (detail_lines, summary_lines) = match sentinel {
        Some(pos) => {
            let mut summary = &rest[pos + 1..];
            // The summary may open with its own column header.
            if summary
                .first()
                .is_some_and(|line| line.starts_with(COUNTRY_OF_SALE_SENTINEL))
            {
                summary = &summary[1..];
            }
            (&rest[..pos], summary)
        }
        None => (rest, &[][..]),
    };

    ParsedReport::FinanceStandard {
        detailed: zip_rows(&header, detail_lines),
        aggregated: aggregated_rows(summary_lines),
    }
}

pub(super) fn parse_detail(lines: &[&str]) -> ParsedReport {
    let mut meta = IndexMap::new();
    let mut i = 0;

    while i < lines.len()
        && lines[i].contains('\t')
        && !lines[i].starts_with(TRANSACTION_DATE_SENTINEL)
    {
        let mut parts = lines[i].split('\t');
        let key = parts.next().unwrap_or_default().trim();
        let value = parts.next().unwrap_or_default().trim();
        meta.insert(key.to_string(), value.to_string());
        i += 1;
    }

    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    let Some(header_line) = lines.get(i) else {
        return ParsedReport::FinanceDetail {
            meta,
            detailed: Vec::new(),
            aggregated: Vec::new(),
        };
    };
    let header = split_fields(header_line);
    i += 1;

    let mut detailed = Vec::new();
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if line.starts_with(COUNTRY_OF_SALE_SENTINEL) {
            break;
        }
        detailed.push(zip_row(&header, &split_fields(line)));
    }

    ParsedReport::FinanceDetail {
        meta,
        detailed,
        aggregated: aggregated_rows(&lines[i..]),
    }
}

fn zip_rows(header: &[&str], lines: &[&str]) -> ParsedSection {
    lines
        .iter()
        .map(|line| zip_row(header, &split_fields(line)))
        .collect()
}

/// Summary rows; anything shorter than four columns is dropped.
fn aggregated_rows(lines: &[&str]) -> Vec<AggregatedRow> {
    lines
        .iter()
        .map(|line| split_fields(line))
        .filter(|fields| fields.len() >= AGGREGATED_MIN_COLUMNS)
        .map(|fields| AggregatedRow {
            country: fields[0].to_string(),
            currency: fields[1].to_string(),
            quantity: fields[2].to_string(),
            extended_partner_share: fields[3].to_string(),
        })
        .collect()
}
