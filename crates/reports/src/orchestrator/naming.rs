use crate::models::ResolutionCriteria;

/// File name for a downloaded report:
/// `report_<category-or-type>_<name>_<date>.<ext>`.
pub fn download_file_name(criteria: &ResolutionCriteria) -> String {
    let (kind, name, extension) = match criteria {
        ResolutionCriteria::Analytics(c) => (c.category.as_str(), c.report_name.as_str(), "csv"),
        ResolutionCriteria::Sales(c) => ("sales", c.frequency.as_str(), "tsv"),
        ResolutionCriteria::Finance(c) => {
            (c.report_type.as_str(), c.region_code.as_str(), "tsv")
        }
    };

    format!(
        "report_{}_{}_{}.{}",
        slug(kind),
        slug(name),
        slug(criteria.report_date()),
        extension
    )
}

/// Content type implied by the file extension.
pub fn mime_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("csv") => "text/csv",
        Some("tsv") => "text/tab-separated-values",
        _ => "application/octet-stream",
    }
}

/// Lowercased, whitespace runs joined by `-`, no path separators.
fn slug(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace(['/', '\\'], "_")
        .to_lowercase()
}
