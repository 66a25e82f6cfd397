use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::criteria::ResolutionCriteria;

/// Default output field for parsed sections.
pub const DEFAULT_RESULT_FIELD: &str = "report";

/// Binary property name under which downloads are attached.
pub const BINARY_PROPERTY: &str = "report";

/// What to do with a retrieved report.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Emit the decompressed file as a binary attachment.
    DownloadReport,
    /// Parse the file into records and merge them into the item JSON.
    #[default]
    ParseReport,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Output field name for parsed sections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_field: Option<String>,
}

impl ReportOptions {
    pub fn result_field(&self) -> &str {
        self.result_field
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_RESULT_FIELD)
    }
}

/// One input item: operation, selectors and the JSON it carries along.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportItem {
    #[serde(default)]
    pub operation: OperationMode,

    #[serde(flatten)]
    pub criteria: ResolutionCriteria,

    #[serde(default)]
    pub options: ReportOptions,

    /// Passthrough JSON; parsed sections are merged into it
    #[serde(default)]
    pub json: Map<String, Value>,
}

impl ReportItem {
    pub fn new(operation: OperationMode, criteria: ResolutionCriteria) -> Self {
        Self {
            operation,
            criteria,
            options: ReportOptions::default(),
            json: Map::new(),
        }
    }

    pub fn with_result_field(mut self, field: impl Into<String>) -> Self {
        self.options.result_field = Some(field.into());
        self
    }
}

/// A downloaded report file ready to be written or forwarded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryAttachment {
    pub property: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Result of processing one input item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemOutput {
    pub json: Map<String, Value>,
    pub binary: Option<BinaryAttachment>,
    /// Index of the input item this output belongs to
    pub paired_item: usize,
}
