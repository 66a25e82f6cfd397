//! Report models
//!
//! - `credential` - API key identity and signed tokens
//! - `criteria` - Report families and their selectors
//! - `artifact` - Resolved download location and decompressed payload
//! - `item` - Per-invocation input items and their outputs

mod artifact;
mod credential;
mod criteria;
mod item;

pub use artifact::{ArtifactLocation, RawPayload};
pub use credential::{Credential, SignedToken};
pub use criteria::{
    AccessType, AnalyticsCriteria, FinanceCriteria, FinanceReportType, Frequency, ReportFamily,
    ResolutionCriteria, SalesCriteria,
};
pub use item::{
    BinaryAttachment, ItemOutput, OperationMode, ReportItem, ReportOptions, BINARY_PROPERTY,
    DEFAULT_RESULT_FIELD,
};
