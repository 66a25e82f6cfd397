//! App Store Connect report retrieval.
//!
//! This crate signs API tokens, walks the report discovery chain, downloads
//! the gzip report file and turns its tab separated content into records.
//!
//! # Architecture
//!
//! ```text
//! +-------------+    +------------------+    +------------------+
//! | TokenSigner | -> | ResourceResolver | -> | PayloadRetriever |
//! +-------------+    +------------------+    +------------------+
//!   ES256 JWT          request -> report        GET + gunzip
//!                      -> instance -> segment          |
//!                                                      v
//!                   +--------------------+    +------------------+
//!                   | ReportOrchestrator | <- |  parser::parse   |
//!                   +--------------------+    +------------------+
//!                     download or parse         plain / finance
//! ```
//!
//! # Core Types
//!
//! - [`Credential`] - API key identity supplied per invocation
//! - [`ResolutionCriteria`] - Report family and its selectors
//! - [`ArtifactLocation`] - Where the report file lives
//! - [`ParsedReport`] - Parsed sections of a report file
//! - [`ReportItem`] / [`ItemOutput`] - Orchestrator input and output

pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod resolver;
pub mod retriever;
pub mod signer;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ReportsConfig, DEFAULT_BASE_URL};
pub use errors::{FailureClass, ReportsError, Result};
pub use models::{
    AccessType, AnalyticsCriteria, ArtifactLocation, BinaryAttachment, Credential,
    FinanceCriteria, FinanceReportType, Frequency, ItemOutput, OperationMode, RawPayload,
    ReportFamily, ReportItem, ReportOptions, ResolutionCriteria, SalesCriteria, SignedToken,
};
pub use orchestrator::{FailedStep, ItemFailure, ReportOrchestrator, RunState};
pub use parser::{parse, AggregatedRow, ParseStrategy, ParsedReport, ParsedSection, Record};
pub use resolver::{ResolutionChainNode, ResolutionStage, ResourceResolver};
pub use retriever::{gunzip, PayloadRetriever};
pub use signer::{TokenSigner, TOKEN_AUDIENCE, TOKEN_TTL_SECS};
pub use transport::{HttpTransport, ReportTransport};
