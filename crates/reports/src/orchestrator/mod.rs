//! Per-item orchestration: sign → resolve → retrieve → download or parse.
//!
//! Every item gets its own token and resolution chain. Items are independent;
//! a failed item never aborts its siblings in [`ReportOrchestrator::run_batch`].

mod naming;
mod state;

pub use naming::{download_file_name, mime_type_for};
pub use state::{FailedStep, RunState};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde_json::Map;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::config::ReportsConfig;
use crate::errors::{ReportsError, Result};
use crate::models::{
    BinaryAttachment, Credential, ItemOutput, OperationMode, RawPayload, ReportItem,
    BINARY_PROPERTY,
};
use crate::parser::{parse, ParseStrategy};
use crate::resolver::ResourceResolver;
use crate::retriever::PayloadRetriever;
use crate::signer::TokenSigner;
use crate::transport::{HttpTransport, ReportTransport};

/// A failed item, with where it stopped.
#[derive(Debug, Error)]
#[error("Item {paired_item} failed in state {state}: {error}")]
pub struct ItemFailure {
    /// Index of the input item
    pub paired_item: usize,
    /// Terminal state, always `RunState::Failed(_)`
    pub state: RunState,
    #[source]
    pub error: ReportsError,
}

/// Runs report items through the whole pipeline.
///
/// # Example
///
/// ```ignore
/// let orchestrator = ReportOrchestrator::new(&ReportsConfig::default())?;
/// let outputs = orchestrator.run_batch(&items, &credential).await;
/// ```
pub struct ReportOrchestrator {
    signer: TokenSigner,
    resolver: ResourceResolver,
    retriever: PayloadRetriever,
    max_concurrency: usize,
}

impl ReportOrchestrator {
    /// Create an orchestrator talking to the real service.
    pub fn new(config: &ReportsConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::with_timeout(config.request_timeout)?);
        Ok(Self::with_transport(config, transport, Arc::new(SystemClock)))
    }

    /// Create an orchestrator over a custom transport and clock.
    pub fn with_transport(
        config: &ReportsConfig,
        transport: Arc<dyn ReportTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            signer: TokenSigner::new(clock.clone()),
            resolver: ResourceResolver::with_clock(transport.clone(), &config.base_url, clock),
            retriever: PayloadRetriever::new(transport),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Process every item, keeping input order. Failures stay per item.
    pub async fn run_batch(
        &self,
        items: &[ReportItem],
        credential: &Credential,
    ) -> Vec<std::result::Result<ItemOutput, ItemFailure>> {
        info!(
            "[Orchestrator] Running {} item(s), concurrency {}",
            items.len(),
            self.max_concurrency
        );

        stream::iter(items.iter().enumerate())
            .map(|(index, item)| self.run_item(index, item, credential))
            .buffered(self.max_concurrency)
            .collect::<Vec<_>>()
            .await
    }

    /// Process every item and stop at the first failure.
    pub async fn run_all(
        &self,
        items: &[ReportItem],
        credential: &Credential,
    ) -> std::result::Result<Vec<ItemOutput>, ItemFailure> {
        let mut outputs = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            outputs.push(self.run_item(index, item, credential).await?);
        }
        Ok(outputs)
    }

    /// Process a single item.
    pub async fn run_item(
        &self,
        index: usize,
        item: &ReportItem,
        credential: &Credential,
    ) -> std::result::Result<ItemOutput, ItemFailure> {
        let mut state = RunState::Init;

        let token = advance(index, &mut state, self.signer.sign(credential))?;
        let location = advance(
            index,
            &mut state,
            self.resolver.resolve(&item.criteria, &token).await,
        )?;
        let payload = advance(
            index,
            &mut state,
            self.retriever.retrieve(&location, &token).await,
        )?;

        let output = match item.operation {
            OperationMode::DownloadReport => {
                state = RunState::DownloadOutput;
                download_output(index, item, payload)
            }
            OperationMode::ParseReport => {
                state = RunState::ParsedOutput;
                parsed_output(index, item, &payload)
            }
        };
        debug!("[Orchestrator] Item {} reached {}", index, state);

        state = RunState::Done;
        info!(
            "[Orchestrator] Item {} ({} report) {}",
            index,
            item.criteria.family().as_str(),
            state
        );
        Ok(output)
    }
}

/// Move to the next state on success, or to `Failed` with the pending step.
fn advance<T>(
    index: usize,
    state: &mut RunState,
    outcome: Result<T>,
) -> std::result::Result<T, ItemFailure> {
    match outcome {
        Ok(value) => {
            *state = match *state {
                RunState::Init => RunState::TokenSigned,
                RunState::TokenSigned => RunState::Resolved,
                _ => RunState::Retrieved,
            };
            debug!("[Orchestrator] Item {} reached {}", index, state);
            Ok(value)
        }
        Err(error) => {
            let step = state.pending_step().unwrap_or(FailedStep::Retrieval);
            *state = RunState::Failed(step);
            warn!("[Orchestrator] Item {} {}: {}", index, state, error);
            Err(ItemFailure {
                paired_item: index,
                state: *state,
                error,
            })
        }
    }
}

fn download_output(index: usize, item: &ReportItem, payload: RawPayload) -> ItemOutput {
    let file_name = download_file_name(&item.criteria);
    let mime_type = mime_type_for(&file_name).to_string();

    ItemOutput {
        json: Map::new(),
        binary: Some(BinaryAttachment {
            property: BINARY_PROPERTY.to_string(),
            file_name,
            mime_type,
            data: payload.into_bytes(),
        }),
        paired_item: index,
    }
}

fn parsed_output(index: usize, item: &ReportItem, payload: &RawPayload) -> ItemOutput {
    let report = parse(payload, ParseStrategy::for_criteria(&item.criteria));
    debug!(
        "[Orchestrator] Item {} parsed {} detail row(s)",
        index,
        report.detail_len()
    );

    let mut json = item.json.clone();
    json.extend(report.into_fields(item.options.result_field()));

    ItemOutput {
        json,
        binary: None,
        paired_item: index,
    }
}
