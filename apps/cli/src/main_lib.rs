use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use appstore_reports::{BinaryAttachment, ItemFailure, ItemOutput, ReportItem};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if json {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub fn load_items(path: &Path) -> anyhow::Result<Vec<ReportItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Items file {} is not a valid item list", path.display()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BinarySummary {
    property: String,
    file_name: String,
    mime_type: String,
    path: PathBuf,
    size: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummary {
    paired_item: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    json: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    binary: Option<BinarySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_class: Option<String>,
}

/// Counts of a finished batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Write attachments next to an `items.json` describing every item.
pub fn write_outputs(
    output_dir: &Path,
    results: Vec<Result<ItemOutput, ItemFailure>>,
) -> anyhow::Result<BatchSummary> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;

    let mut summary = BatchSummary::default();
    let mut items = Vec::with_capacity(results.len());

    for result in results {
        match result {
            Ok(output) => {
                let paired_item = output.paired_item;
                match write_attachment(output_dir, output.binary) {
                    Ok(binary) => {
                        summary.succeeded += 1;
                        items.push(ItemSummary {
                            paired_item,
                            json: Some(output.json),
                            binary,
                            error: None,
                            failure_class: None,
                        });
                    }
                    Err(e) => {
                        summary.failed += 1;
                        tracing::error!("Item {}: {:#}", paired_item, e);
                        items.push(ItemSummary {
                            paired_item,
                            json: Some(output.json),
                            binary: None,
                            error: Some(format!("{:#}", e)),
                            failure_class: Some("Output".to_string()),
                        });
                    }
                }
            }
            Err(failure) => {
                summary.failed += 1;
                tracing::error!("{}", failure);
                items.push(ItemSummary {
                    paired_item: failure.paired_item,
                    json: None,
                    binary: None,
                    error: Some(failure.error.to_string()),
                    failure_class: Some(format!("{:?}", failure.error.failure_class())),
                });
            }
        }
    }

    let index_path = output_dir.join("items.json");
    fs::write(&index_path, serde_json::to_vec_pretty(&items)?)
        .with_context(|| format!("Failed to write {}", index_path.display()))?;

    Ok(summary)
}

fn write_attachment(
    output_dir: &Path,
    attachment: Option<BinaryAttachment>,
) -> anyhow::Result<Option<BinarySummary>> {
    let Some(attachment) = attachment else {
        return Ok(None);
    };
    let path = output_dir.join(&attachment.file_name);
    if path.parent() != Some(output_dir) {
        anyhow::bail!(
            "Attachment name {:?} escapes the output directory",
            attachment.file_name
        );
    }
    fs::write(&path, &attachment.data)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {} ({} bytes)", path.display(), attachment.data.len());

    Ok(Some(BinarySummary {
        size: attachment.data.len(),
        property: attachment.property,
        file_name: attachment.file_name,
        mime_type: attachment.mime_type,
        path,
    }))
}
