//! Artifact download and gzip decompression.

use std::io::Read;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use log::debug;

use crate::errors::{ReportsError, Result};
use crate::models::{ArtifactLocation, RawPayload, SignedToken};
use crate::transport::ReportTransport;

/// Downloads a resolved artifact and inflates it.
pub struct PayloadRetriever {
    transport: Arc<dyn ReportTransport>,
}

impl PayloadRetriever {
    pub fn new(transport: Arc<dyn ReportTransport>) -> Self {
        Self { transport }
    }

    /// Fetch and decompress the file at `location`.
    ///
    /// The token is only sent when the location requires it; pre-signed
    /// segment URLs are fetched anonymously.
    pub async fn retrieve(
        &self,
        location: &ArtifactLocation,
        token: &SignedToken,
    ) -> Result<RawPayload> {
        let bearer = location.requires_auth.then_some(token.value.as_str());
        let compressed = self.transport.get_bytes(&location.url, bearer).await?;
        let payload = gunzip(&compressed)?;

        debug!(
            "[Retriever] Downloaded {} bytes, {} after decompression",
            compressed.len(),
            payload.len()
        );
        Ok(payload)
    }
}

/// Inflate a gzip buffer (concatenated members are read through).
pub fn gunzip(bytes: &[u8]) -> Result<RawPayload> {
    let mut decoder = MultiGzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ReportsError::Decompression(e.to_string()))?;
    Ok(RawPayload::new(out))
}
