//! Resource resolution: from report selectors to a downloadable artifact.
//!
//! Analytics reports are discovered through four chained listings
//! (request → report → instance → segment). Each stage keeps the first
//! candidate in server order and stops the run if none is left. Sales and
//! finance reports are served directly by a filtered endpoint, so their
//! location is built without any lookup.

mod node;
mod stage;

pub use node::{parse_listing, ResolutionChainNode};
pub use stage::ResolutionStage;

use std::sync::Arc;

use log::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::errors::{ReportsError, Result};
use crate::models::{
    AnalyticsCriteria, ArtifactLocation, FinanceCriteria, ResolutionCriteria, SalesCriteria,
    SignedToken,
};
use crate::transport::{build_url, ReportTransport};

/// Resolves report selectors to an [`ArtifactLocation`].
pub struct ResourceResolver {
    transport: Arc<dyn ReportTransport>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl ResourceResolver {
    pub fn new(transport: Arc<dyn ReportTransport>, base_url: &str) -> Self {
        Self::with_clock(transport, base_url, Arc::new(SystemClock))
    }

    pub fn with_clock(
        transport: Arc<dyn ReportTransport>,
        base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            clock,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve `criteria` using `token` for every lookup.
    pub async fn resolve(
        &self,
        criteria: &ResolutionCriteria,
        token: &SignedToken,
    ) -> Result<ArtifactLocation> {
        criteria.validate()?;

        let location = match criteria {
            ResolutionCriteria::Analytics(c) => self.resolve_analytics(c, token).await?,
            ResolutionCriteria::Sales(c) => self.sales_location(c),
            ResolutionCriteria::Finance(c) => self.finance_location(c),
        };

        info!(
            "[Resolver] Resolved {} report for {}",
            criteria.family().as_str(),
            criteria.entity_id()
        );
        Ok(location)
    }

    async fn resolve_analytics(
        &self,
        criteria: &AnalyticsCriteria,
        token: &SignedToken,
    ) -> Result<ArtifactLocation> {
        let mut parent_id = criteria.app_id.clone();
        let mut selected: Option<ResolutionChainNode> = None;

        for stage in ResolutionStage::CHAIN {
            self.ensure_token_valid(token, stage)?;

            let url = build_url(&self.base_url, &stage.path(&parent_id), &stage.query(criteria));
            debug!("[Resolver] {} stage: GET {}", stage, url);

            let body = self.transport.get_json(&url, &token.value).await?;
            let candidates = parse_listing(body)?;
            let total = candidates.len();

            let node = candidates
                .into_iter()
                .find(|n| stage.accepts(n, criteria))
                .ok_or_else(|| {
                    ReportsError::stage_not_found(
                        stage,
                        stage.not_found_message(criteria, &parent_id),
                    )
                })?;

            debug!(
                "[Resolver] {} stage selected {} ({} candidates)",
                stage, node.id, total
            );
            parent_id = node.id.clone();
            selected = Some(node);
        }

        let segment = selected.ok_or_else(|| {
            ReportsError::stage_not_found(
                ResolutionStage::Segment,
                ResolutionStage::Segment.not_found_message(criteria, &parent_id),
            )
        })?;

        let url = segment.attribute_str("url").ok_or_else(|| {
            ReportsError::stage_not_found(
                ResolutionStage::Segment,
                format!("Segment {} has no download url", segment.id),
            )
        })?;

        Ok(ArtifactLocation::presigned(url))
    }

    fn sales_location(&self, criteria: &SalesCriteria) -> ArtifactLocation {
        let url = build_url(
            &self.base_url,
            "/v1/salesReports",
            &[
                ("filter[reportType]", "SALES"),
                ("filter[reportSubType]", "SUMMARY"),
                ("filter[frequency]", criteria.frequency.as_str()),
                ("filter[reportDate]", criteria.report_date.as_str()),
                ("filter[vendorNumber]", criteria.vendor_number.as_str()),
            ],
        );
        debug!("[Resolver] Sales report URL: {}", url);
        ArtifactLocation::authenticated(url)
    }

    fn finance_location(&self, criteria: &FinanceCriteria) -> ArtifactLocation {
        let url = build_url(
            &self.base_url,
            "/v1/financeReports",
            &[
                ("filter[reportDate]", criteria.report_date.as_str()),
                ("filter[reportType]", criteria.report_type.as_str()),
                ("filter[regionCode]", criteria.region_code.as_str()),
                ("filter[vendorNumber]", criteria.vendor_number.as_str()),
            ],
        );
        debug!("[Resolver] Finance report URL: {}", url);
        ArtifactLocation::authenticated(url)
    }

    fn ensure_token_valid(&self, token: &SignedToken, stage: ResolutionStage) -> Result<()> {
        if token.is_valid_at(self.clock.now()) {
            Ok(())
        } else {
            Err(ReportsError::credential(format!(
                "Token expired at {} before the {} lookup",
                token.expires_at, stage
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{AccessType, FinanceReportType, Frequency};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://api.test";

    /// Serves canned listings keyed by path and records every URL requested.
    #[derive(Default)]
    struct StubTransport {
        listings: HashMap<String, Value>,
        calls: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn with(mut self, path: &str, body: Value) -> Self {
            self.listings.insert(path.to_string(), body);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportTransport for StubTransport {
        async fn get_json(&self, url: &str, bearer: &str) -> Result<Value> {
            assert_eq!(bearer, "signed-token");
            self.calls.lock().unwrap().push(url.to_string());
            let path = url.trim_start_matches(BASE).split('?').next().unwrap_or("");
            self.listings
                .get(path)
                .cloned()
                .ok_or_else(|| ReportsError::api(404, format!("no stub for {}", path)))
        }

        async fn get_bytes(&self, _url: &str, _bearer: Option<&str>) -> Result<Vec<u8>> {
            unreachable!("resolver never downloads")
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn token() -> SignedToken {
        SignedToken {
            value: "signed-token".to_string(),
            issued_at: now(),
            expires_at: now() + Duration::seconds(600),
        }
    }

    fn criteria() -> ResolutionCriteria {
        ResolutionCriteria::Analytics(AnalyticsCriteria {
            app_id: "app-1".to_string(),
            access_type: AccessType::Ongoing,
            category: "APP_USAGE".to_string(),
            report_name: "App Sessions Standard".to_string(),
            granularity: Frequency::Daily,
            report_date: "2025-01-01".to_string(),
        })
    }

    fn full_chain() -> StubTransport {
        StubTransport::default()
            .with(
                "/v1/apps/app-1/analyticsReportRequests",
                json!({ "data": [
                    { "type": "analyticsReportRequests", "id": "req-snapshot", "attributes": { "accessType": "ONE_TIME_SNAPSHOT" } },
                    { "type": "analyticsReportRequests", "id": "req-ongoing", "attributes": { "accessType": "ONGOING" } }
                ]}),
            )
            .with(
                "/v1/analyticsReportRequests/req-ongoing/reports",
                json!({ "data": [{ "type": "analyticsReports", "id": "rep-1" }] }),
            )
            .with(
                "/v1/analyticsReports/rep-1/instances",
                json!({ "data": [{ "type": "analyticsReportInstances", "id": "inst-1" }] }),
            )
            .with(
                "/v1/analyticsReportInstances/inst-1/segments",
                json!({ "data": [{ "type": "analyticsReportSegments", "id": "seg-1", "attributes": { "url": "https://download.test/seg-1.gz" } }] }),
            )
    }

    fn resolver(transport: Arc<StubTransport>) -> ResourceResolver {
        ResourceResolver::with_clock(transport, BASE, Arc::new(FixedClock(now())))
    }

    #[tokio::test]
    async fn test_resolves_full_analytics_chain() {
        let transport = Arc::new(full_chain());
        let location = resolver(transport.clone())
            .resolve(&criteria(), &token())
            .await
            .unwrap();

        assert_eq!(
            location,
            ArtifactLocation::presigned("https://download.test/seg-1.gz")
        );
        let calls = transport.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(
            calls[1],
            "https://api.test/v1/analyticsReportRequests/req-ongoing/reports?filter%5Bcategory%5D=APP_USAGE&filter%5Bname%5D=App%20Sessions%20Standard"
        );
        assert_eq!(
            calls[2],
            "https://api.test/v1/analyticsReports/rep-1/instances?filter%5Bgranularity%5D=DAILY&filter%5BprocessingDate%5D=2025-01-01"
        );
    }

    #[tokio::test]
    async fn test_tie_break_takes_first_in_server_order() {
        let transport = Arc::new(
            full_chain()
                .with(
                    "/v1/analyticsReportRequests/req-ongoing/reports",
                    json!({ "data": [
                        { "type": "analyticsReports", "id": "rep-1" },
                        { "type": "analyticsReports", "id": "rep-2" }
                    ]}),
                )
                .with(
                    "/v1/analyticsReportInstances/inst-1/segments",
                    json!({ "data": [
                        { "type": "analyticsReportSegments", "id": "seg-1", "attributes": { "url": "https://download.test/first.gz" } },
                        { "type": "analyticsReportSegments", "id": "seg-2", "attributes": { "url": "https://download.test/second.gz" } }
                    ]}),
                ),
        );
        let location = resolver(transport.clone())
            .resolve(&criteria(), &token())
            .await
            .unwrap();

        assert_eq!(location.url, "https://download.test/first.gz");
        assert!(transport.calls()[2].contains("/analyticsReports/rep-1/instances"));
    }

    #[tokio::test]
    async fn test_empty_stage_stops_the_chain() {
        let empty = json!({ "data": [] });
        let cases = [
            (
                "/v1/apps/app-1/analyticsReportRequests",
                ResolutionStage::Request,
                1,
            ),
            (
                "/v1/analyticsReportRequests/req-ongoing/reports",
                ResolutionStage::Report,
                2,
            ),
            (
                "/v1/analyticsReports/rep-1/instances",
                ResolutionStage::Instance,
                3,
            ),
            (
                "/v1/analyticsReportInstances/inst-1/segments",
                ResolutionStage::Segment,
                4,
            ),
        ];

        for (path, stage, expected_calls) in cases {
            let transport = Arc::new(full_chain().with(path, empty.clone()));
            let err = resolver(transport.clone())
                .resolve(&criteria(), &token())
                .await
                .unwrap_err();

            assert_eq!(err.stage(), Some(stage), "stage for {}", path);
            assert_eq!(transport.calls().len(), expected_calls, "calls for {}", path);
        }
    }

    #[tokio::test]
    async fn test_request_without_matching_access_type_is_not_found() {
        let transport = Arc::new(full_chain().with(
            "/v1/apps/app-1/analyticsReportRequests",
            json!({ "data": [
                { "type": "analyticsReportRequests", "id": "req-snapshot", "attributes": { "accessType": "ONE_TIME_SNAPSHOT" } }
            ]}),
        ));
        let err = resolver(transport.clone())
            .resolve(&criteria(), &token())
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(ResolutionStage::Request));
        assert!(err.to_string().starts_with("No report found for this entity"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_segment_without_url_is_not_found() {
        let transport = Arc::new(full_chain().with(
            "/v1/analyticsReportInstances/inst-1/segments",
            json!({ "data": [{ "type": "analyticsReportSegments", "id": "seg-1" }] }),
        ));
        let err = resolver(transport)
            .resolve(&criteria(), &token())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(ResolutionStage::Segment));
    }

    #[tokio::test]
    async fn test_transport_error_is_propagated() {
        let transport = Arc::new(StubTransport::default());
        let err = resolver(transport)
            .resolve(&criteria(), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportsError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_before_any_call() {
        let transport = Arc::new(full_chain());
        let late = ResourceResolver::with_clock(
            transport.clone(),
            BASE,
            Arc::new(FixedClock(now() + Duration::seconds(601))),
        );
        let err = late.resolve(&criteria(), &token()).await.unwrap_err();

        assert!(matches!(err, ReportsError::Credential(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sales_and_finance_locations_need_no_lookup() {
        let transport = Arc::new(StubTransport::default());
        let resolver = resolver(transport.clone());

        let sales = ResolutionCriteria::Sales(SalesCriteria {
            vendor_number: "80012345".to_string(),
            frequency: Frequency::Daily,
            report_date: "2025-01-15".to_string(),
        });
        let location = resolver.resolve(&sales, &token()).await.unwrap();
        assert!(location.requires_auth);
        assert_eq!(
            location.url,
            "https://api.test/v1/salesReports?filter%5BreportType%5D=SALES&filter%5BreportSubType%5D=SUMMARY&filter%5Bfrequency%5D=DAILY&filter%5BreportDate%5D=2025-01-15&filter%5BvendorNumber%5D=80012345"
        );

        let finance = ResolutionCriteria::Finance(FinanceCriteria {
            vendor_number: "80012345".to_string(),
            report_type: FinanceReportType::FinanceDetail,
            region_code: "Z1".to_string(),
            report_date: "2025-02".to_string(),
        });
        let location = resolver.resolve(&finance, &token()).await.unwrap();
        assert!(location.requires_auth);
        assert!(location.url.starts_with("https://api.test/v1/financeReports?"));
        assert!(location.url.contains("filter%5BreportType%5D=FINANCE_DETAIL"));
        assert!(location.url.contains("filter%5BregionCode%5D=Z1"));

        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_criteria_fail_before_any_call() {
        let transport = Arc::new(full_chain());
        let blank = ResolutionCriteria::Analytics(AnalyticsCriteria {
            app_id: String::new(),
            access_type: AccessType::Ongoing,
            category: "APP_USAGE".to_string(),
            report_name: "App Sessions Standard".to_string(),
            granularity: Frequency::Daily,
            report_date: "2025-01-01".to_string(),
        });
        let err = resolver(transport.clone())
            .resolve(&blank, &token())
            .await
            .unwrap_err();

        assert!(matches!(err, ReportsError::InvalidParameter(_)));
        assert!(transport.calls().is_empty());
    }
}
