use std::fmt;

use crate::models::AnalyticsCriteria;

use super::node::ResolutionChainNode;

/// One hop of the analytics discovery chain.
///
/// Each stage knows its endpoint, its server-side filters, its client-side
/// filter and how to describe an empty result. The resolver walks
/// [`ResolutionStage::CHAIN`] in order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ResolutionStage {
    Request,
    Report,
    Instance,
    Segment,
}

impl ResolutionStage {
    pub const CHAIN: [ResolutionStage; 4] = [
        ResolutionStage::Request,
        ResolutionStage::Report,
        ResolutionStage::Instance,
        ResolutionStage::Segment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Report => "report",
            Self::Instance => "instance",
            Self::Segment => "segment",
        }
    }

    /// JSON:API resource type of the listed entries.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Request => "analyticsReportRequests",
            Self::Report => "analyticsReports",
            Self::Instance => "analyticsReportInstances",
            Self::Segment => "analyticsReportSegments",
        }
    }

    /// Listing path; `parent_id` is the app id for the first stage and the
    /// previous stage's selected id afterwards.
    pub fn path(&self, parent_id: &str) -> String {
        let parent_id = urlencoding::encode(parent_id);
        match self {
            Self::Request => format!("/v1/apps/{}/analyticsReportRequests", parent_id),
            Self::Report => format!("/v1/analyticsReportRequests/{}/reports", parent_id),
            Self::Instance => format!("/v1/analyticsReports/{}/instances", parent_id),
            Self::Segment => format!("/v1/analyticsReportInstances/{}/segments", parent_id),
        }
    }

    /// Server-side filters for this stage.
    pub fn query<'a>(&self, criteria: &'a AnalyticsCriteria) -> Vec<(&'static str, &'a str)> {
        match self {
            Self::Request | Self::Segment => Vec::new(),
            Self::Report => vec![
                ("filter[category]", criteria.category.as_str()),
                ("filter[name]", criteria.report_name.as_str()),
            ],
            Self::Instance => vec![
                ("filter[granularity]", criteria.granularity.as_str()),
                ("filter[processingDate]", criteria.report_date.as_str()),
            ],
        }
    }

    /// Client-side filter. Only report requests are filtered locally; the
    /// other listings are already narrowed by the server.
    pub fn accepts(&self, node: &ResolutionChainNode, criteria: &AnalyticsCriteria) -> bool {
        match self {
            Self::Request => {
                node.kind == self.resource_type()
                    && node.attribute_str("accessType") == Some(criteria.access_type.as_str())
            }
            Self::Report | Self::Instance | Self::Segment => true,
        }
    }

    /// Message for an empty candidate set, naming the selectors involved.
    pub fn not_found_message(&self, criteria: &AnalyticsCriteria, parent_id: &str) -> String {
        match self {
            Self::Request => format!(
                "No report found for this entity: app {} has no {} report request",
                criteria.app_id,
                criteria.access_type.as_str()
            ),
            Self::Report => format!(
                "Report Name {} ({}) for {} not found",
                criteria.report_name, criteria.category, criteria.report_date
            ),
            Self::Instance => format!(
                "Instance not found for {} granularity on {} (report {})",
                criteria.granularity.as_str(),
                criteria.report_date,
                parent_id
            ),
            Self::Segment => format!("Segment not found for instance {}", parent_id),
        }
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessType, Frequency};
    use serde_json::json;

    fn criteria() -> AnalyticsCriteria {
        AnalyticsCriteria {
            app_id: "1234567890".to_string(),
            access_type: AccessType::Ongoing,
            category: "APP_USAGE".to_string(),
            report_name: "App Sessions Standard".to_string(),
            granularity: Frequency::Daily,
            report_date: "2025-01-01".to_string(),
        }
    }

    fn node(kind: &str, access_type: &str) -> ResolutionChainNode {
        serde_json::from_value(json!({
            "type": kind,
            "id": "r1",
            "attributes": { "accessType": access_type }
        }))
        .unwrap()
    }

    #[test]
    fn test_request_stage_filters_on_type_and_access() {
        let stage = ResolutionStage::Request;
        let c = criteria();
        assert!(stage.accepts(&node("analyticsReportRequests", "ONGOING"), &c));
        assert!(!stage.accepts(&node("analyticsReportRequests", "ONE_TIME_SNAPSHOT"), &c));
        assert!(!stage.accepts(&node("analyticsReports", "ONGOING"), &c));

        let bare: ResolutionChainNode = serde_json::from_value(json!({
            "type": "analyticsReportRequests",
            "id": "r2",
            "attributes": null
        }))
        .unwrap();
        assert!(!stage.accepts(&bare, &c));
    }

    #[test]
    fn test_later_stages_accept_everything() {
        let c = criteria();
        for stage in &ResolutionStage::CHAIN[1..] {
            assert!(stage.accepts(&node("anything", "ONE_TIME_SNAPSHOT"), &c));
        }
    }

    #[test]
    fn test_stage_queries() {
        let c = criteria();
        assert!(ResolutionStage::Request.query(&c).is_empty());
        assert_eq!(
            ResolutionStage::Report.query(&c),
            vec![
                ("filter[category]", "APP_USAGE"),
                ("filter[name]", "App Sessions Standard")
            ]
        );
        assert_eq!(
            ResolutionStage::Instance.query(&c),
            vec![
                ("filter[granularity]", "DAILY"),
                ("filter[processingDate]", "2025-01-01")
            ]
        );
        assert!(ResolutionStage::Segment.query(&c).is_empty());
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            ResolutionStage::Request.path("123"),
            "/v1/apps/123/analyticsReportRequests"
        );
        assert_eq!(
            ResolutionStage::Segment.path("inst-1"),
            "/v1/analyticsReportInstances/inst-1/segments"
        );
    }

    #[test]
    fn test_not_found_messages_name_selectors() {
        let c = criteria();
        assert_eq!(
            ResolutionStage::Report.not_found_message(&c, "req-1"),
            "Report Name App Sessions Standard (APP_USAGE) for 2025-01-01 not found"
        );
        assert!(ResolutionStage::Request
            .not_found_message(&c, "1234567890")
            .starts_with("No report found for this entity"));
        assert!(ResolutionStage::Instance
            .not_found_message(&c, "rep-1")
            .starts_with("Instance not found"));
        assert_eq!(
            ResolutionStage::Segment.not_found_message(&c, "inst-1"),
            "Segment not found for instance inst-1"
        );
    }
}
