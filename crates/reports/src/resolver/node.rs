use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::errors::Result;

/// One resource returned by a discovery listing.
///
/// Only its id survives into the next stage.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolutionChainNode {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ResolutionChainNode {
    /// String attribute by name, if present.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Vec<ResolutionChainNode>>,
}

/// Decode a listing body, in server order. A missing or null `data` is an empty list.
pub fn parse_listing(body: Value) -> Result<Vec<ResolutionChainNode>> {
    let response: ListResponse = serde_json::from_value(body)?;
    Ok(response.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_listing_keeps_server_order() {
        let nodes = parse_listing(json!({
            "data": [
                { "type": "analyticsReports", "id": "b", "attributes": { "name": "B" } },
                { "type": "analyticsReports", "id": "a" }
            ],
            "links": { "self": "https://example.com" }
        }))
        .unwrap();

        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(nodes[0].attribute_str("name"), Some("B"));
        assert!(nodes[1].attributes.is_empty());
    }

    #[test]
    fn test_missing_or_null_data_is_empty() {
        assert!(parse_listing(json!({})).unwrap().is_empty());
        assert!(parse_listing(json!({ "data": null })).unwrap().is_empty());
    }

    #[test]
    fn test_null_attributes_are_empty() {
        let nodes = parse_listing(json!({
            "data": [{ "type": "analyticsReportRequests", "id": "r1", "attributes": null }]
        }))
        .unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].attributes.is_empty());
        assert_eq!(nodes[0].attribute_str("accessType"), None);
    }

    #[test]
    fn test_malformed_node_is_a_json_error() {
        let result = parse_listing(json!({ "data": [{ "type": "analyticsReports" }] }));
        assert!(result.is_err());
    }
}
