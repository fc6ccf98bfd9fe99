use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::geo::graph::StreetGraph;
use crate::geo::GeoPoint;

#[derive(Debug, Error)]
#[error("street network fetch failed: {0}")]
pub struct GraphFetchError(pub String);

/// Street-network retrieval by named area. Seam for tests.
#[async_trait]
pub trait FetchGraph: Send + Sync {
    async fn fetch(&self, area: &str) -> Result<StreetGraph, GraphFetchError>;
}

/// Overpass API client. Asks for every `highway` way inside the named area
/// and derives edge lengths from node coordinates.
pub struct OverpassGraphSource {
    client: reqwest::Client,
    base_url: String,
}

impl OverpassGraphSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("delivery-hub/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

fn overpass_query(area: &str) -> String {
    format!(
        "[out:json][timeout:120];\
         area[name=\"{area}\"]->.searchArea;\
         (way[\"highway\"](area.searchArea););\
         (._;>;);\
         out body;"
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
    },
    Way {
        nodes: Vec<i64>,
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

// Ways a pedestrian cannot take even though they carry a highway tag.
const NON_WALKABLE: &[&str] = &["motorway", "motorway_link", "trunk", "trunk_link"];

fn walkable(tags: &HashMap<String, String>) -> bool {
    match tags.get("highway") {
        Some(kind) => !NON_WALKABLE.contains(&kind.as_str()),
        None => false,
    }
}

fn build_graph(response: OverpassResponse) -> StreetGraph {
    let mut coords: HashMap<i64, GeoPoint> = HashMap::new();
    let mut ways: Vec<Vec<i64>> = Vec::new();

    for element in response.elements {
        match element {
            Element::Node { id, lat, lon } => {
                coords.insert(id, GeoPoint { lat, lng: lon });
            }
            Element::Way { nodes, tags } => {
                if walkable(&tags) {
                    ways.push(nodes);
                }
            }
            Element::Other => {}
        }
    }

    let mut graph = StreetGraph::new();
    for way in &ways {
        for id in way {
            if let Some(point) = coords.get(id) {
                graph.insert_node(*id, *point);
            }
        }
    }
    for way in &ways {
        for pair in way.windows(2) {
            graph.connect(pair[0], pair[1]);
        }
    }

    graph
}

#[async_trait]
impl FetchGraph for OverpassGraphSource {
    async fn fetch(&self, area: &str) -> Result<StreetGraph, GraphFetchError> {
        let response = self
            .client
            .post(&self.base_url)
            .body(overpass_query(area))
            .send()
            .await
            .map_err(|err| GraphFetchError(err.to_string()))?
            .error_for_status()
            .map_err(|err| GraphFetchError(err.to_string()))?
            .json::<OverpassResponse>()
            .await
            .map_err(|err| GraphFetchError(err.to_string()))?;

        let graph = build_graph(response);
        if graph.node_count() == 0 {
            return Err(GraphFetchError(format!("area \"{area}\" yielded no nodes")));
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::{build_graph, overpass_query, OverpassResponse};

    fn parse(json: &str) -> OverpassResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn residential_ways_become_edges() {
        let response = parse(
            r#"{"elements":[
                {"type":"node","id":1,"lat":49.80,"lon":73.10},
                {"type":"node","id":2,"lat":49.80,"lon":73.11},
                {"type":"node","id":3,"lat":49.80,"lon":73.12},
                {"type":"way","id":10,"nodes":[1,2,3],"tags":{"highway":"residential"}}
            ]}"#,
        );

        let graph = build_graph(response);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.shortest_path(1, 3).is_some());
    }

    #[test]
    fn motorways_are_excluded() {
        let response = parse(
            r#"{"elements":[
                {"type":"node","id":1,"lat":49.80,"lon":73.10},
                {"type":"node","id":2,"lat":49.80,"lon":73.11},
                {"type":"way","id":10,"nodes":[1,2],"tags":{"highway":"motorway"}}
            ]}"#,
        );

        let graph = build_graph(response);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nodes_outside_walkable_ways_are_dropped() {
        let response = parse(
            r#"{"elements":[
                {"type":"node","id":1,"lat":49.80,"lon":73.10},
                {"type":"node","id":2,"lat":49.80,"lon":73.11},
                {"type":"node","id":99,"lat":49.00,"lon":73.00},
                {"type":"way","id":10,"nodes":[1,2],"tags":{"highway":"footway"}}
            ]}"#,
        );

        let graph = build_graph(response);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.point_of(99).is_none());
    }

    #[test]
    fn unknown_element_kinds_are_ignored() {
        let response = parse(
            r#"{"elements":[
                {"type":"relation","id":7,"members":[]},
                {"type":"node","id":1,"lat":49.80,"lon":73.10}
            ]}"#,
        );

        let graph = build_graph(response);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn query_names_the_area() {
        let query = overpass_query("Karaganda");
        assert!(query.contains("area[name=\"Karaganda\"]"));
        assert!(query.contains("way[\"highway\"]"));
    }
}
