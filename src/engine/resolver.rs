use thiserror::Error;

use crate::geo::cache::GraphCache;
use crate::geo::geocode::{Geocode, GeocodeError};
use crate::geo::GeoPoint;
use crate::models::order::{RouteFailureKind, RouteSummary};

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("address \"{address}\" could not be geocoded")]
    GeocodeMiss { address: String },

    #[error("geocoding \"{address}\" failed: {message}")]
    GeocodeTimeout { address: String, message: String },

    #[error("street network unavailable: {0}")]
    GraphFetch(String),

    #[error("no walkable path between the snapped endpoints")]
    NoPathFound,
}

impl RouteError {
    pub fn kind(&self) -> RouteFailureKind {
        match self {
            RouteError::GeocodeMiss { .. } => RouteFailureKind::GeocodeMiss,
            RouteError::GeocodeTimeout { .. } => RouteFailureKind::GeocodeTimeout,
            RouteError::GraphFetch(_) => RouteFailureKind::GraphFetch,
            RouteError::NoPathFound => RouteFailureKind::NoPathFound,
        }
    }

    /// Timeouts and fetch failures may clear up; a miss or a disconnected
    /// network will not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RouteError::GeocodeTimeout { .. } | RouteError::GraphFetch(_)
        )
    }
}

/// Geocode both addresses, snap them onto the cached street graph for the
/// area, and compute the shortest walking path by edge length.
pub async fn resolve_route(
    geocoder: &dyn Geocode,
    graph_cache: &GraphCache,
    area: &str,
    origin: &str,
    destination: &str,
) -> Result<RouteSummary, RouteError> {
    let origin_point = geocode_one(geocoder, origin).await?;
    let destination_point = geocode_one(geocoder, destination).await?;

    let graph = graph_cache
        .get_or_build(area)
        .await
        .map_err(|err| RouteError::GraphFetch(err.0))?;

    let from = graph
        .nearest_node(&origin_point)
        .ok_or(RouteError::NoPathFound)?;
    let to = graph
        .nearest_node(&destination_point)
        .ok_or(RouteError::NoPathFound)?;

    let nodes = graph.shortest_path(from, to).ok_or(RouteError::NoPathFound)?;
    let path: Vec<GeoPoint> = nodes.iter().filter_map(|id| graph.point_of(*id)).collect();
    let length_m = graph.path_length_m(&nodes);

    Ok(RouteSummary {
        nodes,
        path,
        length_m,
    })
}

async fn geocode_one(geocoder: &dyn Geocode, address: &str) -> Result<GeoPoint, RouteError> {
    geocoder.geocode(address).await.map_err(|err| match err {
        GeocodeError::NoMatch => RouteError::GeocodeMiss {
            address: address.to_string(),
        },
        GeocodeError::Timeout(message) => RouteError::GeocodeTimeout {
            address: address.to_string(),
            message,
        },
    })
}

/// OSM foot-routing directions link between the snapped endpoints.
pub fn route_link(summary: &RouteSummary) -> Option<String> {
    let first = summary.path.first()?;
    let last = summary.path.last()?;
    Some(format!(
        "https://www.openstreetmap.org/directions?engine=fossgis_osrm_foot&route={:.5}%2C{:.5}%3B{:.5}%2C{:.5}",
        first.lat, first.lng, last.lat, last.lng
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::{resolve_route, route_link};
    use crate::geo::cache::GraphCache;
    use crate::geo::geocode::{Geocode, GeocodeError};
    use crate::geo::graph::StreetGraph;
    use crate::geo::overpass::{FetchGraph, GraphFetchError};
    use crate::geo::GeoPoint;
    use crate::models::order::RouteFailureKind;

    struct MapGeocoder {
        known: HashMap<String, GeoPoint>,
    }

    #[async_trait]
    impl Geocode for MapGeocoder {
        async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
            self.known
                .get(address)
                .copied()
                .ok_or(GeocodeError::NoMatch)
        }
    }

    struct StaticSource;

    #[async_trait]
    impl FetchGraph for StaticSource {
        async fn fetch(&self, _area: &str) -> Result<StreetGraph, GraphFetchError> {
            // 1 -- 2 -- 3, plus isolated pair 8 -- 9 far away.
            let mut g = StreetGraph::new();
            g.insert_node(1, GeoPoint { lat: 49.800, lng: 73.100 });
            g.insert_node(2, GeoPoint { lat: 49.800, lng: 73.110 });
            g.insert_node(3, GeoPoint { lat: 49.800, lng: 73.120 });
            g.insert_node(8, GeoPoint { lat: 49.900, lng: 73.300 });
            g.insert_node(9, GeoPoint { lat: 49.901, lng: 73.301 });
            g.connect(1, 2);
            g.connect(2, 3);
            g.connect(8, 9);
            Ok(g)
        }
    }

    fn geocoder() -> MapGeocoder {
        let mut known = HashMap::new();
        known.insert(
            "Abay Street 10, Karagandy".to_string(),
            GeoPoint { lat: 49.8001, lng: 73.1001 },
        );
        known.insert(
            "Bukhar-Zhyrau Avenue 45, Karagandy".to_string(),
            GeoPoint { lat: 49.8001, lng: 73.1199 },
        );
        known.insert(
            "Lakeside 1".to_string(),
            GeoPoint { lat: 49.9001, lng: 73.3001 },
        );
        MapGeocoder { known }
    }

    fn cache() -> GraphCache {
        GraphCache::new(Arc::new(StaticSource))
    }

    #[tokio::test]
    async fn resolves_between_known_addresses() {
        let geocoder = geocoder();
        let cache = cache();

        let summary = resolve_route(
            &geocoder,
            &cache,
            "Karaganda",
            "Abay Street 10, Karagandy",
            "Bukhar-Zhyrau Avenue 45, Karagandy",
        )
        .await
        .unwrap();

        // Endpoints are the nodes nearest the geocoded coordinates.
        assert_eq!(summary.nodes, vec![1, 2, 3]);
        assert_eq!(summary.path.len(), 3);
        assert!(summary.length_m > 0.0);
    }

    #[tokio::test]
    async fn unknown_address_is_a_miss_naming_the_address() {
        let geocoder = geocoder();
        let cache = cache();

        let err = resolve_route(
            &geocoder,
            &cache,
            "Karaganda",
            "XYZ-nonexistent-place-000",
            "Abay Street 10, Karagandy",
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), RouteFailureKind::GeocodeMiss);
        assert!(err.to_string().contains("XYZ-nonexistent-place-000"));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn disconnected_components_have_no_path() {
        let geocoder = geocoder();
        let cache = cache();

        let err = resolve_route(
            &geocoder,
            &cache,
            "Karaganda",
            "Abay Street 10, Karagandy",
            "Lakeside 1",
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), RouteFailureKind::NoPathFound);
    }

    #[tokio::test]
    async fn graph_fetch_failure_is_transient() {
        struct FailingSource;

        #[async_trait]
        impl FetchGraph for FailingSource {
            async fn fetch(&self, _area: &str) -> Result<StreetGraph, GraphFetchError> {
                Err(GraphFetchError("connection refused".to_string()))
            }
        }

        let geocoder = geocoder();
        let cache = GraphCache::new(Arc::new(FailingSource));

        let err = resolve_route(
            &geocoder,
            &cache,
            "Karaganda",
            "Abay Street 10, Karagandy",
            "Bukhar-Zhyrau Avenue 45, Karagandy",
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), RouteFailureKind::GraphFetch);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn link_points_at_osm_foot_routing() {
        let geocoder = geocoder();
        let cache = cache();

        let summary = resolve_route(
            &geocoder,
            &cache,
            "Karaganda",
            "Abay Street 10, Karagandy",
            "Bukhar-Zhyrau Avenue 45, Karagandy",
        )
        .await
        .unwrap();

        let link = route_link(&summary).unwrap();
        assert!(link.starts_with("https://www.openstreetmap.org/directions"));
        assert!(link.contains("49.80000"));
        assert!(link.contains("73.12000"));
    }
}
