use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::geo::graph::StreetGraph;
use crate::geo::overpass::{FetchGraph, GraphFetchError};

/// Process-wide street-graph cache keyed by area name. A graph is fetched
/// at most once per area and handed out as an `Arc` snapshot; `refresh`
/// swaps the entry so in-flight path computations keep the graph they
/// started with.
pub struct GraphCache {
    source: Arc<dyn FetchGraph>,
    areas: DashMap<String, Arc<StreetGraph>>,
    build_lock: Mutex<()>,
    builds: AtomicU64,
}

impl GraphCache {
    pub fn new(source: Arc<dyn FetchGraph>) -> Self {
        Self {
            source,
            areas: DashMap::new(),
            build_lock: Mutex::new(()),
            builds: AtomicU64::new(0),
        }
    }

    /// Cached snapshot for the area, fetching and building it on first use.
    /// Concurrent first calls serialize on the build lock so the area is
    /// fetched once.
    pub async fn get_or_build(&self, area: &str) -> Result<Arc<StreetGraph>, GraphFetchError> {
        if let Some(graph) = self.areas.get(area) {
            return Ok(graph.clone());
        }

        let _guard = self.build_lock.lock().await;
        if let Some(graph) = self.areas.get(area) {
            return Ok(graph.clone());
        }

        let graph = self.build(area).await?;
        self.areas.insert(area.to_string(), graph.clone());
        Ok(graph)
    }

    /// Rebuilds the area unconditionally and swaps it in. The previous
    /// snapshot stays alive for readers that already hold it.
    pub async fn refresh(&self, area: &str) -> Result<Arc<StreetGraph>, GraphFetchError> {
        let _guard = self.build_lock.lock().await;
        let graph = self.build(area).await?;
        self.areas.insert(area.to_string(), graph.clone());
        Ok(graph)
    }

    /// Drops the cached snapshot; the next `get_or_build` refetches.
    pub fn invalidate(&self, area: &str) -> bool {
        self.areas.remove(area).is_some()
    }

    pub fn contains(&self, area: &str) -> bool {
        self.areas.contains_key(area)
    }

    /// Number of fetch-and-build cycles since startup.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    async fn build(&self, area: &str) -> Result<Arc<StreetGraph>, GraphFetchError> {
        let graph = self.source.fetch(area).await?;
        self.builds.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            area,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "street graph built"
        );
        Ok(Arc::new(graph))
    }
}
