use prometheus::{Encoder, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub routes_total: IntCounterVec,
    pub route_jobs_in_queue: IntGauge,
    pub route_resolution_latency_seconds: HistogramVec,
    pub street_graph_builds: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let routes_total = IntCounterVec::new(
            Opts::new("routes_total", "Total route resolutions by outcome"),
            &["outcome"],
        )
        .expect("valid routes_total metric");

        let route_jobs_in_queue =
            IntGauge::new("route_jobs_in_queue", "Current number of queued route jobs")
                .expect("valid route_jobs_in_queue metric");

        let route_resolution_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "route_resolution_latency_seconds",
                "Latency of route resolution in seconds",
            ),
            &["outcome"],
        )
        .expect("valid route_resolution_latency_seconds metric");

        let street_graph_builds = IntGauge::new(
            "street_graph_builds",
            "Fetch-and-build cycles of the street graph cache since startup",
        )
        .expect("valid street_graph_builds metric");

        registry
            .register(Box::new(routes_total.clone()))
            .expect("register routes_total");
        registry
            .register(Box::new(route_jobs_in_queue.clone()))
            .expect("register route_jobs_in_queue");
        registry
            .register(Box::new(route_resolution_latency_seconds.clone()))
            .expect("register route_resolution_latency_seconds");
        registry
            .register(Box::new(street_graph_builds.clone()))
            .expect("register street_graph_builds");

        Self {
            registry,
            routes_total,
            route_jobs_in_queue,
            route_resolution_latency_seconds,
            street_graph_builds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
