use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub position_requests_total: IntCounterVec,
    pub status_transitions_total: IntCounterVec,
    pub rank_passes_total: IntCounter,
    pub rank_latency_seconds: Histogram,
    pub orders_in_snapshot: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let position_requests_total = IntCounterVec::new(
            Opts::new(
                "position_requests_total",
                "Driver position acquisitions by outcome",
            ),
            &["outcome"],
        )
        .expect("valid position_requests_total metric");

        let status_transitions_total = IntCounterVec::new(
            Opts::new(
                "status_transitions_total",
                "Order status transitions by outcome",
            ),
            &["outcome"],
        )
        .expect("valid status_transitions_total metric");

        let rank_passes_total =
            IntCounter::new("rank_passes_total", "Total distance-ranking passes")
                .expect("valid rank_passes_total metric");

        let rank_latency_seconds = Histogram::with_opts(prometheus::HistogramOpts::new(
            "rank_latency_seconds",
            "Latency of one ranking pass in seconds",
        ))
        .expect("valid rank_latency_seconds metric");

        let orders_in_snapshot = IntGauge::new(
            "orders_in_snapshot",
            "Number of orders in the latest store snapshot",
        )
        .expect("valid orders_in_snapshot metric");

        registry
            .register(Box::new(position_requests_total.clone()))
            .expect("register position_requests_total");
        registry
            .register(Box::new(status_transitions_total.clone()))
            .expect("register status_transitions_total");
        registry
            .register(Box::new(rank_passes_total.clone()))
            .expect("register rank_passes_total");
        registry
            .register(Box::new(rank_latency_seconds.clone()))
            .expect("register rank_latency_seconds");
        registry
            .register(Box::new(orders_in_snapshot.clone()))
            .expect("register orders_in_snapshot");

        Self {
            registry,
            position_requests_total,
            status_transitions_total,
            rank_passes_total,
            rank_latency_seconds,
            orders_in_snapshot,
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

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
