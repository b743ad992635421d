//! Recommendation Metrics
//!
//! Prometheus metrics for the related and personalized pipelines

use actix_web::{HttpResponse, Responder};
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::time::Duration;

static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "recommendation_requests_total",
        "Recommendation requests by mode and outcome",
        &["mode", "outcome"]
    )
    .expect("Failed to register recommendation requests metric")
});

static CANDIDATES_FETCHED: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recommendation_candidates_fetched",
        "Candidates returned by the metadata store per request",
        &["mode"],
        vec![0.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0]
    )
    .expect("Failed to register candidates fetched metric")
});

static PIPELINE_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "recommendation_pipeline_duration_seconds",
        "Duration of recommendation pipeline stages",
        &["mode", "stage"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to register pipeline duration metric")
});

/// Record a finished request (outcome: ok/empty/error)
pub fn record_request(mode: &str, outcome: &str) {
    REQUESTS_TOTAL.with_label_values(&[mode, outcome]).inc();
}

pub fn record_candidates_fetched(mode: &str, count: usize) {
    CANDIDATES_FETCHED
        .with_label_values(&[mode])
        .observe(count as f64);
}

/// Record stage duration (stage: fetch/score/hydrate)
pub fn record_stage_duration(mode: &str, stage: &str, duration: Duration) {
    PIPELINE_DURATION_SECONDS
        .with_label_values(&[mode, stage])
        .observe(duration.as_secs_f64());
}

/// Handler that serialises Prometheus metrics in text format.
pub async fn metrics_handler() -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}
