//! Certificate counters, served as Prometheus text on `/certificates/metrics`.
//!
//! The HTTP middleware keeps its own registry on `/metrics`.

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    pub static ref CERTIFICATE_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("certificates_total", "Certificates attempted, by outcome"),
        &["outcome"]
    )
    .expect("static metric definition");
}

pub fn register() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(CERTIFICATE_OUTCOMES.clone()))
}

pub fn record_outcome(success: bool) {
    let label = if success { "success" } else { "failure" };
    CERTIFICATE_OUTCOMES.with_label_values(&[label]).inc();
}

/// Text exposition of every registered certificate metric.
pub fn gather_text() -> prometheus::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
