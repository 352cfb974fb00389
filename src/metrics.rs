//! Prometheus metrics collection for chatd.
//!
//! Metrics live in a process-wide registry and are exposed by
//! [`crate::http`] when a metrics port is configured. Recording before
//! [`init`] is a silent no-op, which keeps unit tests free of setup.
//!
//! - `chat_command_total{command}` - commands processed by type
//! - `chat_command_errors_total{command,error}` - rejected commands
//! - `chat_faults_injected_total{kind}` - drop / corrupt / disconnect
//! - `chat_broadcast_fanout` - recipients per BCST

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters
// ========================================================================

/// Lines handed to the socket writer.
pub static LINES_SENT: OnceLock<IntCounter> = OnceLock::new();

/// Commands processed by type (HELO, BCST, ...).
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by type and error kind.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Injected network faults by kind.
pub static FAULTS_INJECTED: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges
// ========================================================================

/// Open sessions, logged in or not.
pub static SESSIONS_ACTIVE: OnceLock<IntGauge> = OnceLock::new();

/// Sessions holding a username.
pub static LOGGED_IN_USERS: OnceLock<IntGauge> = OnceLock::new();

/// Recipients per broadcast.
pub static BROADCAST_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup. Later calls leave the first set of metrics in place.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(LINES_SENT, IntCounter::new("chat_lines_sent_total", "Lines written to clients"));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chat_command_total", "Chat commands processed by type"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chat_command_errors_total", "Chat command errors by type"), &["command", "error"]));
    register!(FAULTS_INJECTED, IntCounterVec::new(Opts::new("chat_faults_injected_total", "Injected network faults by kind"), &["kind"]));
    register!(SESSIONS_ACTIVE, IntGauge::new("chat_sessions_active", "Open client sessions"));
    register!(LOGGED_IN_USERS, IntGauge::new("chat_logged_in_users", "Sessions holding a username"));
    register!(BROADCAST_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chat_broadcast_fanout", "Recipients per broadcast")
            .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[inline]
pub fn record_command(command: &str) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
}

#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record an injected fault (`drop`, `corrupt` or `disconnect`).
#[inline]
pub fn record_fault(kind: &str) {
    if let Some(c) = FAULTS_INJECTED.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[inline]
pub fn record_line_sent() {
    if let Some(c) = LINES_SENT.get() {
        c.inc();
    }
}

#[inline]
pub fn record_fanout(recipients: usize) {
    if let Some(h) = BROADCAST_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

#[inline]
pub fn session_opened() {
    if let Some(g) = SESSIONS_ACTIVE.get() {
        g.inc();
    }
}

#[inline]
pub fn session_closed() {
    if let Some(g) = SESSIONS_ACTIVE.get() {
        g.dec();
    }
}

#[inline]
pub fn set_logged_in(count: usize) {
    if let Some(g) = LOGGED_IN_USERS.get() {
        g.set(count as i64);
    }
}
