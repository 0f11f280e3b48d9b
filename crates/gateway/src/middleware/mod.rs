//! HTTP middleware

mod metrics;
mod timeout;

pub use metrics::track_metrics;
pub use timeout::request_timeout;
