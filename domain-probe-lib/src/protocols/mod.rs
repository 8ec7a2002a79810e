//! Protocol implementations for domain probing.
//!
//! Only HTTP(S) is probed today; each protocol lives in its own module.

/// HTTP(S) liveness probe
pub(crate) mod http;

pub(crate) use http::HttpProbeClient;
