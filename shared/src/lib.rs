pub mod admin;
pub mod http;
pub mod metrics_defs;
