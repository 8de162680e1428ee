pub mod api;
pub mod config;
pub mod decision;
pub mod metrics;
pub mod release;
pub mod routing;
pub mod rules;
pub mod storage;

// Not behind #[cfg(test)] so the integration tests under tests/ can share the doubles.
pub mod utils;

pub use api::errors::GrayReleaseError;
pub use release::{GrayRelease, HostBindings, ReleaseSettings};
