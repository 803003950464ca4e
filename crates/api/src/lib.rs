pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod metrics;
pub mod routes;

pub use routes::{build_router, ApiState};
