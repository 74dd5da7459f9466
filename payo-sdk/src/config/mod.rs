//! Client-side API configuration shared by the SDK client and the CLI.

mod api;

pub use api::{ApiConfig, Endpoints, DEFAULT_BASE_URL};
