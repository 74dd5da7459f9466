#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod events;
pub mod finance;
pub mod processors;
pub mod queries;
pub mod summary;
pub mod utils;
