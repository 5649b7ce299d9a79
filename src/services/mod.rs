//! Services orchestrating the fetcher, cache, and filter chain.
//!
//! Services are built from the application [`Context`](crate::context::Context)
//! through the `FromRef` trait.

mod discovery;

pub use discovery::{BoothSweep, DiscoveryService};
