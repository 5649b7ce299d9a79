//! Dependency injection infrastructure.
//!
//! Services are assembled from the root [`Context`](crate::context::Context)
//! by resolving each dependency through `FromRef`:
//!
//! ```ignore
//! use hierarchy_discovery::di::FromRef;
//!
//! let ctx = Context::connect(config)?;
//! let discovery = DiscoveryService::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
///
/// Types that implement `FromRef<T>` can be extracted from `&T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}
