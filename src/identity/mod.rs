//! Identity resolution with bounded, session-scoped caches
//!
//! Classifying principals and resolving canonical names are remote lookups
//! the permission mapper performs constantly; this module memoizes them in
//! four independent size-bounded caches owned by the session. The caches
//! have no TTL and no push-based invalidation: an identity resolved once is
//! trusted until the session tears them down together.

mod cache;
mod resolver;

pub use cache::BoundedCache;
pub use resolver::{IdentityResolver, PrincipalKind};
