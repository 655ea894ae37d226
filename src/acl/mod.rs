//! Access-control mapping
//!
//! Turns the raw grant records a resource's permissions endpoint returns
//! into the normalized role strings the downstream index matches on.

mod entry;
mod mapper;

pub use entry::{AccessEntry, GranteeKind};
pub use mapper::{PermissionMapper, TENANT_EVERYONE_ROLE};
