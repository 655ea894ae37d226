//! Cursor-based pagination over remote collections
//!
//! Remote collections arrive one page at a time, each page carrying an
//! opaque continuation token. This module hides the token mechanics behind
//! an explicit `next()`-style walker so callers never see cursors and never
//! hold more than one page in memory.

mod cursor;
mod walker;

pub use cursor::{Cursor, Page};
pub use walker::PageWalker;
