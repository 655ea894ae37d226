//! Continuation cursors and pages
//!
//! A cursor is an opaque token the remote API hands back with each page.
//! An absent token means either "start of collection" (before the first
//! fetch) or "no more pages" (after the last one); the walker tells the two
//! apart by position, never by inspecting the token.

/// An opaque continuation token for a paginated remote collection.
///
/// Cursors are immutable: each page replaces the previous cursor, it is
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(Option<String>);

impl Cursor {
    /// The cursor that starts enumeration at the beginning of a collection.
    pub fn start() -> Self {
        Cursor(None)
    }

    /// The cursor that marks the end of a collection.
    pub fn end() -> Self {
        Cursor(None)
    }

    /// Builds a cursor from a continuation token.
    ///
    /// An empty token is normalized to the end cursor, matching APIs that
    /// signal completion with an empty string rather than an absent field.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        if token.is_empty() {
            Cursor(None)
        } else {
            Cursor(Some(token))
        }
    }

    /// Builds a cursor from an optional continuation token.
    pub fn from_opt(token: Option<String>) -> Self {
        match token {
            Some(t) => Cursor::from_token(t),
            None => Cursor(None),
        }
    }

    /// Returns the raw token, if any.
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether this cursor carries no token (start or end of collection).
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// One page of a remote collection: an ordered batch of items plus the
/// cursor for the page after it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items in remote order.
    pub items: Vec<T>,

    /// Cursor for the next page; empty when this was the last page.
    pub next: Cursor,
}

impl<T> Page<T> {
    /// A page with items and no continuation (the final page).
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            next: Cursor::end(),
        }
    }

    /// A page with items and a continuation token.
    pub fn with_next(items: Vec<T>, token: impl Into<String>) -> Self {
        Page {
            items,
            next: Cursor::from_token(token),
        }
    }
}
