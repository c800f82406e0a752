//! Shared response envelope types for API handlers.
//!
//! Collection and lookup endpoints use a `{ "data": ... }` envelope. The
//! generation and user endpoints answer with bare objects, which is what
//! the upload form and auth callback consume.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
