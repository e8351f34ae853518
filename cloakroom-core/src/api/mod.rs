//! Transport layer for the catalog service.
//!
//! ## Endpoints
//!
//! | Endpoint | Method | Body |
//! |---|---|---|
//! | `/health` | GET | - |
//! | `/api/users/bootstrap` | POST | JSON |
//! | `/api/upload/` | POST | multipart |
//! | `/api/closet/{owner_id}` | GET | - |
//! | `/api/items/{item_id}` | PATCH | JSON |
//! | `/api/items/{item_id}/photos` | POST | multipart |
//! | `/api/tryon/` | POST | JSON |

mod client;
mod error;

pub use client::{ApiClient, RequestBody, DEFAULT_BASE_URL};
pub use error::{ApiError, ErrorKind, ServerErrorBody, ValidationError};
