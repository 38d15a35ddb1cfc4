//! Signrelay Server - the sign endpoint
//!
//! Accepts multipart uploads on `POST /sign`, validates them, invokes the
//! external signing tool against a workspace copy, and streams the signed
//! result back with a content digest header. `GET /healthz` answers
//! readiness probes.

pub mod error;
pub mod handlers;
pub mod signer;

pub use error::SignError;
pub use handlers::{router, ServerState};
