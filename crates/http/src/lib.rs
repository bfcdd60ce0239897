//! Club portal HTTP client
//!
//! An authenticated client for the club portal REST backend plus typed
//! call sites for each resource group.

pub mod client;
pub mod types;

pub use client::error::{ClientError, FieldErrors};
pub use client::payments::PaymentSubmission;
pub use client::request::{ApiRequest, FilePart, MultipartBody, RequestBody};
pub use client::{ApiClient, ApiClientBuilder};
