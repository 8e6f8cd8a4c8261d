//! HTTP service layer for the Upsign upload signing endpoint.
//!
//! - **Router**: maps method and path suffix to an endpoint
//! - **Handler**: signing, upload-success, delete, and health endpoints
//! - **Store**: the object-store boundary used for deletes and size checks
//! - **Service**: hyper `Service` implementation with body limits and CORS

pub mod body;
pub mod handler;
pub mod response;
pub mod router;
pub mod service;
pub mod store;

pub use body::UpsignResponseBody;
pub use handler::{UpsignHandler, UpsignHttpConfig};
pub use service::UpsignHttpService;
pub use store::{MemoryObjectStore, ObjectStore, StoreError, StoreFuture};
