//! REST plumbing: transport, response envelope, and the per-category sub-clients.

pub mod category;
pub mod client;
pub mod http;
pub mod meta;
pub mod registry;
pub mod response;
pub mod retry;

pub use category::{Category, Endpoint};
pub use client::*;
pub use http::{HttpTransport, RestRequest};
pub use meta::{render_help, ApiCategory, ApiEndpoint, ApiParameter};
pub use registry::ClientRegistry;
pub use response::{Event, EventType, QueryResponse, RestResponse};
pub use retry::{AutoRefresh, NoRetry, Reauthenticator, RetryContext, RetryHandler};
