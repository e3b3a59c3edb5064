#![forbid(unsafe_code)]

//! Delegated layout for drift: ship the graph to an HTTP layout service, then apply the
//! positions it answers with exactly once.

pub mod abort;
pub mod driver;
pub mod envelope;
pub mod options;
pub mod response;
pub mod transport;

pub use abort::{AbortSignal, AbortSource};
pub use driver::{LAYOUT_NAME, RemoteLayout, RemoteOutcome};
pub use envelope::{RemoteEdge, RemoteGraph, RemoteNode, RemoteRequest};
pub use options::RemoteLayoutOptions;
pub use response::ResponseShape;
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
