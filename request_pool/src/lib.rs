mod cancellation;
mod errors;
mod handler;
mod pool;
mod query;
mod request;
mod status;
mod transport;

pub use cancellation::{CancellationSource, CancellationToken};
pub use errors::PoolError;
pub use handler::Handler;
pub use pool::RequestPool;
pub use query::{QueryConfig, QueryParams};
pub use request::Request;
pub use status::{ResponseSummary, Status, StatusEvent};
pub use transport::{Transport, TransportError, TransportResponse};
