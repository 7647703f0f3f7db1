use thiserror::Error;

/// Contract violations surfaced synchronously to the caller. Transport
/// failures are not represented here: they travel through the status-event
/// channel as [`Status::Failed`](crate::Status::Failed) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A request URL (given directly or assembled by a handler) was empty.
    #[error("request URL must not be empty")]
    EmptyUrl,

    /// A query configuration crossing the serialization boundary was not
    /// an object.
    #[error("query configuration must be an object, found {found}")]
    InvalidQueryConfig {
        /// JSON type name of the rejected value.
        found: &'static str,
    },

    /// The `queryString` member of a boundary-crossing query configuration
    /// had the wrong type.
    #[error("`queryString` must be an object with string values, found {found}")]
    InvalidQueryString {
        /// JSON type name of the rejected value.
        found: &'static str,
    },
}
