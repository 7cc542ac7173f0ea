//! Marketplace backend for clients and furniture masters.
//!
//! The crate follows a ports-and-adapters layout: [`domain`] holds types,
//! ports and services; [`inbound`] exposes them over HTTP; [`outbound`]
//! implements the ports against PostgreSQL, memory and the payment processor.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
