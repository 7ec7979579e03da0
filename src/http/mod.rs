//! HTTP transport module
//!
//! The engine never talks to `reqwest` directly. It goes through two small
//! capabilities so that the same retry policy runs under any executor and can
//! be driven by scripted fakes in tests.
//!
//! # Features
//!
//! - **Transport**: POST a JSON body or GET with a query, get status and body back
//! - **Sleeper**: suspend the current unit of work for a duration
//! - **Throttle**: optional token-bucket pacing using governor

mod rate_limit;
mod sleep;
mod transport;

pub use rate_limit::Throttle;
pub use sleep::{Sleeper, TokioSleeper};
pub use transport::{ReqwestTransport, Transport, TransportError, TransportResponse};
