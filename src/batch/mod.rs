//! Batch module
//!
//! Encodes several named sub-calls into one `batch` request and, optionally,
//! splits the batch response back into per-call results.
//!
//! ```rust,ignore
//! let spec = BatchSpec::new()
//!     .call_with_params("deals", "crm.deal.list", ["select[]=TITLE", "order[ID]=DSC"])
//!     .call("fields", "crm.deal.fields");
//! let payload = client.call_batch(spec).await?;
//! let results = BatchResponse::from_payload(&payload)?;
//! ```

mod types;

pub use types::{BatchResponse, BatchSpec, MAX_BATCH_COMMANDS};
