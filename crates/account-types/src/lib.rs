//! Shared types for the chain account service.
//!
//! Every chain integration speaks in terms of the value objects defined here:
//! chain names, request/response records for each operation, the generic
//! transfer envelope and the typed error returned across the adaptor boundary.

pub mod api;
pub mod chains;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod fees;

pub use api::*;
pub use chains::ChainName;
pub use context::RequestContext;
pub use envelope::TransferIntent;
pub use errors::{AdaptorError, ErrorKind, Result};
pub use fees::FeeTiers;
