//! Service layer for business logic.

pub mod ingest;
pub mod selection;

pub use ingest::{ingest_garment, label_or_unknown};
pub use selection::{prepare_try_on, PreparedTryOn};
