//! Storage-facing pieces of the ingest pipeline: the executor seam the
//! pipeline drives, the COPY wire format, and the idempotence markers.

mod copy;
mod error;
mod executor;
pub mod marker;

pub use copy::{CopyReader, CopyRows};
pub use error::{Result, StorageError};
pub use executor::{DryRunExecutor, Executor, RecordedLoad, RecordingExecutor, ScriptExecutor};
pub use marker::MarkerKey;
