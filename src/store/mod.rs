//! Variable Store Module
//!
//! In-memory mapping from short names to bounded values.
//!
//! ## Responsibilities
//! - Upsert on SET, lookup on GET
//! - Enforce the name and value bounds at the storage boundary
//! - Safe shared access from concurrent connection workers
//!
//! ## Lifecycle
//! Created empty at server start and dropped with the process. Nothing is
//! persisted.

mod table;

pub use table::VariableStore;
