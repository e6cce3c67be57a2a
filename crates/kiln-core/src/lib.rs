//! Kiln Core - serialized scheduling and rebuild triggering
//!
//! This crate provides the machinery that turns a noisy stream of change
//! notifications into orderly rebuilds:
//!
//! - A serialized execution context: one thread, one FIFO task queue,
//!   reachable from any thread through a cloneable handle.
//! - A debounced trigger that collapses each burst of notifications into
//!   a single rebuild invocation on that context.
//! - The `RebuildRunner` trait the rebuild operation is injected through.
//!
//! Nothing here touches the filesystem; the watch side lives in
//! `kiln-watcher`.
//!
//! # Example
//!
//! ```
//! use kiln_core::{DebouncedTrigger, MainContext, RebuildError, RebuildRunner};
//! use std::sync::Arc;
//!
//! struct Noop;
//!
//! impl RebuildRunner for Noop {
//!     fn rebuild(&self) -> Result<(), RebuildError> {
//!         Ok(())
//!     }
//! }
//!
//! let ctx = MainContext::spawn();
//! let trigger = DebouncedTrigger::new(ctx, Arc::new(Noop));
//! trigger.notify(); // one rebuild, soon, on the context thread
//! ```

pub mod context;
pub mod error;
pub mod trigger;

pub use context::{MainContext, MainContextHandle};
pub use error::RebuildError;
pub use trigger::{DebouncedTrigger, RebuildRunner};
