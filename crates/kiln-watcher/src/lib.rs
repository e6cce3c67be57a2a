//! Kiln Watcher - filesystem watching for background rebuilds
//!
//! This crate handles the file system side of things:
//! - Binding a live watch to one directory tree
//! - Filtering raw events down to qualifying source writes
//! - Arming the debounced rebuild trigger
//!
//! Only write events count. Create, delete and rename noise from editor
//! scratch files never reaches the trigger.

mod error;
mod filter;
mod watcher;

pub use error::WatchError;
pub use filter::FileFilter;
pub use watcher::{WatchController, WatchTarget};
