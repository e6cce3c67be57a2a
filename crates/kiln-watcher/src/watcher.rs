//! The watch controller.
//!
//! Owns the lifecycle of a folder watch: create, reinitialize on path
//! change, tear down. Change notifications arrive on the platform's
//! notification thread and arm the trigger; the rebuild itself runs on
//! the serialized execution context, never here.

use kiln_core::DebouncedTrigger;
use notify::event::ModifyKind;
use notify::{recommended_watcher, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::WatchError;
use crate::filter::FileFilter;

/// One directory tree to observe.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    /// Directory whose files are watched. Must exist at initialize time.
    pub root: PathBuf,
    /// Which files under the root count as sources.
    pub filter: FileFilter,
    /// Whether subdirectories are watched too.
    pub recursive: bool,
}

impl WatchTarget {
    /// A recursive target; use [`non_recursive`] to watch only the top
    /// level.
    ///
    /// [`non_recursive`]: WatchTarget::non_recursive
    pub fn new(root: impl Into<PathBuf>, filter: FileFilter) -> Self {
        Self {
            root: root.into(),
            filter,
            recursive: true,
        }
    }

    /// Limits the watch to the root directory itself.
    pub fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }
}

/// Binds a live filesystem watch to one directory tree and arms the
/// rebuild trigger on qualifying writes.
///
/// At most one watch is live per controller. `initialize` disposes the
/// previous watch before installing the next, so two watches are never
/// simultaneously active on overlapping paths.
pub struct WatchController {
    trigger: DebouncedTrigger,
    watcher: Option<RecommendedWatcher>,
    target: Option<WatchTarget>,
}

impl WatchController {
    /// Creates a controller with no active watch.
    pub fn new(trigger: DebouncedTrigger) -> Self {
        Self {
            trigger,
            watcher: None,
            target: None,
        }
    }

    /// Installs a watch on `target`, replacing any previous watch.
    ///
    /// On failure the controller holds no watch at all: the partially
    /// constructed handle is released before the error is returned, and a
    /// permission problem is additionally logged as a warning so the
    /// feature degrades to inert instead of crashing the caller.
    pub fn initialize(&mut self, target: WatchTarget) -> Result<(), WatchError> {
        self.destroy();

        if !target.root.is_dir() {
            return Err(WatchError::MissingRoot(target.root.clone()));
        }

        let trigger = self.trigger.clone();
        let filter = target.filter.clone();
        let mut watcher =
            recommended_watcher(move |res: Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    if !is_write(&event.kind) {
                        return;
                    }
                    if let Some(path) = event.paths.iter().find(|p| filter.matches(p)) {
                        debug!("source write: {}", path.display());
                        trigger.notify();
                    }
                }
                Err(e) => warn!("watch backend error: {}", e),
            })
            .map_err(|e| watch_failed(&target.root, e))?;

        let mode = if target.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        // On error, `watcher` is still a local and drops right here; no
        // half-initialized handle outlives the failure.
        watcher
            .watch(&target.root, mode)
            .map_err(|e| watch_failed(&target.root, e))?;

        info!(
            "watching {} ({})",
            target.root.display(),
            if target.recursive {
                "with subdirectories"
            } else {
                "top level only"
            }
        );

        self.trigger.resume();
        self.watcher = Some(watcher);
        self.target = Some(target);
        Ok(())
    }

    /// Releases the watch if one is live. Safe to call repeatedly.
    ///
    /// Also suspends the trigger, so a rebuild callback already queued on
    /// the execution context fires as a no-op instead of rebuilding
    /// against a torn-down watch.
    pub fn destroy(&mut self) {
        self.trigger.suspend();
        if self.watcher.take().is_some() {
            if let Some(target) = &self.target {
                debug!("released watch on {}", target.root.display());
            }
        }
        self.target = None;
    }

    /// Whether a watch is currently live.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// The currently watched target, if any.
    pub fn target(&self) -> Option<&WatchTarget> {
        self.target.as_ref()
    }
}

impl Drop for WatchController {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Write/modify events only. Renames ride under `Modify` in notify's
/// taxonomy and are excluded, as are create and delete, so scratch-file
/// churn from editors does not trigger rebuilds.
fn is_write(kind: &EventKind) -> bool {
    match kind {
        EventKind::Modify(ModifyKind::Name(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Classifies a notify failure and logs the permission case, which is the
/// one the user can act on immediately.
fn watch_failed(root: &Path, source: notify::Error) -> WatchError {
    let err = WatchError::from_notify(root, source);
    if err.is_permission_denied() {
        warn!("{}", err);
    }
    err
}
