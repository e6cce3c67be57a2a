//! Suffix filtering for change events.

use std::path::Path;

/// Restricts a watch to files with matching extensions.
///
/// Extensions are stored without the leading dot and compared
/// case-insensitively, so `"rs"`, `".rs"` and `"RS"` all describe the same
/// filter. An empty filter matches every file.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: Vec<String>,
}

impl FileFilter {
    /// Builds a filter from a list of extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// A filter that matches every file.
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether `path` counts as a watched source file.
    pub fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }
}
