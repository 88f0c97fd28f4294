//! Progress reporting for bucket refreshes.

/// Progress information emitted after each listed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    /// Paths listed so far
    pub listed: usize,
    /// Files discovered so far
    pub files: usize,
    /// Path that was just listed
    pub path: String,
    /// Depth of that path below the walk root
    pub depth: usize,
}

impl SyncProgress {
    /// Create a new progress report.
    pub fn new(listed: usize, files: usize, path: impl Into<String>, depth: usize) -> Self {
        Self {
            listed,
            files,
            path: path.into(),
            depth,
        }
    }
}

/// Type alias for progress callback function.
///
/// The callback only observes the walk; it cannot stop it.
pub type ProgressCallback = Box<dyn FnMut(&SyncProgress) + Send>;

/// Create a simple progress callback that prints to stdout.
///
/// # Example
/// ```no_run
/// use bucketlib::progress::make_progress_printer;
///
/// let callback = make_progress_printer();
/// ```
pub fn make_progress_printer() -> ProgressCallback {
    Box::new(|progress: &SyncProgress| {
        let indent = "  ".repeat(progress.depth);
        let shown = if progress.path.is_empty() {
            "/"
        } else {
            progress.path.as_str()
        };
        println!(
            "{}[{} paths, {} files] {}",
            indent, progress.listed, progress.files, shown
        );
    })
}
