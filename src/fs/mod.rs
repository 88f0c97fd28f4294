//! Listing entries, path normalization, and the folder tree.

pub mod index;
pub(crate) mod node;
pub mod path;
pub mod tree;

pub use index::IndexSummary;
pub use node::{FileEntry, ROOT_NAME, TreeNode};
pub use path::{ObjectSummary, normalize_prefix, to_file_entries};
pub use tree::TreeMirror;
