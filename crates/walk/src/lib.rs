#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` enumerates the regular files beneath a local source root in a
//! deterministic order. It is the local half of candidate enumeration for
//! uploads: each yielded [`WalkEntry`] carries the absolute path, the path
//! relative to the root (which later becomes the object key suffix) and the
//! file size.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures traversal options: filters, recursion,
//!   directory symlink following and the maximum depth.
//! - [`Walker`] implements [`Iterator`] and yields [`WalkEntry`] values in
//!   depth-first order. Directory contents are sorted before they are
//!   visited so the sequence does not depend on the filesystem's own order.
//! - Directories excluded by the [`filters::FilterSet`] are pruned without
//!   being read.
//! - [`WalkError`] describes I/O failures encountered while querying metadata
//!   or reading directories.
//!
//! # Invariants
//!
//! - Only regular files (or symlinks resolving to regular files) are yielded.
//!   Directories are traversed, never returned.
//! - Relative paths never contain `..` segments and never escape the root.
//! - A directory is entered at most once. Canonical paths are tracked so a
//!   symlink pointing back to an ancestor cannot cause a cycle.
//! - The walk is lazy and single-pass; after an error it yields nothing more.
//!
//! # Errors
//!
//! [`WalkBuilder::build`] fails when the root is missing or is a special
//! file. Iteration yields [`WalkError`] when a directory cannot be read or an
//! entry's metadata cannot be queried.
//!
//! # Examples
//!
//! ```
//! use filters::{FilterRule, FilterSet};
//! use walk::WalkBuilder;
//! use std::fs;
//! use std::path::PathBuf;
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let temp = tempfile::tempdir()?;
//! let root = temp.path();
//! fs::create_dir_all(root.join("sub"))?;
//! fs::write(root.join("a.txt"), b"a")?;
//! fs::write(root.join("b.log"), b"b")?;
//! fs::write(root.join("sub/c.txt"), b"c")?;
//!
//! let filters = FilterSet::from_rules([FilterRule::include("*.txt")])?;
//! let walker = WalkBuilder::new(root).filters(filters).build()?;
//! let mut seen = Vec::new();
//! for entry in walker {
//!     seen.push(entry?.relative_path().to_path_buf());
//! }
//!
//! assert_eq!(seen, [PathBuf::from("a.txt"), PathBuf::from("sub/c.txt")]);
//! # Ok(())
//! # }
//! # demo().unwrap();
//! ```
//!
//! # See also
//!
//! - `engine::enumerate`, which turns walk entries into transfer candidates.

mod builder;
mod entry;
mod error;
mod walker;

pub use builder::{DEFAULT_MAX_DEPTH, WalkBuilder};
pub use entry::WalkEntry;
pub use error::{WalkError, WalkErrorKind};
pub use walker::Walker;
