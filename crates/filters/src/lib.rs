#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `filters` decides which candidate paths take part in a bulk transfer. A
//! [`FilterSet`] is compiled from user supplied include and exclude globs and
//! answers two questions: whether a file (identified by its path relative to
//! the transfer root) should be transferred, and whether a directory can be
//! pruned from a traversal without visiting its contents.
//!
//! # Design
//!
//! - [`FilterRule`] captures the user-supplied action (`Include`/`Exclude`)
//!   and pattern text. Rules are cheap values; compilation happens when a
//!   [`FilterSet`] is built.
//! - [`FilterSet`] owns the compiled matchers for every rule and shares them
//!   behind an [`std::sync::Arc`] so a single set can be consulted from many
//!   worker threads.
//! - [`FilterDecision`] explains the verdict for a path, which callers use for
//!   debug logging.
//!
//! # Invariants
//!
//! - A path is included when it matches at least one include rule (or no
//!   include rules exist) **and** matches no exclude rule.
//! - Matching is case-sensitive and uses `/` separated relative paths. `*`
//!   never crosses a separator while `**` does.
//! - Patterns without a `/` match the final component at any depth. Patterns
//!   containing a `/` are anchored to the transfer root; a leading `/` is
//!   accepted and ignored.
//! - A trailing `/` marks a directory rule which applies to everything beneath
//!   directories of that name. Files under an excluded directory are excluded
//!   even when the directory itself is never visited.
//!
//! # Errors
//!
//! [`FilterSet::from_rules`] reports [`FilterError`] when a rule expands to an
//! invalid glob expression. The error includes the offending pattern and the
//! underlying [`globset::Error`].
//!
//! # Examples
//!
//! ```
//! use filters::{FilterRule, FilterSet};
//! use std::path::Path;
//!
//! let filters = FilterSet::from_rules([
//!     FilterRule::include("*.txt"),
//!     FilterRule::exclude("scratch/"),
//! ])
//! .expect("filters compile");
//!
//! assert!(filters.allows(Path::new("a.txt")));
//! assert!(filters.allows(Path::new("sub/c.txt")));
//! assert!(!filters.allows(Path::new("b.log")));
//! assert!(!filters.allows(Path::new("scratch/notes.txt")));
//! ```
//!
//! # See also
//!
//! - `walk` consults [`FilterSet::excludes_directory`] to prune traversals.
//! - [`globset`] for the glob matching primitives used internally.

mod action;
mod compiled;
mod decision;
mod error;
mod rule;
mod set;

pub use action::FilterAction;
pub use decision::FilterDecision;
pub use error::FilterError;
pub use rule::FilterRule;
pub use set::FilterSet;
