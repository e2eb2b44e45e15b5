use crate::entry::WalkEntry;
use crate::error::WalkError;
use filters::{FilterDecision, FilterSet};
use logging::targets::FLIST;
use std::collections::HashSet;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Depth-first iterator over the regular files beneath a root.
pub struct Walker {
    filters: FilterSet,
    follow_symlinks: bool,
    max_depth: usize,
    pending_root: Option<WalkEntry>,
    stack: Vec<DirectoryState>,
    visited: HashSet<PathBuf>,
    finished: bool,
}

impl Walker {
    pub(crate) fn new(
        root: PathBuf,
        filters: FilterSet,
        follow_symlinks: bool,
        max_depth: usize,
    ) -> Result<Self, WalkError> {
        let root = absolutize(root)?;
        debug!(target: FLIST, root = %root.display(), "enumerating local files");

        let metadata =
            fs::metadata(&root).map_err(|error| WalkError::root_metadata(root.clone(), error))?;

        let mut walker = Self {
            filters,
            follow_symlinks,
            max_depth,
            pending_root: None,
            stack: Vec::new(),
            visited: HashSet::new(),
            finished: false,
        };

        if metadata.is_dir() {
            walker.push_directory(root, PathBuf::new(), 0)?;
        } else if metadata.is_file() {
            let Some(name) = root.file_name() else {
                return Err(WalkError::unsupported_root(root));
            };
            let relative = PathBuf::from(name);
            walker.pending_root = walker.accept(root.clone(), relative, metadata.len(), 1);
        } else {
            return Err(WalkError::unsupported_root(root));
        }

        Ok(walker)
    }

    fn push_directory(
        &mut self,
        fs_path: PathBuf,
        relative_prefix: PathBuf,
        depth: usize,
    ) -> Result<(), WalkError> {
        let canonical = fs::canonicalize(&fs_path)
            .map_err(|error| WalkError::canonicalize(fs_path.clone(), error))?;
        if !self.visited.insert(canonical) {
            debug!(
                target: FLIST,
                path = %fs_path.display(),
                "skipping already visited directory"
            );
            return Ok(());
        }

        let state = DirectoryState::new(fs_path, relative_prefix, depth)?;
        self.stack.push(state);
        Ok(())
    }

    fn enter(
        &mut self,
        fs_path: PathBuf,
        relative_path: PathBuf,
        depth: usize,
    ) -> Result<(), WalkError> {
        if self.filters.excludes_directory(&relative_path) {
            trace!(target: FLIST, path = %relative_path.display(), "pruned excluded directory");
            return Ok(());
        }
        if depth > self.max_depth {
            if self.max_depth == 0 {
                trace!(target: FLIST, path = %relative_path.display(), "not descending (non-recursive)");
            } else {
                warn!(
                    target: FLIST,
                    path = %relative_path.display(),
                    limit = self.max_depth,
                    "directory exceeds depth limit, skipping"
                );
            }
            return Ok(());
        }
        self.push_directory(fs_path, relative_path, depth)
    }

    fn accept(
        &self,
        full_path: PathBuf,
        relative_path: PathBuf,
        size: u64,
        depth: usize,
    ) -> Option<WalkEntry> {
        match self.filters.decide(&relative_path) {
            FilterDecision::Included => Some(WalkEntry {
                full_path,
                relative_path,
                size,
                depth,
            }),
            decision => {
                trace!(target: FLIST, path = %relative_path.display(), ?decision, "filtered out");
                None
            }
        }
    }

    fn visit(
        &mut self,
        full_path: PathBuf,
        relative_path: PathBuf,
        depth: usize,
    ) -> Result<Option<WalkEntry>, WalkError> {
        let metadata = fs::symlink_metadata(&full_path)
            .map_err(|error| WalkError::metadata(full_path.clone(), error))?;
        let file_type = metadata.file_type();

        if file_type.is_dir() {
            self.enter(full_path, relative_path, depth)?;
            return Ok(None);
        }
        if file_type.is_file() {
            return Ok(self.accept(full_path, relative_path, metadata.len(), depth));
        }
        if !file_type.is_symlink() {
            debug!(target: FLIST, path = %relative_path.display(), "skipping special file");
            return Ok(None);
        }

        match fs::metadata(&full_path) {
            Ok(target) if target.is_file() => {
                Ok(self.accept(full_path, relative_path, target.len(), depth))
            }
            Ok(target) if target.is_dir() => {
                if self.follow_symlinks {
                    let canonical = fs::canonicalize(&full_path)
                        .map_err(|error| WalkError::canonicalize(full_path.clone(), error))?;
                    self.enter(canonical, relative_path, depth)?;
                } else {
                    debug!(
                        target: FLIST,
                        path = %relative_path.display(),
                        "skipping directory symlink"
                    );
                }
                Ok(None)
            }
            Ok(_) => {
                debug!(target: FLIST, path = %relative_path.display(), "skipping special file");
                Ok(None)
            }
            Err(error) => {
                warn!(
                    target: FLIST,
                    path = %relative_path.display(),
                    %error,
                    "skipping dangling symlink"
                );
                Ok(None)
            }
        }
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(entry) = self.pending_root.take() {
            return Some(Ok(entry));
        }

        loop {
            let state = self.stack.last_mut()?;
            let Some(name) = state.next_name() else {
                self.stack.pop();
                continue;
            };
            let full_path = state.fs_path.join(&name);
            let relative_path = state.relative_prefix.join(&name);
            let depth = state.depth + 1;

            match self.visit(full_path, relative_path, depth) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => {}
                Err(error) => {
                    self.finished = true;
                    self.stack.clear();
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Sorted names of one directory, consumed from the back.
#[derive(Debug)]
struct DirectoryState {
    fs_path: PathBuf,
    relative_prefix: PathBuf,
    remaining: Vec<OsString>,
    depth: usize,
}

impl DirectoryState {
    fn new(fs_path: PathBuf, relative_prefix: PathBuf, depth: usize) -> Result<Self, WalkError> {
        let mut remaining = fs::read_dir(&fs_path)
            .and_then(|entries| {
                entries
                    .map(|entry| entry.map(|entry| entry.file_name()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .map_err(|error| WalkError::read_dir(fs_path.clone(), error))?;
        remaining.sort_unstable_by(|a, b| b.cmp(a));

        trace!(
            target: FLIST,
            path = %fs_path.display(),
            entries = remaining.len(),
            "read directory"
        );

        Ok(Self {
            fs_path,
            relative_prefix,
            remaining,
            depth,
        })
    }

    fn next_name(&mut self) -> Option<OsString> {
        self.remaining.pop()
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf, WalkError> {
    if path.is_absolute() {
        Ok(path)
    } else {
        let cwd = env::current_dir()
            .map_err(|error| WalkError::canonicalize(PathBuf::from("."), error))?;
        Ok(cwd.join(path))
    }
}
