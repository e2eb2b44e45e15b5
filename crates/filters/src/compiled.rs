use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::{FilterAction, FilterError, FilterRule};

/// A [`FilterRule`] expanded into glob matchers.
///
/// `paths` answers whether a file path is covered by the rule (including
/// files beneath a matching directory) while `directories` answers whether a
/// directory itself matches, which is what traversal pruning needs.
#[derive(Clone, Debug)]
pub(crate) struct CompiledRule {
    pub(crate) action: FilterAction,
    pub(crate) pattern: String,
    paths: GlobSet,
    directories: GlobSet,
}

impl CompiledRule {
    pub(crate) fn new(rule: FilterRule) -> Result<Self, FilterError> {
        let directory_only = rule.is_directory_only();
        let anchored = rule.is_anchored();

        let mut body = rule.pattern.as_str();
        if directory_only {
            body = &body[..body.len() - 1];
        }
        let body = body.trim_start_matches('/');
        if body.is_empty() {
            return Err(FilterError::Empty {
                pattern: rule.pattern,
            });
        }

        let base = if anchored || body.starts_with("**/") {
            body.to_owned()
        } else {
            format!("**/{body}")
        };

        let mut path_globs = Vec::with_capacity(2);
        if !directory_only {
            path_globs.push(base.clone());
        }
        path_globs.push(format!("{base}/**"));

        let paths = build_set(&rule.pattern, &path_globs)?;
        let directories = build_set(&rule.pattern, std::slice::from_ref(&base))?;

        Ok(Self {
            action: rule.action,
            pattern: rule.pattern,
            paths,
            directories,
        })
    }

    pub(crate) fn matches_path(&self, path: &Path) -> bool {
        self.paths.is_match(path)
    }

    pub(crate) fn matches_directory(&self, path: &Path) -> bool {
        self.directories.is_match(path)
    }
}

fn build_set(pattern: &str, globs: &[String]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();
    for glob in globs {
        let compiled = GlobBuilder::new(glob)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| FilterError::Glob {
                pattern: pattern.to_owned(),
                source,
            })?;
        builder.add(compiled);
    }
    builder.build().map_err(|source| FilterError::Glob {
        pattern: pattern.to_owned(),
        source,
    })
}
