use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

const SCHEME: &str = "s3://";

/// Location of an object in a bucket namespace.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ObjectUri {
    bucket: String,
    key: String,
}

impl ObjectUri {
    /// Creates a URI from a bucket name and key.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, ObjectUriError> {
        let bucket = bucket.into();
        if bucket.is_empty() || bucket.contains('/') {
            return Err(ObjectUriError::InvalidBucket { bucket });
        }
        Ok(Self {
            bucket,
            key: key.into(),
        })
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the object key (may be empty for a bucket root).
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the URI used to list everything under `prefix`.
    ///
    /// Non-empty prefixes are normalised to end in exactly one `/` so that a
    /// prefix of `logs` does not also match `logs-archive/`.
    #[must_use]
    pub fn listing(bucket: &str, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{SCHEME}{bucket}/")
        } else {
            format!("{SCHEME}{bucket}/{prefix}/")
        }
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{}/{}", self.bucket, self.key)
    }
}

impl FromStr for ObjectUri {
    type Err = ObjectUriError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rest = input
            .strip_prefix(SCHEME)
            .ok_or_else(|| ObjectUriError::MissingScheme {
                input: input.to_owned(),
            })?;
        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        Self::new(bucket, key)
    }
}

/// Error returned when an object location cannot be parsed.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ObjectUriError {
    /// The string did not start with `s3://`.
    #[error("'{input}' is not an s3:// URI")]
    MissingScheme {
        /// Rejected input.
        input: String,
    },
    /// The bucket name was empty or contained a `/`.
    #[error("invalid bucket name '{bucket}'")]
    InvalidBucket {
        /// Rejected bucket name.
        bucket: String,
    },
}

/// One side of a transfer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Endpoint {
    /// A path on the local filesystem.
    Local(PathBuf),
    /// An object in a bucket.
    Remote(ObjectUri),
}

impl Endpoint {
    /// Returns the local path, if this endpoint is local.
    #[must_use]
    pub fn as_local(&self) -> Option<&std::path::Path> {
        match self {
            Self::Local(path) => Some(path),
            Self::Remote(_) => None,
        }
    }

    /// Returns the object URI, if this endpoint is remote.
    #[must_use]
    pub const fn as_remote(&self) -> Option<&ObjectUri> {
        match self {
            Self::Local(_) => None,
            Self::Remote(uri) => Some(uri),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(uri) => uri.fmt(f),
        }
    }
}

/// Joins a key prefix and a `/`-separated relative key.
///
/// Leading and trailing slashes on the prefix are dropped; an empty prefix
/// yields the relative key unchanged.
///
/// ```
/// use transport::join_key;
///
/// assert_eq!(join_key("backups/", "a/b.txt"), "backups/a/b.txt");
/// assert_eq!(join_key("", "a/b.txt"), "a/b.txt");
/// ```
#[must_use]
pub fn join_key(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        relative.to_owned()
    } else {
        format!("{prefix}/{relative}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn parses_bucket_and_key() {
        let uri: ObjectUri = "s3://bucket/dir/file name.txt".parse().expect("parse");
        assert_eq!(uri.bucket(), "bucket");
        assert_eq!(uri.key(), "dir/file name.txt");
    }

    #[test]
    fn parses_bucket_without_key() {
        let uri: ObjectUri = "s3://bucket".parse().expect("parse");
        assert_eq!(uri.key(), "");
        assert_eq!(uri.to_string(), "s3://bucket/");
    }

    #[test]
    fn rejects_missing_scheme_and_empty_bucket() {
        assert!(matches!(
            "bucket/key".parse::<ObjectUri>(),
            Err(ObjectUriError::MissingScheme { .. })
        ));
        assert!(matches!(
            "s3:///key".parse::<ObjectUri>(),
            Err(ObjectUriError::InvalidBucket { .. })
        ));
    }

    #[test]
    fn listing_uri_normalises_prefix() {
        assert_eq!(ObjectUri::listing("b", ""), "s3://b/");
        assert_eq!(ObjectUri::listing("b", "logs"), "s3://b/logs/");
        assert_eq!(ObjectUri::listing("b", "/logs//"), "s3://b/logs/");
    }

    #[test]
    fn endpoint_accessors_and_display() {
        let local = Endpoint::Local(PathBuf::from("/tmp/a.txt"));
        assert_eq!(local.as_local(), Some(Path::new("/tmp/a.txt")));
        assert!(local.as_remote().is_none());
        assert_eq!(local.to_string(), "/tmp/a.txt");

        let remote = Endpoint::Remote(ObjectUri::new("b", "k").expect("uri"));
        assert_eq!(remote.to_string(), "s3://b/k");
        assert!(remote.as_local().is_none());
    }

    #[test]
    fn join_key_handles_slashes() {
        assert_eq!(join_key("/data/", "x.bin"), "data/x.bin");
        assert_eq!(join_key("///", "x.bin"), "x.bin");
        assert_eq!(join_key("a/b", "c/d"), "a/b/c/d");
    }
}
