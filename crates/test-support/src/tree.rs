use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Declarative set of files to create under a directory.
#[derive(Clone, Debug, Default)]
pub struct FileTree {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl FileTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with text content. Parent directories are implied.
    pub fn text_file(&mut self, relative: impl AsRef<Path>, content: &str) -> &mut Self {
        self.file(relative, content.as_bytes())
    }

    /// Adds a file with binary content.
    pub fn file(&mut self, relative: impl AsRef<Path>, content: &[u8]) -> &mut Self {
        self.files
            .push((relative.as_ref().to_path_buf(), content.to_vec()));
        self
    }

    /// Writes every file beneath `root`.
    pub fn create_in(&self, root: &Path) -> io::Result<()> {
        for (relative, content) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }
        Ok(())
    }
}

/// Shell script emulating the subset of `aws` used by s3bulk.
///
/// Buckets live under `$FAKE_S3_ROOT/<bucket>/`. Setting `FAKE_S3_DENY` to a
/// substring makes copies whose arguments contain it fail with AccessDenied.
#[cfg(unix)]
pub const FAKE_AWS_SCRIPT: &str = r#"#!/bin/sh
root="${FAKE_S3_ROOT:?FAKE_S3_ROOT not set}"
if [ "$1" = "--version" ]; then
    echo "aws-cli/2.15.0 Python/3.11.6 Linux/6.1 exe/x86_64"
    exit 0
fi
if [ "$1" != "s3" ]; then
    echo "usage: aws s3 <command>" >&2
    exit 252
fi
command="$2"
shift 2
case "$command" in
cp)
    src="$1"
    dst="$2"
    if [ -n "$FAKE_S3_DENY" ]; then
        case "$src $dst" in
        *"$FAKE_S3_DENY"*)
            echo "upload failed: $src to $dst An error occurred (AccessDenied) when calling the PutObject operation: Access Denied" >&2
            exit 1
            ;;
        esac
    fi
    case "$src" in s3://*) src="$root/${src#s3://}" ;; esac
    case "$dst" in s3://*) dst="$root/${dst#s3://}" ;; esac
    if [ ! -f "$src" ]; then
        echo "fatal error: An error occurred (404) when calling the HeadObject operation: Key \"$1\" does not exist" >&2
        exit 1
    fi
    mkdir -p "$(dirname "$dst")" && cp "$src" "$dst" || exit 1
    echo "copy: $1 to $2"
    ;;
ls)
    path="${1#s3://}"
    bucket="${path%%/*}"
    prefix="${path#"$bucket"}"
    prefix="${prefix#/}"
    [ -d "$root/$bucket" ] || exit 1
    found=0
    for key in $(cd "$root/$bucket" && find . -type f | sed 's|^\./||' | sort); do
        case "$key" in "$prefix"*) ;; *) continue ;; esac
        size=$(wc -c < "$root/$bucket/$key" | tr -d ' ')
        printf '2024-01-01 00:00:00 %10s %s\n' "$size" "$key"
        found=1
    done
    [ "$found" = 1 ] || exit 1
    ;;
*)
    echo "unknown command $command" >&2
    exit 252
    ;;
esac
"#;

/// Writes [`FAKE_AWS_SCRIPT`] as an executable `aws` inside `dir`.
#[cfg(unix)]
pub fn fake_aws(dir: &Path) -> io::Result<PathBuf> {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("aws");
    let mut file = fs::File::create(&path)?;
    file.write_all(FAKE_AWS_SCRIPT.as_bytes())?;
    file.sync_all()?;
    drop(file);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
