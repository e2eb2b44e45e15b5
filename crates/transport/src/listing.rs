use crate::ListError;

/// One object reported by a remote listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListedObject {
    /// Full object key, including any listing prefix.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
}

impl ListedObject {
    /// Creates a listed object.
    #[must_use]
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// Enumerates the objects stored under a prefix.
pub trait ObjectLister: Send + Sync {
    /// Lists every object whose key starts with `prefix` in `bucket`.
    ///
    /// Returned keys are full keys; callers strip the prefix themselves.
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ListedObject>, ListError>;
}

/// Parses one line of `aws s3 ls --recursive` output.
///
/// Lines look like `2023-12-01 10:30:45     123456 path/to/file.txt`. The
/// first three whitespace separated fields are the date, time and size;
/// everything after them is the key, with interior and trailing spaces kept
/// intact. Lines that do not fit this shape (blank lines, `PRE` markers)
/// yield `None`.
///
/// ```
/// use transport::parse_listing_line;
///
/// let object = parse_listing_line("2023-12-01 10:30:45     123456 reports/q4 final.pdf").unwrap();
/// assert_eq!(object.key, "reports/q4 final.pdf");
/// assert_eq!(object.size, 123456);
/// assert!(parse_listing_line("                           PRE photos/").is_none());
/// ```
#[must_use]
pub fn parse_listing_line(line: &str) -> Option<ListedObject> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut rest = line.trim_start();
    let mut fields = [""; 3];
    for field in &mut fields {
        let end = rest.find(char::is_whitespace)?;
        *field = &rest[..end];
        rest = rest[end..].trim_start();
    }

    let [date, _time, size] = fields;
    if !date.contains('-') || rest.is_empty() {
        return None;
    }
    let size = size.parse().ok()?;
    Some(ListedObject::new(rest, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_simple_line() {
        let object = parse_listing_line("2023-12-01 10:30:45     123456 path/to/file.txt")
            .expect("object line");
        assert_eq!(object, ListedObject::new("path/to/file.txt", 123456));
    }

    #[test]
    fn keeps_spaces_inside_keys() {
        let object =
            parse_listing_line("2024-01-02 03:04:05          7 a  b/c d ").expect("object line");
        assert_eq!(object.key, "a  b/c d ");
    }

    #[test]
    fn strips_carriage_returns() {
        let object = parse_listing_line("2024-01-02 03:04:05 7 k.txt\r\n").expect("object line");
        assert_eq!(object.key, "k.txt");
    }

    #[test]
    fn rejects_non_object_lines() {
        assert!(parse_listing_line("").is_none());
        assert!(parse_listing_line("   ").is_none());
        assert!(parse_listing_line("                           PRE logs/").is_none());
        assert!(parse_listing_line("2024-01-02 03:04:05 seven k.txt").is_none());
        assert!(parse_listing_line("2024-01-02 03:04:05 7").is_none());
        assert!(parse_listing_line("2024-01-02 03:04:05 7 ").is_none());
    }

    proptest! {
        #[test]
        fn key_survives_formatting(
            key in "[A-Za-z0-9_./-][A-Za-z0-9 _./-]{0,40}",
            size in any::<u64>(),
            padding in 1usize..12,
        ) {
            let line = format!("2023-12-01 10:30:45{:>width$} {key}", size, width = padding + 20);
            let object = parse_listing_line(&line).expect("object line");
            prop_assert_eq!(object.key, key);
            prop_assert_eq!(object.size, size);
        }
    }
}
