//! Revision fingerprint embedded in the put.io feed title
//!
//! Managed titles look like `<title>|<revision>|managed by <identity>`. The
//! revision segment tells whether the remote feed already reflects the current
//! generation of the Feed, without any extra local bookkeeping.

const SEPARATOR: char = '|';

/// Build the managed remote title for `title` at `revision`
pub fn encode_title(title: &str, revision: i64, identity: &str) -> String {
    format!("{title}{SEPARATOR}{revision}{SEPARATOR}managed by {identity}")
}

/// Extract the revision from a managed title
///
/// Returns `None` unless the title has exactly three segments and the middle
/// one is a base-10 integer.
pub fn decode_revision(remote_title: &str) -> Option<i64> {
    let segments: Vec<&str> = remote_title.split(SEPARATOR).collect();
    match segments.as_slice() {
        [_, revision, _] => revision.parse().ok(),
        _ => None,
    }
}

/// Whether the remote feed already carries `revision`
///
/// Exact equality only: a remote revision ahead of the local counter is as
/// stale as one behind it.
pub fn is_current(remote_title: &str, revision: i64) -> bool {
    decode_revision(remote_title) == Some(revision)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTITY: &str = "Kubernetes/putio-operator";

    #[test]
    fn test_encode_title() {
        assert_eq!(
            encode_title("foo", 1234, IDENTITY),
            "foo|1234|managed by Kubernetes/putio-operator"
        );
    }

    #[test]
    fn test_decode_encoded_title() {
        assert_eq!(decode_revision(&encode_title("foo", 7, IDENTITY)), Some(7));
    }

    #[test]
    fn test_matching_revision_is_current() {
        assert!(is_current("foo|1234|managed by X", 1234));
    }

    #[test]
    fn test_mismatching_revision_is_not_current() {
        assert!(!is_current("foo|1234|managed by X", 4321));
        assert!(!is_current("foo|4321|managed by X", 1234));
    }

    #[test]
    fn test_unmanaged_titles_are_not_current() {
        assert_eq!(decode_revision("foo"), None);
        assert_eq!(decode_revision("foo|12"), None);
        assert_eq!(decode_revision("a|b|1|managed by X"), None);
        assert_eq!(decode_revision("foo|twelve|managed by X"), None);
        assert_eq!(decode_revision("foo| 12|managed by X"), None);
        assert!(!is_current("foo (managed by Kubernetes/putio-operator)", 0));
    }
}
