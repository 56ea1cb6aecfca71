//! Property-based tests for side-channel filename derivation.
//!
//! These tests use proptest to generate repository names as GitHub allows
//! them and verify that the derived filenames always map back to their owner.

#[cfg(test)]
mod proptest_tests {
    use crate::content::{content_filename, parse_content_filename, ContentKind, MARKER};
    use proptest::prelude::*;

    fn owner() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9-]{0,38}"
    }

    fn repo() -> impl Strategy<Value = String> {
        "[A-Za-z0-9._-]{1,100}"
    }

    fn readme_name() -> impl Strategy<Value = String> {
        "(README|Readme|readme)(\\.(md|rst|txt|markdown))?"
    }

    proptest! {
        /// Property: a README filename maps back to its record and kind
        #[test]
        fn readme_filename_round_trips(owner in owner(), repo in repo(), name in readme_name()) {
            let full_name = format!("{owner}/{repo}");
            let filename = content_filename(&full_name, ContentKind::Readme, &name);
            prop_assert_eq!(
                parse_content_filename(&filename),
                Some((full_name, ContentKind::Readme))
            );
        }

        /// Property: a metadata filename maps back to its record and kind
        #[test]
        fn metadata_filename_round_trips(owner in owner(), repo in repo()) {
            let full_name = format!("{owner}/{repo}");
            let filename = content_filename(&full_name, ContentKind::Metadata, "g0v.json");
            prop_assert_eq!(
                parse_content_filename(&filename),
                Some((full_name, ContentKind::Metadata))
            );
        }

        /// Property: derived filenames never contain a path separator
        #[test]
        fn filenames_stay_in_one_directory(owner in owner(), repo in repo(), name in readme_name()) {
            let full_name = format!("{owner}/{repo}");
            for kind in ContentKind::ALL {
                let filename = content_filename(&full_name, kind, &name);
                prop_assert!(!filename.contains('/'));
                prop_assert_eq!(filename.matches(MARKER).count(), 2);
            }
        }
    }
}
