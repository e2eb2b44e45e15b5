//! Property tests for include/exclude evaluation.

use filters::{FilterRule, FilterSet};
use proptest::prelude::*;
use std::path::PathBuf;

fn component() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

fn relative_path() -> impl Strategy<Value = PathBuf> {
    (prop::collection::vec(component(), 0..4), component(), "(txt|log|bin)").prop_map(
        |(dirs, stem, ext)| {
            let mut path: PathBuf = dirs.into_iter().collect();
            path.push(format!("{stem}.{ext}"));
            path
        },
    )
}

proptest! {
    #[test]
    fn extension_include_matches_at_any_depth(path in relative_path()) {
        let set = FilterSet::from_rules([FilterRule::include("*.txt")]).unwrap();
        let is_txt = path.extension().is_some_and(|ext| ext == "txt");
        prop_assert_eq!(set.allows(&path), is_txt);
    }

    #[test]
    fn excluded_paths_stay_excluded_when_includes_are_added(
        path in relative_path(),
        extra in component(),
    ) {
        let base = FilterSet::from_rules([FilterRule::exclude("*.log")]).unwrap();
        let widened = FilterSet::from_rules([
            FilterRule::exclude("*.log"),
            FilterRule::include("*"),
            FilterRule::include(format!("{extra}*")),
        ])
        .unwrap();

        if !base.allows(&path) {
            prop_assert!(!widened.allows(&path));
        }
    }

    #[test]
    fn pruned_directory_excludes_all_descendants(
        dir in component(),
        rest in relative_path(),
    ) {
        let set = FilterSet::from_rules([FilterRule::exclude(format!("{dir}/"))]).unwrap();
        prop_assert!(set.excludes_directory(std::path::Path::new(&dir)));
        let child = PathBuf::from(&dir).join(&rest);
        prop_assert!(!set.allows(&child));
    }
}
