//! Property tests for deterministic task planning.

use std::path::PathBuf;

use engine::{Candidate, TaskBuilder};
use proptest::prelude::*;
use transport::Endpoint;

fn candidates(keys: &[String]) -> Vec<Candidate> {
    keys.iter()
        .map(|key| Candidate::new(Endpoint::Local(PathBuf::from("/root").join(key)), key.clone(), Some(1)))
        .collect()
}

fn key() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9]{1,6}", 1..4).prop_map(|segments| segments.join("/"))
}

proptest! {
    #[test]
    fn plan_ignores_enumeration_order(keys in prop::collection::vec(key(), 0..40), seed in any::<u64>()) {
        let builder = TaskBuilder::upload("bucket", "p").expect("builder");
        let forward = builder.build(candidates(&keys));

        let mut shuffled = keys.clone();
        let len = shuffled.len();
        if len > 1 {
            for index in 0..len {
                let other = (seed as usize).wrapping_add(index.wrapping_mul(31)) % len;
                shuffled.swap(index, other);
            }
        }
        let reordered = builder.build(candidates(&shuffled));
        prop_assert_eq!(forward, reordered);
    }

    #[test]
    fn plan_is_idempotent_and_unique(keys in prop::collection::vec(key(), 0..40)) {
        let builder = TaskBuilder::download("/out");
        let first = builder.build(candidates(&keys));
        let second = builder.build(candidates(&keys));
        prop_assert_eq!(&first, &second);

        let mut relatives: Vec<&str> = first.tasks.iter().map(|task| task.relative()).collect();
        let before = relatives.len();
        relatives.dedup();
        prop_assert_eq!(before, relatives.len());
        for (index, task) in first.tasks.iter().enumerate() {
            prop_assert_eq!(task.id().get(), index as u64);
        }
        prop_assert_eq!(first.tasks.len() + first.duplicates.len() + first.rejected.len(), keys.len());
    }
}
