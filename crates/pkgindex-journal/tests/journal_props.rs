//! Property tests over scripted commit/rollback sequences.

#![allow(clippy::unwrap_used, missing_docs)]

use pkgindex_core::PkgIndexConfig;
use pkgindex_journal::{Journal, JournalId, NewJournalEntry};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Step {
    Commit { project: u8, inserts: u8 },
    Rollback { project: u8, inserts: u8 },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0u8..4, 1u8..4).prop_map(|(project, inserts)| Step::Commit { project, inserts }),
        1 => (0u8..4, 1u8..4).prop_map(|(project, inserts)| Step::Rollback { project, inserts }),
    ]
}

proptest! {
    #[test]
    fn committed_ids_increase_and_per_project_serials_track_commits(
        steps in proptest::collection::vec(arb_step(), 1..40)
    ) {
        let journal = Journal::new(&PkgIndexConfig::default());
        let mut expected_last: HashMap<String, JournalId> = HashMap::new();
        let mut expected_rows = 0;

        for step in steps {
            let (project, inserts, commit) = match step {
                Step::Commit { project, inserts } => (project, inserts, true),
                Step::Rollback { project, inserts } => (project, inserts, false),
            };
            let name = format!("project-{project}");
            let mut txn = journal.begin();
            let mut last = None;
            for _ in 0..inserts {
                last = Some(txn.insert(NewJournalEntry::new(name.clone())).unwrap());
            }
            if commit {
                txn.commit().unwrap();
                expected_rows += usize::from(inserts);
                if let Some(id) = last {
                    expected_last.insert(name, id);
                }
            } else {
                txn.rollback();
            }
        }

        let order = journal.table().commit_order();
        prop_assert_eq!(order.len(), expected_rows);
        prop_assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        for (name, id) in &expected_last {
            prop_assert_eq!(journal.last_serial_for(name), Some(*id));
        }
        prop_assert_eq!(journal.last_serial(), order.last().copied());
    }
}
