use super::actions::Action;
use super::schema::{FilesState, Snapshot};
use std::sync::Arc;

/// Computes the next state. Transitions that change nothing return `state` itself.
pub fn reduce(state: &Snapshot, action: &Action) -> Snapshot {
    match action {
        Action::HydrateApply { items } => Arc::new(FilesState::new(items.clone())),
        Action::AddFile { item } => {
            let mut items = Vec::with_capacity(state.items.len() + 1);
            items.extend(state.items.iter().cloned());
            items.push(item.clone());
            Arc::new(FilesState::new(items))
        }
        Action::DeleteFile { file_name } => {
            if !state.items.iter().any(|f| &f.file_name == file_name) {
                return Arc::clone(state);
            }
            let items = state
                .items
                .iter()
                .filter(|f| &f.file_name != file_name)
                .cloned()
                .collect();
            Arc::new(FilesState::new(items))
        }
        Action::HydrateRequest { .. } | Action::PersistSuccess { .. } => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::schema::StoredFile;
    use proptest::prelude::*;

    fn file(name: &str) -> StoredFile {
        StoredFile {
            file_name: name.to_string(),
            title: format!("title-{name}"),
            description: "desc".to_string(),
            valid: true,
            content: "{}".to_string(),
        }
    }

    fn empty() -> Snapshot {
        Arc::new(FilesState::default())
    }

    #[test]
    fn add_appends_in_order() {
        let s = reduce(&empty(), &Action::AddFile { item: file("a.json") });
        let s = reduce(&s, &Action::AddFile { item: file("b.json") });
        let names: Vec<_> = s.items.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["a.json", "b.json"]);
    }

    #[test]
    fn add_does_not_dedupe() {
        let s = reduce(&empty(), &Action::AddFile { item: file("a.json") });
        let s = reduce(&s, &Action::AddFile { item: file("a.json") });
        assert_eq!(s.items.len(), 2);
    }

    #[test]
    fn delete_removes_every_match_and_keeps_order() {
        let start = Arc::new(FilesState::new(vec![
            file("a.json"),
            file("b.json"),
            file("a.json"),
            file("c.json"),
        ]));
        let s = reduce(
            &start,
            &Action::DeleteFile {
                file_name: "a.json".into(),
            },
        );
        let names: Vec<_> = s.items.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, ["b.json", "c.json"]);
    }

    #[test]
    fn delete_missing_is_noop() {
        let start = Arc::new(FilesState::new(vec![file("a.json")]));
        let s = reduce(
            &start,
            &Action::DeleteFile {
                file_name: "x.json".into(),
            },
        );
        assert!(Arc::ptr_eq(&start, &s));
    }

    #[test]
    fn hydrate_replaces_and_is_idempotent() {
        let start = Arc::new(FilesState::new(vec![file("old.json")]));
        let items = vec![file("a.json"), file("b.json")];
        let action = Action::HydrateApply {
            items: items.clone(),
        };
        let once = reduce(&start, &action);
        let twice = reduce(&once, &action);
        assert_eq!(once.items, items);
        assert_eq!(once, twice);
    }

    #[test]
    fn bookkeeping_actions_leave_state_alone() {
        let start = Arc::new(FilesState::new(vec![file("a.json")]));
        let s = reduce(&start, &Action::PersistSuccess { count: 1 });
        assert!(Arc::ptr_eq(&start, &s));
        let s = reduce(
            &start,
            &Action::HydrateRequest {
                items: vec![file("z.json")],
            },
        );
        assert!(Arc::ptr_eq(&start, &s));
    }

    #[test]
    fn count_tracks_adds_minus_deletes() {
        let mut s = empty();
        for name in ["a.json", "b.json", "c.json", "d.json"] {
            s = reduce(&s, &Action::AddFile { item: file(name) });
        }
        for name in ["b.json", "missing.json", "d.json"] {
            s = reduce(
                &s,
                &Action::DeleteFile {
                    file_name: name.into(),
                },
            );
        }
        assert_eq!(s.items.len(), 4 - 2);
    }

    proptest! {
        #[test]
        fn count_matches_successful_adds_minus_deletes(
            ops in prop::collection::vec((any::<bool>(), 0usize..6), 0..40)
        ) {
            let mut s = empty();
            let mut live = std::collections::BTreeSet::new();
            for (is_add, n) in ops {
                let name = format!("f{n}.json");
                if is_add {
                    if live.contains(&name) {
                        continue;
                    }
                    s = reduce(&s, &Action::AddFile { item: file(&name) });
                    live.insert(name);
                } else {
                    let before = s.clone();
                    s = reduce(&s, &Action::DeleteFile { file_name: name.clone() });
                    if !live.remove(&name) {
                        prop_assert!(Arc::ptr_eq(&before, &s));
                    }
                }
            }
            prop_assert_eq!(s.items.len(), live.len());
            let names: std::collections::BTreeSet<_> =
                s.items.iter().map(|f| f.file_name.clone()).collect();
            prop_assert_eq!(names, live);
        }
    }
}
