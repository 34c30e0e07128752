//! Property-based tests for the contact list tree

use std::sync::Arc;

use callkit_presence::{Contact, ContactGroup, EmptyDirectory, PresenceEngine};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Subscribe { contact: usize, group: usize },
    Volatile { contact: usize },
    CreateGroup { parent: usize, name: usize },
    Move { contact: usize, group: usize },
    Unsubscribe { contact: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize, 0..6usize).prop_map(|(contact, group)| Op::Subscribe { contact, group }),
        (0..8usize).prop_map(|contact| Op::Volatile { contact }),
        (0..6usize, 0..4usize).prop_map(|(parent, name)| Op::CreateGroup { parent, name }),
        (0..8usize, 0..6usize).prop_map(|(contact, group)| Op::Move { contact, group }),
        (0..8usize).prop_map(|contact| Op::Unsubscribe { contact }),
    ]
}

fn all_groups(root: &Arc<ContactGroup>) -> Vec<Arc<ContactGroup>> {
    let mut out = vec![Arc::clone(root)];
    for group in root.subgroups() {
        out.extend(all_groups(&group));
    }
    out
}

fn contact_id(i: usize) -> String {
    format!("contact{}@example.org", i)
}

fn reaches_root(contact: &Arc<Contact>, root: &Arc<ContactGroup>) -> bool {
    let mut current = contact.parent();
    let mut hops = 0;
    while let Some(group) = current {
        if Arc::ptr_eq(&group, root) {
            return true;
        }
        hops += 1;
        if hops > 64 {
            return false;
        }
        current = group.parent();
    }
    false
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every contact sits in exactly one group, its parent link points at
    /// that group, and the parent chain ends at the root without cycles.
    #[test]
    fn prop_contact_tree_stays_a_tree(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let engine = PresenceEngine::new("me@example.org", Arc::new(EmptyDirectory));
        let root = engine.root();

        for op in ops {
            let groups = all_groups(&root);
            match op {
                Op::Subscribe { contact, group } => {
                    let _ = engine.subscribe(&groups[group % groups.len()], &contact_id(contact));
                }
                Op::Volatile { contact } => {
                    engine.create_volatile_contact(&contact_id(contact));
                }
                Op::CreateGroup { parent, name } => {
                    let _ = engine.create_server_stored_contact_group(
                        &groups[parent % groups.len()],
                        &format!("group{}", name),
                    );
                }
                Op::Move { contact, group } => {
                    if let Some(c) = engine.find_contact_by_id(&contact_id(contact)) {
                        engine.move_contact_to_group(&c, &groups[group % groups.len()]).unwrap();
                    }
                }
                Op::Unsubscribe { contact } => {
                    if let Some(c) = engine.find_contact_by_id(&contact_id(contact)) {
                        engine.unsubscribe(&c).unwrap();
                    }
                }
            }
        }

        let groups = all_groups(&root);
        let contacts = root.all_contacts();
        for contact in &contacts {
            let holders = groups
                .iter()
                .filter(|g| g.contacts().iter().any(|c| Arc::ptr_eq(c, contact)))
                .count();
            prop_assert_eq!(holders, 1);
            let parent = contact.parent().expect("contact in tree has a parent");
            prop_assert!(parent.contacts().iter().any(|c| Arc::ptr_eq(c, contact)));
            prop_assert!(reaches_root(contact, &root));
        }

        let mut ids: Vec<_> = contacts.iter().map(|c| c.address().to_string()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);

        for group in groups.iter().skip(1) {
            let parent = group.parent().expect("non-root group has a parent");
            prop_assert!(parent.subgroups().iter().any(|g| Arc::ptr_eq(g, group)));
        }
    }
}
