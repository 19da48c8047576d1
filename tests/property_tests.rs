//! Property-based tests for the pure parts of the journal: project naming and
//! the visibility filter.
//!
//! No database is involved; store-level properties (dense post ids, cascade
//! deletes) are covered by the store's own tests.
//!
//! Each property is named `prop_<function>_<invariant>`.

use std::collections::HashSet;
use std::convert::Infallible;

use chrono::Utc;
use journal::db::models::{Post, Project};
use journal::naming;
use journal::visibility::{latest_visible, post_visible, project_visible, Viewer};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn project(owner: &str, private: bool) -> Project {
    Project {
        id: "p".into(),
        user_id: owner.into(),
        name: "AmberOwl".into(),
        title: "t".into(),
        body: String::new(),
        private,
        created: Utc::now(),
        edited: None,
    }
}

fn post(post_id: i64, private: bool) -> Post {
    Post {
        id: format!("post-{}", post_id),
        project_id: "p".into(),
        post_id,
        body: String::new(),
        private,
        created: Utc::now(),
        edited: None,
    }
}

// == Naming ===================================================================

proptest! {
    /// Every drawn candidate decomposes into a known prefix and animal.
    #[test]
    fn prop_candidate_is_well_formed(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let name = naming::candidate_with(&mut rng);
        prop_assert!(naming::is_well_formed(&name), "{}", name);
    }

    /// A generated name is never one the caller reported as taken.
    #[test]
    fn prop_generate_unique_name_avoids_taken(seed in any::<u64>(), taken_count in 0usize..200) {
        let mut rng = StdRng::seed_from_u64(seed);
        let taken: HashSet<String> = (0..taken_count)
            .map(|_| naming::candidate_with(&mut rng))
            .collect();

        let found = naming::generate_unique_name_with(&mut rng, 64, |name| {
            Ok::<_, Infallible>(taken.contains(name))
        })
        .unwrap();

        if let Some(name) = found {
            prop_assert!(!taken.contains(&name));
        }
    }

    /// With every name taken, generation gives up instead of looping.
    #[test]
    fn prop_generate_unique_name_is_bounded(seed in any::<u64>(), attempts in 1u32..50) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut calls = 0u32;
        let found = naming::generate_unique_name_with(&mut rng, attempts, |_| {
            calls += 1;
            Ok::<_, Infallible>(true)
        })
        .unwrap();
        prop_assert!(found.is_none());
        prop_assert_eq!(calls, attempts);
    }
}

// == Visibility ===============================================================

proptest! {
    /// The owner sees everything in their own project.
    #[test]
    fn prop_owner_sees_own_entities(project_private: bool, post_private: bool) {
        let p = project("ada", project_private);
        let viewer = Viewer::Owner("ada".into());
        prop_assert!(project_visible(&p, &viewer));
        prop_assert!(post_visible(&p, &post(1, post_private), &viewer));
    }

    /// Anyone else sees a post only when both it and its project are public.
    #[test]
    fn prop_post_visible_requires_public_chain(
        project_private: bool,
        post_private: bool,
        as_stranger: bool,
    ) {
        let p = project("ada", project_private);
        let viewer = if as_stranger {
            Viewer::Owner("grace".into())
        } else {
            Viewer::Public
        };
        prop_assert_eq!(project_visible(&p, &viewer), !project_private);
        prop_assert_eq!(
            post_visible(&p, &post(1, post_private), &viewer),
            !project_private && !post_private
        );
    }

    /// The latest visible post is the highest-numbered public one.
    #[test]
    fn prop_latest_visible_is_max_public_id(flags in prop::collection::vec(any::<bool>(), 0..20)) {
        let p = project("ada", false);
        let posts: Vec<Post> = flags
            .iter()
            .enumerate()
            .map(|(i, private)| post(i as i64 + 1, *private))
            .collect();

        let expected = posts.iter().filter(|x| !x.private).map(|x| x.post_id).max();
        let latest = latest_visible(&p, &posts, &Viewer::Public).map(|x| x.post_id);
        prop_assert_eq!(latest, expected);
    }
}
