use std::sync::Arc;

use navix_prefs::{
    db::MemoryStorage,
    models::{Activity, Place, Settings},
    services::{
        scoring::{self, Vote, MAX_SCORE, MIN_SCORE},
        PreferenceStore,
    },
};
use proptest::prelude::*;

fn vote_strategy() -> impl Strategy<Value = Vote> {
    prop_oneof![Just(Vote::Like), Just(Vote::Dislike)]
}

fn open_store(settings: Settings) -> PreferenceStore {
    tokio_test::block_on(PreferenceStore::open(
        "prop",
        Arc::new(MemoryStorage::new()),
        settings,
    ))
}

proptest! {
    #[test]
    fn score_stays_in_range(votes in prop::collection::vec(vote_strategy(), 0..60)) {
        let mut score = 0;
        for vote in &votes {
            score = scoring::apply_vote(score, *vote);
            prop_assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
        }
    }

    #[test]
    fn store_score_matches_saturating_fold(
        category in "[a-z_]{1,12}",
        votes in prop::collection::vec(vote_strategy(), 0..40),
    ) {
        let store = open_store(Settings::default());
        let expected = votes.iter().fold(0, |acc, vote| scoring::apply_vote(acc, *vote));

        let actual = tokio_test::block_on(async {
            for vote in &votes {
                match vote {
                    Vote::Like => store.like_activity(&category).await.unwrap(),
                    Vote::Dislike => store.dislike_activity(&category).await.unwrap(),
                };
            }
            store.activity_score(&category).await
        });

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn history_keeps_the_most_recent(cap in 1usize..12, likes in 0usize..30) {
        let store = open_store(Settings { max_history_items: cap, ..Default::default() });

        let history = tokio_test::block_on(async {
            for i in 0..likes {
                let place = Place::new(format!("p{}", i), "Somewhere");
                store.like_place(&place, "park").await.unwrap();
            }
            store.history(likes).await
        });

        prop_assert_eq!(history.len(), likes.min(cap));
        for (offset, entry) in history.iter().enumerate() {
            prop_assert_eq!(&entry.place.place_id, &format!("p{}", likes - 1 - offset));
        }
    }

    #[test]
    fn disabled_personalization_keeps_order(names in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let store = open_store(Settings { enable_personalization: false, ..Default::default() });
        let input: Vec<Activity> = names.iter().map(Activity::new).collect();

        let sorted = tokio_test::block_on(async {
            if let Some(first) = names.first() {
                store.like_activity(first).await.unwrap();
            }
            store.sort_activities(input.clone()).await
        });

        prop_assert_eq!(sorted, input);
    }
}
