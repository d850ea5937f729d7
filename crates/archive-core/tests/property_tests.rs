//! Property-based tests for store invariants and filtering

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use archive_core::{filtered_view, Clock, Criteria, ItemKind, MemoryStorage, ResearchItem};
use chrono::Duration;
use common::{empty_store, fixed_clock, paper};
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = ItemKind> {
    prop_oneof![
        Just(ItemKind::Paper),
        Just(ItemKind::Video),
        Just(ItemKind::Documentary),
        Just(ItemKind::Image),
    ]
}

fn id_set(items: Vec<&ResearchItem>) -> HashSet<String> {
    items.into_iter().map(|i| i.id.clone()).collect()
}

proptest! {
    #[test]
    fn test_created_ids_are_distinct(n in 1usize..60) {
        let mut store = empty_store(Arc::new(MemoryStorage::new()), fixed_clock());
        for i in 0..n {
            store.create(paper(&format!("Item {}", i), "Misc")).unwrap();
        }
        let ids: HashSet<_> = store.items().iter().map(|i| i.id.clone()).collect();
        prop_assert_eq!(ids.len(), n);
    }

    #[test]
    fn test_view_count_equals_number_of_increments(k in 0u64..25) {
        let clock = fixed_clock();
        let mut store = empty_store(Arc::new(MemoryStorage::new()), clock.clone());
        let item = store.create(paper("Counted", "Misc")).unwrap();
        for _ in 0..k {
            clock.advance(Duration::seconds(1));
            store.increment_view_count(&item.id).unwrap();
        }
        let stored = store.get(&item.id).unwrap();
        prop_assert_eq!(stored.view_count, k);
        if k > 0 {
            prop_assert_eq!(stored.last_viewed, Some(clock.now()));
        } else {
            prop_assert_eq!(stored.last_viewed, None);
        }
    }

    #[test]
    fn test_filter_order_does_not_matter(
        specs in prop::collection::vec((kind_strategy(), 0usize..3), 1..20),
        pick_kind in kind_strategy(),
        pick_category in 0usize..3,
    ) {
        let categories = ["Science", "Nature", "Technology"];
        let mut store = empty_store(Arc::new(MemoryStorage::new()), fixed_clock());
        for (n, (kind, cat)) in specs.iter().enumerate() {
            let mut draft = paper(&format!("T{}", n), categories[*cat]);
            draft.kind = *kind;
            store.create(draft).unwrap();
        }
        let items = store.items();

        let by_category = Criteria {
            category: Some(categories[pick_category].to_string()),
            ..Default::default()
        };
        let by_type = Criteria { kind: Some(pick_kind), ..Default::default() };
        let both = Criteria {
            category: by_category.category.clone(),
            kind: Some(pick_kind),
            ..Default::default()
        };

        let category_then_type: Vec<_> = filtered_view(items, &by_category)
            .into_iter()
            .filter(|i| by_type.matches(i))
            .collect();
        let type_then_category: Vec<_> = filtered_view(items, &by_type)
            .into_iter()
            .filter(|i| by_category.matches(i))
            .collect();

        prop_assert_eq!(id_set(category_then_type.clone()), id_set(type_then_category));
        prop_assert_eq!(id_set(category_then_type), id_set(filtered_view(items, &both)));
    }
}
