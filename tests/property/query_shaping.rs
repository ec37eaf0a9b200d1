//! Property tests for list shaping and guard decisions.
//!
//! Uses proptest to verify:
//! 1. A status-filtered list holds only active tasks of that status, sorted
//!    and capped, and never invents tasks.
//! 2. An unfiltered list keeps the store's order and is only capped.
//! 3. The remote query never combines a status filter with ordering.
//! 4. The page filter is a subsequence of the local list.
//! 5. The two guards disagree on every session snapshot.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use taskdesk::guards::GuardKind;
use taskdesk::provider::StoredDocument;
use taskdesk::tasks::shaping::{remote_query, shape_fetched};
use taskdesk::tasks::{LocalFilter, StatusFilter};
use taskdesk_proto::query::{SortKey, SortOrder, TaskQuery, compare_by};
use taskdesk_proto::task::{TaskDocument, TaskId, TaskStatus};
use taskdesk_proto::user::{User, UserRole};

// --- Strategies ---

fn owner() -> User {
    let now = Utc::now();
    User {
        id: "uid-1".to_string(),
        name: "Ana".to_string(),
        email: "a@x.com".to_string(),
        role: UserRole::User,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..1_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

fn arb_docs() -> impl Strategy<Value = Vec<StoredDocument>> {
    prop::collection::vec(
        ("[a-zA-Z]{1,8}", arb_status(), any::<bool>(), arb_time(), arb_time()),
        0..24,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (title, status, is_active, created_at, updated_at))| StoredDocument {
                id: TaskId::new(format!("t{i}")),
                data: TaskDocument {
                    user_id: "uid-1".to_string(),
                    title,
                    description: String::new(),
                    status,
                    is_active,
                    created_at,
                    updated_at,
                },
            })
            .collect()
    })
}

fn arb_query() -> impl Strategy<Value = TaskQuery> {
    (
        prop::option::of(arb_status()),
        prop::option::of(0usize..10),
        prop::option::of(prop_oneof![
            Just(SortKey::CreatedAt),
            Just(SortKey::UpdatedAt),
            Just(SortKey::Title),
        ]),
        prop::option::of(prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)]),
    )
        .prop_map(|(status, limit, sort_by, sort_order)| TaskQuery {
            status,
            limit,
            sort_by,
            sort_order,
        })
}

fn expected_len(available: usize, limit: Option<usize>) -> usize {
    match limit {
        Some(limit) if limit > 0 => available.min(limit),
        _ => available,
    }
}

// --- Shaping ---

proptest! {
    #[test]
    fn status_list_is_active_sorted_and_capped(
        docs in arb_docs(),
        status in arb_status(),
        query in arb_query(),
    ) {
        let query = TaskQuery { status: Some(status), ..query };
        // The store applied the status filter already.
        let fetched: Vec<StoredDocument> =
            docs.into_iter().filter(|d| d.data.status == status).collect();
        let active = fetched.iter().filter(|d| d.data.is_active).count();

        let tasks = shape_fetched(fetched.clone(), &query, &owner());

        prop_assert_eq!(tasks.len(), expected_len(active, query.limit));
        prop_assert!(tasks.iter().all(|t| t.is_active && t.status == status));
        prop_assert!(tasks.iter().all(|t| fetched.iter().any(|d| d.id == t.id)));
        for pair in tasks.windows(2) {
            prop_assert_ne!(
                compare_by(&pair[0], &pair[1], query.sort_key(), query.order()),
                std::cmp::Ordering::Greater
            );
        }
    }

    #[test]
    fn unfiltered_list_keeps_store_order(docs in arb_docs(), query in arb_query()) {
        let query = TaskQuery { status: None, ..query };

        let tasks = shape_fetched(docs.clone(), &query, &owner());

        prop_assert_eq!(tasks.len(), expected_len(docs.len(), query.limit));
        for (task, doc) in tasks.iter().zip(&docs) {
            prop_assert_eq!(&task.id, &doc.id);
        }
    }

    #[test]
    fn remote_query_never_orders_a_status_filter(query in arb_query()) {
        let remote = remote_query("uid-1", &query);

        prop_assert!(remote.filters_on("userId"));
        if query.status.is_some() {
            prop_assert!(remote.filters_on("status"));
            prop_assert!(!remote.filters_on("isActive"));
            prop_assert!(remote.order_by.is_none());
        } else {
            prop_assert!(!remote.filters_on("status"));
            prop_assert!(remote.filters_on("isActive"));
            prop_assert_eq!(remote.order_by, Some((query.sort_key(), query.order())));
        }
    }
}

// --- Page filter ---

proptest! {
    #[test]
    fn page_filter_is_a_subsequence(
        docs in arb_docs(),
        only in prop::option::of(arb_status()),
        search in "[a-zA-Z]{0,2}",
    ) {
        let tasks = shape_fetched(docs, &TaskQuery::default(), &owner());
        let filter = LocalFilter {
            status: only.map_or(StatusFilter::All, StatusFilter::Only),
            search,
        };

        let shown = filter.apply(&tasks);

        let mut rest = tasks.iter();
        for task in &shown {
            prop_assert!(filter.status.admits(task.status));
            prop_assert!(task.matches_search(&filter.search));
            prop_assert!(rest.any(|t| t.id == task.id));
        }
        if filter.is_clear() {
            prop_assert_eq!(shown.len(), tasks.len());
        }
    }
}

// --- Guards ---

proptest! {
    #[test]
    fn guards_never_agree(signed_in in any::<bool>()) {
        let authenticated = GuardKind::Authenticated.decide(signed_in).is_permit();
        let unauthenticated = GuardKind::Unauthenticated.decide(signed_in).is_permit();
        prop_assert_ne!(authenticated, unauthenticated);
    }
}
