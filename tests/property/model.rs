//! Property tests for the shared model types.
//!
//! Uses proptest to verify:
//! 1. Advancing a status three times returns to where it started.
//! 2. Status names parse back to the same status.
//! 3. Every provider code maps to a message; unknown codes use the fallback.
//! 4. Sorting comparisons are antisymmetric and direction flips them.
//! 5. User initials are at most two uppercase letters.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use taskdesk_proto::codes::{AuthCode, UNKNOWN_ERROR_MESSAGE};
use taskdesk_proto::query::{SortKey, SortOrder, compare_by};
use taskdesk_proto::task::{TaskDocument, TaskStatus};
use taskdesk_proto::user::{User, UserRole};

// --- Strategies ---

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_time() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..2_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
}

fn arb_document() -> impl Strategy<Value = TaskDocument> {
    ("[a-zA-Z ]{1,20}", arb_status(), any::<bool>(), arb_time(), arb_time()).prop_map(
        |(title, status, is_active, created_at, updated_at)| TaskDocument {
            user_id: "uid-1".to_string(),
            title,
            description: String::new(),
            status,
            is_active,
            created_at,
            updated_at,
        },
    )
}

fn arb_key() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::CreatedAt),
        Just(SortKey::UpdatedAt),
        Just(SortKey::Title),
    ]
}

// --- Status ---

proptest! {
    #[test]
    fn status_cycle_has_period_three(status in arb_status()) {
        prop_assert_eq!(status.next().next().next(), status);
        prop_assert_ne!(status.next(), status);
    }

    #[test]
    fn status_name_parses_back(status in arb_status()) {
        prop_assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
    }
}

// --- Provider codes ---

proptest! {
    #[test]
    fn known_codes_round_trip(index in 0usize..AuthCode::KNOWN.len()) {
        let code = AuthCode::KNOWN[index].clone();
        prop_assert_eq!(AuthCode::from_code(code.code()), code.clone());
        prop_assert_ne!(code.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn unknown_codes_use_fallback(suffix in "[a-z-]{1,24}") {
        let raw = format!("x-{suffix}");
        let code = AuthCode::from_code(&raw);
        prop_assert_eq!(code.code(), raw.as_str());
        prop_assert_eq!(code.message(), UNKNOWN_ERROR_MESSAGE);
    }
}

// --- Ordering ---

proptest! {
    #[test]
    fn comparison_is_antisymmetric(a in arb_document(), b in arb_document(), key in arb_key()) {
        let ab = compare_by(&a, &b, key, SortOrder::Asc);
        let ba = compare_by(&b, &a, key, SortOrder::Asc);
        prop_assert_eq!(ab, ba.reverse());
    }

    #[test]
    fn descending_reverses_ascending(a in arb_document(), b in arb_document(), key in arb_key()) {
        prop_assert_eq!(
            compare_by(&a, &b, key, SortOrder::Desc),
            compare_by(&a, &b, key, SortOrder::Asc).reverse()
        );
    }
}

// --- Users ---

proptest! {
    #[test]
    fn initials_are_short_and_uppercase(name in "[a-zA-Z ]{0,40}") {
        let now = Utc::now();
        let user = User {
            id: "uid-1".to_string(),
            name,
            email: "a@x.com".to_string(),
            role: UserRole::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let initials = user.initials();
        prop_assert!(!initials.is_empty());
        prop_assert!(initials.chars().count() <= 2);
        prop_assert_eq!(initials.to_uppercase(), initials);
    }
}
