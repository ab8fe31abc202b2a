//! End-to-end flows of the list-synchronization layer, driven with stub
//! transports: pagination against a simulated server, optimistic mutation
//! with the error channel, and debounced search.

use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use askhub::client::ApiError;
use askhub::models::{Community, Question};
use askhub::sync::{
    search_pair, sync_page, Debouncer, ErrorSlot, FailedResponse, Fetcher, ListSync, PageQuery,
    Severity, SortKey, Vote,
};

fn community(id: &str, name: &str) -> Community {
    Community {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        members: Vec::new(),
        created_by_id: "creator".to_string(),
        question_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: None,
    }
}

fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        name: format!("question {}", id),
        content: String::new(),
        created_by_id: "author".to_string(),
        community_id: None,
        upvotes: Vec::new(),
        downvotes: Vec::new(),
        likes: Vec::new(),
        comment_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        created_by: None,
        community: None,
    }
}

fn unauthorized() -> ApiError {
    ApiError::Response(FailedResponse {
        status: 401,
        status_text: "Unauthorized".to_string(),
        body: json!({ "detail": "Unauthorized" }),
    })
}

/// Slice a simulated, consistently ordered server collection by the page
/// window, like the real collection endpoints do.
fn server_page(server: &[Community], page: &PageQuery) -> Vec<Community> {
    server
        .iter()
        .skip(page.skip.max(0) as usize)
        .take(page.take.max(0) as usize)
        .cloned()
        .collect()
}

#[tokio::test]
async fn load_more_walks_the_collection_without_duplicates() {
    let server: Vec<Community> = (0..20)
        .map(|i| community(&format!("c{:02}", i), &format!("community {:02}", i)))
        .collect();

    let mut list = ListSync::new(PageQuery::with_take(9));
    let mut fetcher = Fetcher::new();

    let registration = fetcher.begin();
    sync_page(&mut list, registration, |page| {
        let fetched = server_page(&server, &page);
        async move { Ok(fetched) }
    })
    .await
    .unwrap();
    assert_eq!(list.items().len(), 9);

    list.advance();
    let registration = fetcher.begin();
    sync_page(&mut list, registration, |page| {
        let fetched = server_page(&server, &page);
        async move { Ok(fetched) }
    })
    .await
    .unwrap();

    // Appended, and no key appears twice
    assert!(list.items().len() > 9);
    let mut ids: Vec<&str> = list.items().iter().map(|c| c.id.as_str()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[tokio::test]
async fn refetch_with_zero_offset_replaces_accumulated_pages() {
    let server: Vec<Community> = (0..20)
        .map(|i| community(&format!("c{:02}", i), &format!("community {:02}", i)))
        .collect();

    let mut list = ListSync::new(PageQuery::with_take(9));
    let mut fetcher = Fetcher::new();

    for _ in 0..2 {
        let registration = fetcher.begin();
        sync_page(&mut list, registration, |page| {
            let fetched = server_page(&server, &page);
            async move { Ok(fetched) }
        })
        .await
        .unwrap();
        list.advance();
    }
    assert!(list.items().len() > 9);

    // Re-sort: offset resets and the next page replaces everything held
    list.set_order(SortKey::Name);
    assert_eq!(list.page().skip, 0);

    let registration = fetcher.begin();
    sync_page(&mut list, registration, |page| {
        let fetched = server_page(&server, &page);
        async move { Ok(fetched) }
    })
    .await
    .unwrap();
    assert_eq!(list.items().len(), 9);
}

#[tokio::test]
async fn load_more_offset_accounts_for_local_removal() {
    let server: Vec<Community> = (0..20)
        .map(|i| community(&format!("c{:02}", i), &format!("community {:02}", i)))
        .collect();

    let mut list = ListSync::new(PageQuery::with_take(9));
    let mut fetcher = Fetcher::new();

    let registration = fetcher.begin();
    sync_page(&mut list, registration, |page| {
        let fetched = server_page(&server, &page);
        async move { Ok(fetched) }
    })
    .await
    .unwrap();
    assert_eq!(list.items().len(), 9);

    // One entry deleted locally before the next load-more
    let removed = list.items()[4].clone();
    list.remove(&removed);
    assert_eq!(list.items().len(), 8);

    list.advance();
    assert_eq!(list.page().skip, 17);
}

#[tokio::test]
async fn slow_first_page_cannot_stomp_a_newer_fetch() {
    let server: Vec<Community> = (0..5)
        .map(|i| community(&format!("c{}", i), &format!("community {}", i)))
        .collect();

    let mut list = ListSync::new(PageQuery::with_take(9));
    let mut fetcher = Fetcher::new();

    // The first fetch is slow; a second one supersedes it immediately.
    let stale_registration = fetcher.begin();
    let current_registration = fetcher.begin();

    let outcome = sync_page(&mut list, stale_registration, |_page| async {
        sleep(Duration::from_millis(30)).await;
        Ok(vec![community("stale", "stale")])
    })
    .await;
    assert!(outcome.is_ok());
    assert!(list.items().is_empty(), "aborted page must not apply");

    sync_page(&mut list, current_registration, |page| {
        let fetched = server_page(&server, &page);
        async move { Ok(fetched) }
    })
    .await
    .unwrap();
    assert_eq!(list.items().len(), 5);
    assert_ne!(list.items()[0].id, "stale");
}

#[tokio::test]
async fn fetch_failure_reaches_the_error_channel() {
    let mut list: ListSync<Community> = ListSync::new(PageQuery::default());
    let mut fetcher = Fetcher::new();
    let mut errors = ErrorSlot::new();

    let registration = fetcher.begin();
    let outcome = sync_page(&mut list, registration, |_page| async {
        Err::<Vec<Community>, _>(ApiError::Response(FailedResponse {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: json!({ "detail": "database exploded" }),
        }))
    })
    .await;

    if let Err(ref err) = outcome {
        errors.record(err);
    }

    assert!(list.items().is_empty());
    let held = errors.current().expect("failure should be held");
    assert_eq!(held.severity(), Severity::Error);
    assert_eq!(held.message(), "database exploded");
}

#[tokio::test]
async fn optimistic_vote_survives_a_failed_push() {
    let mut list = ListSync::new(PageQuery::default());
    list.apply_page(vec![question("q1"), question("q2")]);

    let mut held = list.items()[0].clone();
    let mut errors = ErrorSlot::new();

    let outcome = askhub::sync::mutate::toggle_vote(&mut held, "u1", Vote::Up, |_payload| async {
        Err(unauthorized())
    })
    .await;

    // The failure is surfaced, the attempted state is kept and flows back
    // into the list; nothing rolls back until the next full reload.
    if let Err(ref err) = outcome {
        errors.record(err);
    }
    list.upsert(held);

    assert_eq!(list.items()[0].upvotes, vec!["u1".to_string()]);
    let held_error = errors.current().expect("error should be visible");
    assert_eq!(held_error.severity(), Severity::Warning);
    assert_eq!(held_error.message(), "Unauthorized");
}

#[tokio::test]
async fn vote_switch_round_trip_through_the_list() {
    let mut list = ListSync::new(PageQuery::default());
    let mut seeded = question("q1");
    seeded.downvotes = vec!["u1".to_string()];
    list.apply_page(vec![seeded, question("q2")]);

    let mut held = list.items()[0].clone();
    askhub::sync::mutate::toggle_vote(&mut held, "u1", Vote::Up, |payload| async move {
        // server is authoritative for derived fields
        let mut server = payload;
        server.comment_count = 3;
        Ok(server)
    })
    .await
    .unwrap();
    list.upsert(held);

    let updated = &list.items()[0];
    assert_eq!(updated.upvotes, vec!["u1".to_string()]);
    assert!(updated.downvotes.is_empty());
    assert_eq!(updated.comment_count, 3);
    // untouched neighbor keeps its position
    assert_eq!(list.items()[1].id, "q2");
}

#[tokio::test]
async fn typing_burst_fires_a_single_dual_search() {
    let community_calls = Arc::new(AtomicUsize::new(0));
    let question_calls = Arc::new(AtomicUsize::new(0));
    let mut debouncer = Debouncer::new(Duration::from_millis(20));

    let mut handles = Vec::new();
    for _keystroke in 0..3 {
        let community_calls = community_calls.clone();
        let question_calls = question_calls.clone();
        handles.push(debouncer.queue(async move {
            let mut fetcher = Fetcher::new();
            let registration = fetcher.begin();
            search_pair(
                registration,
                move || async move {
                    community_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<Vec<Community>, ApiError>(Vec::new())
                },
                move || async move {
                    question_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<Vec<Question>, ApiError>(Vec::new())
                },
            )
            .await
        }));
        sleep(Duration::from_millis(5)).await;
    }

    for handle in handles {
        let _ = handle.await;
    }

    // Only the last keystroke's delay ran out uninterrupted
    assert_eq!(community_calls.load(Ordering::SeqCst), 1);
    assert_eq!(question_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn new_search_cancels_the_in_flight_one() {
    let mut fetcher = Fetcher::new();

    let stale_registration = fetcher.begin();
    let stale = tokio::spawn(search_pair(
        stale_registration,
        || async {
            sleep(Duration::from_millis(50)).await;
            Ok::<Vec<Community>, ApiError>(vec![community("c1", "stale result")])
        },
        || async { Ok::<Vec<Question>, ApiError>(Vec::new()) },
    ));
    sleep(Duration::from_millis(5)).await;

    let registration = fetcher.begin();
    let fresh = search_pair(
        registration,
        || async { Ok::<Vec<Community>, ApiError>(vec![community("c2", "fresh result")]) },
        || async { Ok::<Vec<Question>, ApiError>(Vec::new()) },
    )
    .await
    .unwrap()
    .expect("fresh search should complete");

    assert_eq!(fresh.communities[0].name, "fresh result");

    // The superseded search resolved silently, without results
    let stale_outcome = stale.await.unwrap().unwrap();
    assert!(stale_outcome.is_none());
}

#[tokio::test]
async fn error_slot_holds_only_the_latest_failure() {
    let mut errors = ErrorSlot::with_window(Duration::from_millis(100));

    errors.record(&ApiError::Response(FailedResponse {
        status: 500,
        status_text: "Internal Server Error".to_string(),
        body: serde_json::Value::Null,
    }));
    errors.record(&unauthorized());

    let held = errors.current().expect("latest failure should be held");
    assert_eq!(held.status, 401);

    sleep(Duration::from_millis(120)).await;
    assert!(errors.current().is_none(), "slot auto-clears after the window");
}
