//! Shared `FeedStore` contract assertions
//!
//! Every store backing must pass these. Backing-specific failure scenarios
//! prepare the store and then call the `*_on_*_error` assertions.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::FutureExt;
use feedcache::cache::{CachedFeed, FeedStore, LocalFeedImage, RetrievalOutcome, StoreError};
use feedcache::data::FeedImage;
use url::Url;
use uuid::Uuid;

pub fn unique_image() -> FeedImage {
    FeedImage {
        id: Uuid::new_v4(),
        description: Some("any".to_string()),
        location: Some("any".to_string()),
        url: Url::parse("https://any-url.com").unwrap(),
    }
}

pub fn unique_local_feed() -> Vec<LocalFeedImage> {
    vec![unique_image().into(), unique_image().into()]
}

pub fn fixed_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap()
}

/// A clock tests can move forward while a loader holds it
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    pub fn at(date: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(date)))
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }
}

pub async fn insert(
    store: &dyn FeedStore,
    feed: Vec<LocalFeedImage>,
    timestamp: DateTime<Utc>,
) -> Result<(), StoreError> {
    store.insert(feed, timestamp).await
}

pub async fn expect_to_retrieve(store: &dyn FeedStore, expected: &RetrievalOutcome) {
    let retrieved = store.retrieve().await;
    match (expected, &retrieved) {
        (RetrievalOutcome::Failure(_), RetrievalOutcome::Failure(_)) => {}
        _ => assert_eq!(&retrieved, expected),
    }
}

pub async fn expect_to_retrieve_twice(store: &dyn FeedStore, expected: &RetrievalOutcome) {
    expect_to_retrieve(store, expected).await;
    expect_to_retrieve(store, expected).await;
}

pub async fn assert_that_retrieve_delivers_empty_on_empty_cache(store: &dyn FeedStore) {
    expect_to_retrieve(store, &RetrievalOutcome::Empty).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_empty_cache(store: &dyn FeedStore) {
    expect_to_retrieve_twice(store, &RetrievalOutcome::Empty).await;
}

pub async fn assert_that_retrieve_delivers_found_values_on_non_empty_cache(store: &dyn FeedStore) {
    let feed = unique_local_feed();
    let timestamp = Utc::now();

    insert(store, feed.clone(), timestamp).await.unwrap();

    expect_to_retrieve(store, &RetrievalOutcome::Found(CachedFeed { feed, timestamp })).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_non_empty_cache(store: &dyn FeedStore) {
    let feed = unique_local_feed();
    let timestamp = Utc::now();

    insert(store, feed.clone(), timestamp).await.unwrap();

    expect_to_retrieve_twice(store, &RetrievalOutcome::Found(CachedFeed { feed, timestamp }))
        .await;
}

pub async fn assert_that_retrieve_delivers_failure_on_retrieval_error(store: &dyn FeedStore) {
    expect_to_retrieve(store, &RetrievalOutcome::Failure(StoreError::Stopped)).await;
}

pub async fn assert_that_retrieve_has_no_side_effects_on_failure(store: &dyn FeedStore) {
    expect_to_retrieve_twice(store, &RetrievalOutcome::Failure(StoreError::Stopped)).await;
}

pub async fn assert_that_insert_delivers_no_error_on_empty_cache(store: &dyn FeedStore) {
    let result = insert(store, unique_local_feed(), Utc::now()).await;
    assert_eq!(result, Ok(()), "Expected to insert cache successfully");
}

pub async fn assert_that_insert_delivers_no_error_on_non_empty_cache(store: &dyn FeedStore) {
    insert(store, unique_local_feed(), Utc::now()).await.unwrap();

    let result = insert(store, unique_local_feed(), Utc::now()).await;
    assert_eq!(result, Ok(()), "Expected to override cache successfully");
}

pub async fn assert_that_insert_overrides_previously_inserted_cache_values(store: &dyn FeedStore) {
    insert(store, unique_local_feed(), Utc::now()).await.unwrap();

    let latest_feed = unique_local_feed();
    let latest_timestamp = Utc::now();
    insert(store, latest_feed.clone(), latest_timestamp).await.unwrap();

    expect_to_retrieve(
        store,
        &RetrievalOutcome::Found(CachedFeed {
            feed: latest_feed,
            timestamp: latest_timestamp,
        }),
    )
    .await;
}

pub async fn assert_that_insert_preserves_order_and_duplicates(store: &dyn FeedStore) {
    let image: LocalFeedImage = unique_image().into();
    let other: LocalFeedImage = unique_image().into();
    let feed = vec![image.clone(), other, image];
    let timestamp = fixed_date();

    insert(store, feed.clone(), timestamp).await.unwrap();

    expect_to_retrieve(store, &RetrievalOutcome::Found(CachedFeed { feed, timestamp })).await;
}

pub async fn assert_that_insert_delivers_error_on_insertion_error(store: &dyn FeedStore) {
    let result = insert(store, unique_local_feed(), Utc::now()).await;
    assert!(result.is_err(), "Expected cache insertion to fail with an error");
}

pub async fn assert_that_delete_delivers_no_error_on_empty_cache(store: &dyn FeedStore) {
    let result = store.delete_cached_feed().await;
    assert_eq!(result, Ok(()), "Expected empty cache deletion to succeed");
}

pub async fn assert_that_delete_has_no_side_effects_on_empty_cache(store: &dyn FeedStore) {
    store.delete_cached_feed().await.unwrap();

    expect_to_retrieve(store, &RetrievalOutcome::Empty).await;
}

pub async fn assert_that_delete_delivers_no_error_on_non_empty_cache(store: &dyn FeedStore) {
    insert(store, unique_local_feed(), Utc::now()).await.unwrap();

    let result = store.delete_cached_feed().await;
    assert_eq!(result, Ok(()), "Expected non-empty cache deletion to succeed");
}

pub async fn assert_that_delete_empties_previously_inserted_cache(store: &dyn FeedStore) {
    insert(store, unique_local_feed(), Utc::now()).await.unwrap();

    store.delete_cached_feed().await.unwrap();

    expect_to_retrieve(store, &RetrievalOutcome::Empty).await;
}

pub async fn assert_that_delete_empties_corrupt_cache(store: &dyn FeedStore) {
    let result = store.delete_cached_feed().await;
    assert_eq!(result, Ok(()), "Expected corrupt cache deletion to succeed");

    expect_to_retrieve(store, &RetrievalOutcome::Empty).await;
}

/// Operations issued back-to-back without awaiting take effect in issue order
pub async fn assert_that_side_effects_run_serially(store: &dyn FeedStore) {
    let first_feed = unique_local_feed();
    let last_feed = unique_local_feed();
    let timestamp = fixed_date();

    let first_insert = store.insert(first_feed, timestamp);
    let delete = store.delete_cached_feed();
    let last_insert = store.insert(last_feed.clone(), timestamp);
    let retrieve = store.retrieve();

    // Awaited in reverse: the order of effects is fixed when issued.
    assert_eq!(
        retrieve.await,
        RetrievalOutcome::Found(CachedFeed {
            feed: last_feed,
            timestamp,
        })
    );
    assert_eq!(last_insert.await, Ok(()));
    assert_eq!(delete.await, Ok(()));
    assert_eq!(first_insert.await, Ok(()));
}

/// By the time an operation completes, every earlier one has completed too
pub async fn assert_that_operations_complete_in_issue_order(store: &dyn FeedStore) {
    let first = store.insert(unique_local_feed(), fixed_date());
    let second = store.delete_cached_feed();
    let third = store.insert(unique_local_feed(), fixed_date());

    assert_eq!(third.await, Ok(()));
    assert_eq!(
        second.now_or_never(),
        Some(Ok(())),
        "Expected deletion to complete before the later insertion"
    );
    assert_eq!(
        first.now_or_never(),
        Some(Ok(())),
        "Expected first insertion to complete before the later insertion"
    );
}
