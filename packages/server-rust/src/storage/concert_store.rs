//! In-memory concert store.
//!
//! The collection is a `Vec` in insertion order guarded by a single
//! [`parking_lot::Mutex`]. Every operation takes the lock for its whole
//! duration and releases it before returning, so callers never observe a
//! partially applied mutation and the lock is never held across an `.await`.

use concerts_core::schema::MAX_LIMIT;
use concerts_core::{Concert, ConcertPayload, NewConcert};
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Errors returned by [`ConcertStore`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No concert has the requested id.
    #[error("concert not found: {id}")]
    NotFound { id: String },
}

impl StoreError {
    fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }
}

/// Authoritative collection of concerts, shared across handlers via `Arc`.
#[derive(Debug, Default)]
pub struct ConcertStore {
    concerts: Mutex<Vec<Concert>>,
}

impl ConcertStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns one page of concerts in insertion order.
    ///
    /// `page` is 1-based. Out-of-range input is clamped (`page` to at least 1,
    /// `limit` to `1..=100`). A page past the end yields an empty vector.
    /// The result is an owned copy; mutating it does not affect the store.
    #[must_use]
    pub fn list(&self, page: usize, limit: usize) -> Vec<Concert> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_LIMIT);
        let start = (page - 1).saturating_mul(limit);

        let concerts = self.concerts.lock();
        if start >= concerts.len() {
            return Vec::new();
        }
        let end = start.saturating_add(limit).min(concerts.len());
        concerts[start..end].to_vec()
    }

    /// Stores a new concert under a freshly generated id and returns it.
    pub fn create(&self, concert: NewConcert) -> Concert {
        let concert = concert.into_concert(Uuid::new_v4().to_string());
        self.concerts.lock().push(concert.clone());
        debug!(id = %concert.id, "concert created");
        concert
    }

    /// Returns the concert with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no concert has this id.
    pub fn show(&self, id: &str) -> Result<Concert, StoreError> {
        self.concerts
            .lock()
            .iter()
            .find(|concert| concert.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Applies the present attributes of `changes` to the concert with the
    /// given id and returns the updated concert. Absent attributes keep
    /// their current value; the id never changes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no concert has this id.
    pub fn update(&self, id: &str, changes: ConcertPayload) -> Result<Concert, StoreError> {
        let mut concerts = self.concerts.lock();
        let concert = concerts
            .iter_mut()
            .find(|concert| concert.id == id)
            .ok_or_else(|| StoreError::not_found(id))?;
        changes.apply_to(concert);
        let updated = concert.clone();
        drop(concerts);

        debug!(id, "concert updated");
        Ok(updated)
    }

    /// Removes the concert with the given id, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no concert has this id; the
    /// collection is left unchanged.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut concerts = self.concerts.lock();
        let index = concerts
            .iter()
            .position(|concert| concert.id == id)
            .ok_or_else(|| StoreError::not_found(id))?;
        concerts.remove(index);
        drop(concerts);

        debug!(id, "concert deleted");
        Ok(())
    }

    /// Number of stored concerts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concerts.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concerts.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use concerts_core::Field;
    use proptest::prelude::*;

    use super::*;

    fn new_concert(n: usize) -> NewConcert {
        NewConcert {
            artist: format!("Artist {n}"),
            date: "2025-03-01".to_string(),
            venue: format!("Venue {n}"),
            price: i64::try_from(n).unwrap() + 1,
        }
    }

    fn store_with(n: usize) -> (ConcertStore, Vec<Concert>) {
        let store = ConcertStore::new();
        let created = (0..n).map(|i| store.create(new_concert(i))).collect();
        (store, created)
    }

    #[test]
    fn create_assigns_uuid_and_returns_stored_value() {
        let store = ConcertStore::new();
        let concert = store.create(new_concert(0));

        assert!(Uuid::parse_str(&concert.id).is_ok());
        assert_eq!(concert.artist, "Artist 0");
        assert_eq!(store.show(&concert.id).unwrap(), concert);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_first_page_returns_creation_order() {
        let (store, created) = store_with(7);
        assert_eq!(store.list(1, 10), created);
    }

    #[test]
    fn list_pages_are_contiguous() {
        let (store, created) = store_with(25);
        assert_eq!(store.list(1, 10), created[0..10]);
        assert_eq!(store.list(2, 10), created[10..20]);
        assert_eq!(store.list(3, 10), created[20..25]);
    }

    #[test]
    fn list_past_the_end_is_empty() {
        let (store, _) = store_with(5);
        assert!(store.list(2, 5).is_empty());
        assert!(store.list(100, 100).is_empty());
        assert!(ConcertStore::new().list(1, 10).is_empty());
    }

    #[test]
    fn list_clamps_out_of_range_input() {
        let (store, created) = store_with(150);
        assert_eq!(store.list(0, 10), created[0..10]);
        assert_eq!(store.list(1, 0), created[0..1]);
        assert_eq!(store.list(1, 1000).len(), MAX_LIMIT);
        assert!(store.list(usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn list_returns_detached_copy() {
        let (store, created) = store_with(1);
        let mut page = store.list(1, 10);
        page[0].price = 9999;
        page.clear();
        assert_eq!(store.show(&created[0].id).unwrap(), created[0]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn show_unknown_id_is_not_found() {
        let store = ConcertStore::new();
        assert_eq!(
            store.show("missing"),
            Err(StoreError::NotFound {
                id: "missing".to_string()
            })
        );
    }

    #[test]
    fn update_price_only_keeps_other_fields() {
        let (store, created) = store_with(1);
        let before = &created[0];

        let updated = store
            .update(
                &before.id,
                ConcertPayload {
                    price: Field::Present(500),
                    ..ConcertPayload::default()
                },
            )
            .unwrap();

        assert_eq!(updated.price, 500);
        assert_eq!(updated.id, before.id);
        assert_eq!(updated.artist, before.artist);
        assert_eq!(updated.date, before.date);
        assert_eq!(updated.venue, before.venue);
        assert_eq!(store.show(&before.id).unwrap(), updated);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (store, created) = store_with(2);
        let result = store.update(
            "missing",
            ConcertPayload {
                artist: Field::Present("X".to_string()),
                ..ConcertPayload::default()
            },
        );
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert_eq!(store.list(1, 10), created);
    }

    #[test]
    fn delete_then_show_is_not_found() {
        let (store, created) = store_with(3);
        store.delete(&created[1].id).unwrap();

        assert!(matches!(
            store.show(&created[1].id),
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(store.list(1, 10), vec![created[0].clone(), created[2].clone()]);
    }

    #[test]
    fn delete_unknown_id_leaves_collection_unchanged() {
        let (store, created) = store_with(3);
        let err = store.delete("missing").unwrap_err();

        assert_eq!(err.to_string(), "concert not found: missing");
        assert_eq!(store.len(), 3);
        assert_eq!(store.list(1, 10), created);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (store, created) = store_with(1);
        store.delete(&created[0].id).unwrap();
        let again = store.create(new_concert(0));
        assert_ne!(again.id, created[0].id);
    }

    #[test]
    fn concurrent_creates_are_not_lost() {
        let store = Arc::new(ConcertStore::new());

        let handles: Vec<_> = (0..10)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..10)
                        .map(|i| store.create(new_concert(t * 10 + i)).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 100);
        assert_eq!(store.len(), 100);
        let listed: HashSet<String> = (1..=2)
            .flat_map(|page| store.list(page, 50))
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn list_during_concurrent_deletes_never_sees_partial_state() {
        let (store, created) = store_with(100);
        let store = Arc::new(store);
        let known: HashSet<String> = created.iter().map(|c| c.id.clone()).collect();

        let deleter = {
            let store = Arc::clone(&store);
            let ids: Vec<String> = created.iter().map(|c| c.id.clone()).collect();
            thread::spawn(move || {
                for id in ids {
                    store.delete(&id).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let page = store.list(1, 100);
            assert!(page.iter().all(|c| known.contains(&c.id)));
            let unique: HashSet<&str> = page.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(unique.len(), page.len());
        }

        deleter.join().unwrap();
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn created_ids_are_pairwise_distinct(n in 1usize..64) {
            let (_, created) = store_with(n);
            let ids: HashSet<&str> = created.iter().map(|c| c.id.as_str()).collect();
            prop_assert_eq!(ids.len(), n);
        }

        #[test]
        fn page_length_matches_window(len in 0usize..60, page in 0usize..10, limit in 0usize..120) {
            let (store, _) = store_with(len);
            let got = store.list(page, limit).len();

            let page = page.max(1);
            let limit = limit.clamp(1, MAX_LIMIT);
            let start = (page - 1) * limit;
            let expected = if start >= len { 0 } else { (start + limit).min(len) - start };
            prop_assert_eq!(got, expected);
        }
    }
}
