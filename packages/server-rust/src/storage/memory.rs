//! In-memory [`DataSource`] backed by [`DashMap`].
//!
//! Concurrent read/write access without external locking; fine-grained
//! sharding internally via `DashMap`. The whole catalog fits in memory,
//! which is all the demo server and the test suites need.

use async_trait::async_trait;
use dashmap::DashMap;
use ngopi_core::PredicateSet;

use crate::storage::eval;
use crate::storage::record::Record;
use crate::traits::{DataSource, StorageError};

/// In-memory resource collection keyed by record id.
pub struct MemoryDataSource<R> {
    records: DashMap<String, R, ahash::RandomState>,
}

impl<R: Record> MemoryDataSource<R> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Creates a collection holding `rows`.
    pub fn with_records<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        let source = Self::new();
        for row in rows {
            source.insert(row);
        }
        source
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn insert(&self, record: R) -> Option<R> {
        self.records.insert(record.id().to_string(), record)
    }

    /// Removes a record by id.
    pub fn remove(&self, id: &str) -> Option<R> {
        self.records.remove(id).map(|(_, record)| record)
    }

    /// Rewrites one record in a single guarded step.
    ///
    /// The entry's shard lock is held across the whole mutation, so a
    /// concurrent reader sees either the old record or the fully updated
    /// one, never a partial rewrite. This is what keeps the cafe/facility
    /// association replacement atomic. Concurrent rewrites of the same
    /// record are last-writer-wins.
    pub fn update<F>(&self, id: &str, apply: F) -> Option<R>
    where
        F: FnOnce(&mut R),
    {
        let mut entry = self.records.get_mut(id)?;
        apply(entry.value_mut());
        Some(entry.value().clone())
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record failing `keep`, returning how many were removed.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&R) -> bool,
    {
        let before = self.records.len();
        self.records.retain(|_, record| keep(record));
        before - self.records.len()
    }

    /// Clones out every record, in no particular order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<R> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn matching(&self, predicates: &PredicateSet) -> Vec<R> {
        self.records
            .iter()
            .filter(|entry| eval::matches(entry.value(), &predicates.conditions))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl<R: Record> Default for MemoryDataSource<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> DataSource<R> for MemoryDataSource<R> {
    async fn select(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<R>, StorageError> {
        let mut rows = self.matching(predicates);
        eval::sort(&mut rows, predicates.order.as_ref());
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, predicates: &PredicateSet) -> Result<u64, StorageError> {
        let matched = self
            .records
            .iter()
            .filter(|entry| eval::matches(entry.value(), &predicates.conditions))
            .count();
        Ok(matched as u64)
    }

    async fn find(&self, id: &str) -> Result<Option<R>, StorageError> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_where(&self, column: &str, value: &str) -> Result<Option<R>, StorageError> {
        let found = self
            .records
            .iter()
            .filter(|entry| {
                entry
                    .value()
                    .field(column)
                    .is_some_and(|field| field.matches_token(value))
            })
            .map(|entry| entry.value().clone())
            .min_by(|a, b| a.id().cmp(b.id()));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::FieldValue;
    use ngopi_core::{OrderBy, Predicate, SortDirection};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        slug: String,
        score: i64,
    }

    impl Item {
        fn new(id: &str, slug: &str, score: i64) -> Self {
            Self { id: id.into(), slug: slug.into(), score }
        }
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, column: &str) -> Option<FieldValue> {
            match column {
                "id" => Some(FieldValue::Str(self.id.clone())),
                "slug" => Some(FieldValue::Str(self.slug.clone())),
                "score" => Some(FieldValue::Int(self.score)),
                _ => None,
            }
        }
    }

    fn source() -> MemoryDataSource<Item> {
        MemoryDataSource::with_records([
            Item::new("i1", "satu", 30),
            Item::new("i2", "dua", 10),
            Item::new("i3", "tiga", 20),
            Item::new("i4", "empat", 40),
        ])
    }

    #[tokio::test]
    async fn select_sorts_then_slices() {
        let source = source();
        let predicates = PredicateSet {
            conditions: vec![],
            order: Some(OrderBy { column: "score", direction: SortDirection::Asc }),
        };
        let rows = source.select(&predicates, 1, 2).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["i3", "i1"]);
    }

    #[tokio::test]
    async fn select_past_the_end_is_empty_not_an_error() {
        let source = source();
        let rows = source.select(&PredicateSet::default(), 100, 10).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn count_ignores_pagination() {
        let source = source();
        let predicates = PredicateSet {
            conditions: vec![Predicate::Range { column: "score", min: Some(20.0), max: None }],
            order: None,
        };
        assert_eq!(source.count(&predicates).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn find_where_returns_first_by_id() {
        let source = source();
        let found = source.find_where("slug", "tiga").await.unwrap().unwrap();
        assert_eq!(found.id, "i3");
        assert!(source.find_where("slug", "lima").await.unwrap().is_none());

        // Duplicate column values resolve to the lowest id.
        source.insert(Item::new("i0", "tiga", 5));
        let found = source.find_where("slug", "tiga").await.unwrap().unwrap();
        assert_eq!(found.id, "i0");
    }

    #[tokio::test]
    async fn update_rewrites_in_one_step() {
        let source = source();
        let updated = source.update("i2", |item| item.score = 99).unwrap();
        assert_eq!(updated.score, 99);
        assert_eq!(source.find("i2").await.unwrap().unwrap().score, 99);
        assert!(source.update("missing", |_| {}).is_none());
    }

    #[test]
    fn retain_drops_failing_records_and_reports_count() {
        let source = source();
        let dropped = source.retain(|item| item.score < 25);
        assert_eq!(dropped, 2);
        assert_eq!(source.len(), 2);
        assert_eq!(source.retain(|_| true), 0);
    }

    #[test]
    fn snapshot_clones_every_record() {
        let source = source();
        let mut slugs: Vec<_> = source
            .snapshot()
            .into_iter()
            .map(|item| item.slug)
            .collect();
        slugs.sort();
        assert_eq!(slugs, vec!["dua", "empat", "satu", "tiga"]);
    }

    #[tokio::test]
    async fn insert_replaces_and_remove_deletes() {
        let source = source();
        let previous = source.insert(Item::new("i1", "satu-baru", 31)).unwrap();
        assert_eq!(previous.slug, "satu");
        assert_eq!(source.len(), 4);

        assert!(source.remove("i1").is_some());
        assert!(source.find("i1").await.unwrap().is_none());
        assert_eq!(source.len(), 3);
    }
}
