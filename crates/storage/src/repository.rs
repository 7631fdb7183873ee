use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use study_core::StudyDay;
use study_core::model::{StudyTarget, Subject};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the subject catalog.
///
/// Subjects are keyed by name; each write replaces the whole aggregate
/// (subject row plus chapter list) atomically.
#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// Persist a brand-new subject.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a subject with that name already
    /// exists, or other storage errors.
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Persist or replace a subject, chapter list included.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the subject cannot be stored.
    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError>;

    /// Fetch a subject by name.
    ///
    /// Returns `Ok(None)` when the subject does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_subject(&self, name: &str) -> Result<Option<Subject>, StorageError>;

    /// All subjects in creation order, chapters in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError>;
}

/// Repository contract for study targets, keyed by calendar day.
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// Persist or replace the target for its day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the target cannot be stored.
    async fn upsert_target(&self, target: &StudyTarget) -> Result<(), StorageError>;

    /// Fetch the target for a day.
    ///
    /// Returns `Ok(None)` when no target exists for that day.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn get_target(&self, day: StudyDay) -> Result<Option<StudyTarget>, StorageError>;

    /// Targets with `start <= day <= end`, ascending by day.
    ///
    /// `start > end` yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list_targets_in_range(
        &self,
        start: StudyDay,
        end: StudyDay,
    ) -> Result<Vec<StudyTarget>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
///
/// Writes serialize through the mutexes, so no reader observes a
/// partially-applied mutation.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    subjects: Arc<Mutex<Vec<Subject>>>,
    targets: Arc<Mutex<BTreeMap<StudyDay, StudyTarget>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subjects: Arc::new(Mutex::new(Vec::new())),
            targets: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

#[async_trait]
impl SubjectRepository for InMemoryRepository {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        if guard.iter().any(|s| s.name() == subject.name()) {
            return Err(StorageError::Conflict);
        }
        guard.push(subject.clone());
        Ok(())
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|s| s.name() == subject.name()) {
            Some(slot) => *slot = subject.clone(),
            None => guard.push(subject.clone()),
        }
        Ok(())
    }

    async fn get_subject(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.iter().find(|s| s.name() == name).cloned())
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let guard = self
            .subjects
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }
}

#[async_trait]
impl TargetRepository for InMemoryRepository {
    async fn upsert_target(&self, target: &StudyTarget) -> Result<(), StorageError> {
        let mut guard = self
            .targets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(target.date(), target.clone());
        Ok(())
    }

    async fn get_target(&self, day: StudyDay) -> Result<Option<StudyTarget>, StorageError> {
        let guard = self
            .targets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&day).cloned())
    }

    async fn list_targets_in_range(
        &self,
        start: StudyDay,
        end: StudyDay,
    ) -> Result<Vec<StudyTarget>, StorageError> {
        if start > end {
            return Ok(Vec::new());
        }
        let guard = self
            .targets
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.range(start..=end).map(|(_, t)| t.clone()).collect())
    }
}

/// Aggregates subject and target repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub subjects: Arc<dyn SubjectRepository>,
    pub targets: Arc<dyn TargetRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let subjects: Arc<dyn SubjectRepository> = Arc::new(repo.clone());
        let targets: Arc<dyn TargetRepository> = Arc::new(repo);
        Self { subjects, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::ChapterRef;
    use study_core::time::{fixed_clock, fixed_now};

    fn build_subject(name: &str) -> Subject {
        let mut subject = Subject::new(name, fixed_now()).unwrap();
        subject.add_chapter("Ch1", 50).unwrap();
        subject
    }

    fn build_target(day: StudyDay) -> StudyTarget {
        StudyTarget::new(day, vec![ChapterRef::new("Math", "Ch1").unwrap()])
    }

    #[tokio::test]
    async fn insert_subject_rejects_duplicate_name() {
        let repo = InMemoryRepository::new();
        repo.insert_subject(&build_subject("Math")).await.unwrap();

        let err = repo.insert_subject(&build_subject("Math")).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));

        // the stored subject is untouched by the failed insert
        let stored = repo.get_subject("Math").await.unwrap().unwrap();
        assert_eq!(stored.chapters().len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_subject_in_place() {
        let repo = InMemoryRepository::new();
        repo.insert_subject(&build_subject("Math")).await.unwrap();
        repo.insert_subject(&build_subject("Physics")).await.unwrap();

        let mut math = repo.get_subject("Math").await.unwrap().unwrap();
        math.complete_chapter("Ch1").unwrap();
        repo.upsert_subject(&math).await.unwrap();

        let names: Vec<String> = repo
            .list_subjects()
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().to_owned())
            .collect();
        // creation order survives the upsert
        assert_eq!(names, vec!["Math", "Physics"]);
        assert!(repo
            .get_subject("Math")
            .await
            .unwrap()
            .unwrap()
            .chapter("Ch1")
            .unwrap()
            .is_complete());
    }

    #[tokio::test]
    async fn target_round_trips_by_day() {
        let repo = InMemoryRepository::new();
        let day = fixed_clock().today();

        repo.upsert_target(&build_target(day)).await.unwrap();

        let stored = repo.get_target(day).await.unwrap().unwrap();
        assert_eq!(stored.date(), day);
        assert!(!stored.is_complete());
        assert!(repo.get_target(day.plus_days(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn range_is_inclusive_and_sorted() {
        let repo = InMemoryRepository::new();
        let day0 = fixed_clock().today();

        for offset in [3, 0, 1, 5] {
            repo.upsert_target(&build_target(day0.plus_days(offset)))
                .await
                .unwrap();
        }

        let days: Vec<StudyDay> = repo
            .list_targets_in_range(day0, day0.plus_days(3))
            .await
            .unwrap()
            .iter()
            .map(StudyTarget::date)
            .collect();
        assert_eq!(days, vec![day0, day0.plus_days(1), day0.plus_days(3)]);
    }

    #[tokio::test]
    async fn inverted_range_is_empty() {
        let repo = InMemoryRepository::new();
        let day0 = fixed_clock().today();
        repo.upsert_target(&build_target(day0)).await.unwrap();

        let found = repo
            .list_targets_in_range(day0.plus_days(1), day0)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
