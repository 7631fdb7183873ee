use std::sync::Arc;

use study_core::model::Subject;
use storage::repository::{StorageError, SubjectRepository};

use crate::Clock;
use crate::error::CatalogError;

/// Owns the set of subjects and their chapters.
///
/// Every mutation loads the subject aggregate, applies the domain rule, and
/// writes the whole aggregate back; the repository serializes writes, so no
/// call observes a partially-applied mutation.
#[derive(Clone)]
pub struct CatalogService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(clock: Clock, subjects: Arc<dyn SubjectRepository>) -> Self {
        Self { clock, subjects }
    }

    /// Create a subject with an empty chapter list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateSubject` if the name is taken,
    /// `CatalogError::Subject` for validation failures, or
    /// `CatalogError::Storage` if persistence fails.
    pub async fn add_subject(&self, name: &str) -> Result<(), CatalogError> {
        let subject = Subject::new(name, self.clock.now())?;
        match self.subjects.insert_subject(&subject).await {
            Ok(()) => Ok(()),
            Err(StorageError::Conflict) => {
                Err(CatalogError::DuplicateSubject(subject.name().to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append a new, incomplete chapter to the named subject.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SubjectNotFound` if the subject is unknown,
    /// `CatalogError::Subject` for a duplicate or empty chapter name, or
    /// `CatalogError::Storage` if persistence fails.
    pub async fn add_chapter(
        &self,
        subject_name: &str,
        chapter_name: &str,
        total_pages: u64,
    ) -> Result<(), CatalogError> {
        let mut subject = self.fetch(subject_name).await?;
        subject.add_chapter(chapter_name, total_pages)?;
        self.subjects.upsert_subject(&subject).await?;
        Ok(())
    }

    /// Mark the named chapter complete.
    ///
    /// Completing an already-complete chapter is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SubjectNotFound` / `CatalogError::Subject`
    /// (chapter not found) as applicable, or `CatalogError::Storage` if
    /// persistence fails.
    pub async fn complete_chapter(
        &self,
        subject_name: &str,
        chapter_name: &str,
    ) -> Result<(), CatalogError> {
        let mut subject = self.fetch(subject_name).await?;
        subject.complete_chapter(chapter_name)?;
        self.subjects.upsert_subject(&subject).await?;
        Ok(())
    }

    /// All subjects in creation order, chapters in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_all_subjects(&self) -> Result<Vec<Subject>, CatalogError> {
        let subjects = self.subjects.list_subjects().await?;
        Ok(subjects)
    }

    /// Fetch one subject by name.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::SubjectNotFound` if the subject does not exist,
    /// or `CatalogError::Storage` if repository access fails.
    pub async fn get_subject(&self, name: &str) -> Result<Subject, CatalogError> {
        self.fetch(name).await
    }

    async fn fetch(&self, name: &str) -> Result<Subject, CatalogError> {
        let name = name.trim();
        self.subjects
            .get_subject(name)
            .await?
            .ok_or_else(|| CatalogError::SubjectNotFound(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use study_core::model::SubjectError;
    use study_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> CatalogService {
        CatalogService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn add_subject_twice_fails_with_duplicate() {
        let catalog = service();
        catalog.add_subject("Math").await.unwrap();

        let err = catalog.add_subject("Math").await.unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSubject(name) if name == "Math"));
    }

    #[tokio::test]
    async fn duplicate_chapter_leaves_first_intact() {
        let catalog = service();
        catalog.add_subject("Math").await.unwrap();
        catalog.add_chapter("Math", "Ch1", 50).await.unwrap();

        let err = catalog.add_chapter("Math", "Ch1", 30).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Subject(SubjectError::DuplicateChapter(name)) if name == "Ch1"
        ));

        let math = catalog.get_subject("Math").await.unwrap();
        assert_eq!(math.chapters().len(), 1);
        assert_eq!(math.chapter("Ch1").unwrap().total_pages(), 50);
    }

    #[tokio::test]
    async fn add_chapter_to_unknown_subject_fails() {
        let catalog = service();
        let err = catalog.add_chapter("Math", "Ch1", 50).await.unwrap_err();
        assert!(matches!(err, CatalogError::SubjectNotFound(name) if name == "Math"));
    }

    #[tokio::test]
    async fn complete_chapter_twice_is_a_no_op() {
        let catalog = service();
        catalog.add_subject("Math").await.unwrap();
        catalog.add_chapter("Math", "Ch1", 50).await.unwrap();

        catalog.complete_chapter("Math", "Ch1").await.unwrap();
        catalog.complete_chapter("Math", "Ch1").await.unwrap();

        let math = catalog.get_subject("Math").await.unwrap();
        assert!(math.chapter("Ch1").unwrap().is_complete());
    }

    #[tokio::test]
    async fn complete_unknown_chapter_fails() {
        let catalog = service();
        catalog.add_subject("Math").await.unwrap();

        let err = catalog.complete_chapter("Math", "Ch9").await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Subject(SubjectError::ChapterNotFound(name)) if name == "Ch9"
        ));
    }

    #[tokio::test]
    async fn subjects_list_in_creation_order() {
        let catalog = service();
        catalog.add_subject("Physics").await.unwrap();
        catalog.add_subject("Math").await.unwrap();
        catalog.add_subject("History").await.unwrap();

        let names: Vec<String> = catalog
            .get_all_subjects()
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().to_owned())
            .collect();
        assert_eq!(names, vec!["Physics", "Math", "History"]);
    }

    #[tokio::test]
    async fn get_unknown_subject_fails() {
        let catalog = service();
        let err = catalog.get_subject("Chemistry").await.unwrap_err();
        assert!(matches!(err, CatalogError::SubjectNotFound(name) if name == "Chemistry"));
    }
}
