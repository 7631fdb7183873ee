use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("chapter name cannot be empty")]
    EmptyChapterName,

    #[error("chapter already exists: {0}")]
    DuplicateChapter(String),

    #[error("chapter not found: {0}")]
    ChapterNotFound(String),
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// A unit of study material with a page count and a binary completion flag.
///
/// Chapter names are unique within their owning subject, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    name: String,
    total_pages: u64,
    is_complete: bool,
}

impl Chapter {
    /// Creates a new, incomplete chapter.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyChapterName` if the name is empty or
    /// whitespace-only.
    pub fn new(name: impl Into<String>, total_pages: u64) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyChapterName);
        }

        Ok(Self {
            name: name.trim().to_owned(),
            total_pages,
            is_complete: false,
        })
    }

    /// Rebuilds a chapter from storage, completion flag included.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyChapterName` if the persisted name is empty.
    pub fn from_persisted(
        name: impl Into<String>,
        total_pages: u64,
        is_complete: bool,
    ) -> Result<Self, SubjectError> {
        let mut chapter = Self::new(name, total_pages)?;
        chapter.is_complete = is_complete;
        Ok(chapter)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A named area of study holding an ordered list of chapters.
///
/// Chapter order is insertion order and is significant for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    name: String,
    chapters: Vec<Chapter>,
    created_at: DateTime<Utc>,
}

impl Subject {
    /// Creates a subject with an empty chapter list.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if the name is empty or
    /// whitespace-only.
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyName);
        }

        Ok(Self {
            name: name.trim().to_owned(),
            chapters: Vec::new(),
            created_at,
        })
    }

    /// Rebuilds a subject from storage with its persisted chapter list.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::DuplicateChapter` if the persisted list holds
    /// two chapters with the same name, or a name validation error.
    pub fn from_persisted(
        name: impl Into<String>,
        chapters: Vec<Chapter>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SubjectError> {
        let mut subject = Self::new(name, created_at)?;
        for chapter in chapters {
            if subject.chapter(chapter.name()).is_some() {
                return Err(SubjectError::DuplicateChapter(chapter.name().to_owned()));
            }
            subject.chapters.push(chapter);
        }
        Ok(subject)
    }

    /// Appends a new, incomplete chapter.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::DuplicateChapter` if a chapter with that name
    /// already exists in this subject, or `SubjectError::EmptyChapterName`
    /// if the name is empty.
    pub fn add_chapter(
        &mut self,
        name: impl Into<String>,
        total_pages: u64,
    ) -> Result<(), SubjectError> {
        let chapter = Chapter::new(name, total_pages)?;
        if self.chapter(chapter.name()).is_some() {
            return Err(SubjectError::DuplicateChapter(chapter.name().to_owned()));
        }
        self.chapters.push(chapter);
        Ok(())
    }

    /// Marks the named chapter complete.
    ///
    /// Completing an already-complete chapter is a no-op; the flag only ever
    /// moves from false to true.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::ChapterNotFound` if no chapter has that name.
    pub fn complete_chapter(&mut self, name: &str) -> Result<(), SubjectError> {
        let name = name.trim();
        let chapter = self
            .chapters
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| SubjectError::ChapterNotFound(name.to_owned()))?;
        chapter.is_complete = true;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter(&self, name: &str) -> Option<&Chapter> {
        let name = name.trim();
        self.chapters.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Completed chapters as a rounded percentage of all chapters.
    ///
    /// A subject with no chapters reports 0.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        percent(
            self.chapters.iter().filter(|c| c.is_complete).count(),
            self.chapters.len(),
        )
    }

    /// Sum of page counts across all chapters.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.chapters.iter().map(Chapter::total_pages).sum()
    }

    /// Sum of page counts across completed chapters.
    #[must_use]
    pub fn pages_complete(&self) -> u64 {
        self.chapters
            .iter()
            .filter(|c| c.is_complete)
            .map(Chapter::total_pages)
            .sum()
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u8
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
