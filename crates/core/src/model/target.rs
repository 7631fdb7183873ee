use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::day::StudyDay;
use crate::model::subject::{Chapter, Subject, percent};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetError {
    #[error("chapter reference needs a subject name")]
    EmptySubjectName,

    #[error("chapter reference needs a chapter name")]
    EmptyChapterName,
}

//
// ─── CHAPTER REFERENCE ─────────────────────────────────────────────────────────
//

/// A by-name reference to a chapter in the catalog.
///
/// The planner stores no chapter data of its own, only these pairs. Nothing
/// here guarantees the referenced chapter exists; the catalog and the planner
/// are deliberately decoupled stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRef {
    subject: String,
    chapter: String,
}

impl ChapterRef {
    /// Creates a reference from a `(subject, chapter)` name pair.
    ///
    /// # Errors
    ///
    /// Returns a `TargetError` if either component is empty or
    /// whitespace-only.
    pub fn new(subject: impl Into<String>, chapter: impl Into<String>) -> Result<Self, TargetError> {
        let subject = subject.into();
        let chapter = chapter.into();
        if subject.trim().is_empty() {
            return Err(TargetError::EmptySubjectName);
        }
        if chapter.trim().is_empty() {
            return Err(TargetError::EmptyChapterName);
        }

        Ok(Self {
            subject: subject.trim().to_owned(),
            chapter: chapter.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn chapter(&self) -> &str {
        &self.chapter
    }
}

//
// ─── STUDY TARGET ──────────────────────────────────────────────────────────────
//

/// A per-calendar-day study plan.
///
/// The subject list is always derived from the chapter references: the
/// distinct subject names in first-appearance order. Duplicate chapter
/// references are allowed and preserved in caller order.
///
/// `is_complete` is an explicit flag, moved by [`StudyTarget::complete`]
/// only. It is never derived from catalog chapter state; live progress
/// against the catalog is a separate, computed view
/// ([`StudyTarget::progress_percent`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyTarget {
    date: StudyDay,
    subjects: Vec<String>,
    chapters: Vec<ChapterRef>,
    is_complete: bool,
}

impl StudyTarget {
    /// Creates a fresh, incomplete target for the given day.
    #[must_use]
    pub fn new(date: StudyDay, chapters: Vec<ChapterRef>) -> Self {
        let subjects = distinct_subjects(&chapters);
        Self {
            date,
            subjects,
            chapters,
            is_complete: false,
        }
    }

    /// Rebuilds a target from storage, completion flag included.
    #[must_use]
    pub fn from_persisted(date: StudyDay, chapters: Vec<ChapterRef>, is_complete: bool) -> Self {
        let mut target = Self::new(date, chapters);
        target.is_complete = is_complete;
        target
    }

    #[must_use]
    pub fn date(&self) -> StudyDay {
        self.date
    }

    /// Distinct subject names referenced by this target, in first-appearance
    /// order.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    #[must_use]
    pub fn chapters(&self) -> &[ChapterRef] {
        &self.chapters
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Marks the target complete. One-way; there is no un-complete, only
    /// replacement with a fresh target for the same day.
    pub fn complete(&mut self) {
        self.is_complete = true;
    }

    /// Rounded percentage of chapter references whose catalog chapter is
    /// complete.
    ///
    /// References that resolve to no catalog chapter count as incomplete. An
    /// empty target reports 0.
    #[must_use]
    pub fn progress_percent(&self, catalog: &[Subject]) -> u8 {
        let done = self
            .chapters
            .iter()
            .filter(|r| {
                catalog
                    .iter()
                    .find(|s| s.name() == r.subject())
                    .and_then(|s| s.chapter(r.chapter()))
                    .is_some_and(Chapter::is_complete)
            })
            .count();
        percent(done, self.chapters.len())
    }
}

fn distinct_subjects(chapters: &[ChapterRef]) -> Vec<String> {
    let mut subjects: Vec<String> = Vec::new();
    for r in chapters {
        if !subjects.iter().any(|s| s == r.subject()) {
            subjects.push(r.subject().to_owned());
        }
    }
    subjects
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
