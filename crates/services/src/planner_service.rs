use std::sync::Arc;

use study_core::StudyDay;
use study_core::model::{ChapterRef, StudyTarget};
use storage::repository::TargetRepository;

use crate::Clock;
use crate::error::PlannerError;

/// Owns the set of study targets, keyed by calendar day.
///
/// The planner stores `(subject, chapter)` name pairs only and never checks
/// them against the catalog; the two stores are deliberately decoupled.
#[derive(Clone)]
pub struct PlannerService {
    clock: Clock,
    targets: Arc<dyn TargetRepository>,
}

impl PlannerService {
    #[must_use]
    pub fn new(clock: Clock, targets: Arc<dyn TargetRepository>) -> Self {
        Self { clock, targets }
    }

    /// The current calendar day according to the planner's clock.
    #[must_use]
    pub fn today(&self) -> StudyDay {
        self.clock.today()
    }

    /// Set or replace the target for a day.
    ///
    /// The stored subject set is derived from the chapter pairs (distinct
    /// subject names in first-appearance order). Replacement is total: the
    /// new target always starts incomplete, even if a completed target
    /// existed for that day.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Target` if a pair has an empty component, or
    /// `PlannerError::Storage` if persistence fails.
    pub async fn set_study_target<S, C>(
        &self,
        day: StudyDay,
        chapters: impl IntoIterator<Item = (S, C)>,
    ) -> Result<StudyTarget, PlannerError>
    where
        S: Into<String>,
        C: Into<String>,
    {
        let mut refs = Vec::new();
        for (subject, chapter) in chapters {
            refs.push(ChapterRef::new(subject, chapter)?);
        }

        let target = StudyTarget::new(day, refs);
        self.targets.upsert_target(&target).await?;
        Ok(target)
    }

    /// Mark the target for a day complete.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::TargetNotFound` if no target exists for that
    /// day, or `PlannerError::Storage` if persistence fails.
    pub async fn complete_study_target(&self, day: StudyDay) -> Result<(), PlannerError> {
        let mut target = self
            .targets
            .get_target(day)
            .await?
            .ok_or(PlannerError::TargetNotFound(day))?;
        target.complete();
        self.targets.upsert_target(&target).await?;
        Ok(())
    }

    /// Fetch the target for a day.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::TargetNotFound` if no target exists for that
    /// day; callers treat this as "no target planned", not a hard failure.
    pub async fn get_study_target(&self, day: StudyDay) -> Result<StudyTarget, PlannerError> {
        self.targets
            .get_target(day)
            .await?
            .ok_or(PlannerError::TargetNotFound(day))
    }

    /// Fetch today's target, with "today" read from the injected clock.
    ///
    /// # Errors
    ///
    /// Same contract as [`PlannerService::get_study_target`].
    pub async fn get_today_target(&self) -> Result<StudyTarget, PlannerError> {
        self.get_study_target(self.today()).await
    }

    /// All targets with `start <= day <= end`, ascending by day.
    ///
    /// An inverted range yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Storage` if repository access fails.
    pub async fn get_study_targets_in_range(
        &self,
        start: StudyDay,
        end: StudyDay,
    ) -> Result<Vec<StudyTarget>, PlannerError> {
        let targets = self.targets.list_targets_in_range(start, end).await?;
        Ok(targets)
    }
}
