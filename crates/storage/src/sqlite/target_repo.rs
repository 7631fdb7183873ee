use sqlx::Row;

use study_core::StudyDay;
use study_core::model::{ChapterRef, StudyTarget};

use super::SqliteRepository;
use super::mapping::{flag_from_i64, map_ref_row, ser};
use crate::repository::{StorageError, TargetRepository};

#[async_trait::async_trait]
impl TargetRepository for SqliteRepository {
    async fn upsert_target(&self, target: &StudyTarget) -> Result<(), StorageError> {
        let day = target.date().date();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO study_targets (day, is_complete)
            VALUES (?1, ?2)
            ON CONFLICT(day) DO UPDATE SET
                is_complete = excluded.is_complete
            ",
        )
        .bind(day)
        .bind(i64::from(target.is_complete()))
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("DELETE FROM target_chapters WHERE target_day = ?1")
            .bind(day)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for (position, chapter) in target.chapters().iter().enumerate() {
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO target_chapters (target_day, position, subject_name, chapter_name)
                VALUES (?1, ?2, ?3, ?4)
                ",
            )
            .bind(day)
            .bind(position)
            .bind(chapter.subject())
            .bind(chapter.chapter())
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_target(&self, day: StudyDay) -> Result<Option<StudyTarget>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT day, is_complete
            FROM study_targets WHERE day = ?1
            ",
        )
        .bind(day.date())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => {
                let is_complete = flag_from_i64(
                    "is_complete",
                    row.try_get::<i64, _>("is_complete").map_err(ser)?,
                )?;
                let chapters = self.load_refs(day).await?;
                Ok(Some(StudyTarget::from_persisted(day, chapters, is_complete)))
            }
            None => Ok(None),
        }
    }

    async fn list_targets_in_range(
        &self,
        start: StudyDay,
        end: StudyDay,
    ) -> Result<Vec<StudyTarget>, StorageError> {
        if start > end {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r"
            SELECT day, is_complete
            FROM study_targets
            WHERE day BETWEEN ?1 AND ?2
            ORDER BY day ASC
            ",
        )
        .bind(start.date())
        .bind(end.date())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut targets = Vec::with_capacity(rows.len());
        for row in rows {
            let day = StudyDay::new(row.try_get("day").map_err(ser)?);
            let is_complete = flag_from_i64(
                "is_complete",
                row.try_get::<i64, _>("is_complete").map_err(ser)?,
            )?;
            let chapters = self.load_refs(day).await?;
            targets.push(StudyTarget::from_persisted(day, chapters, is_complete));
        }
        Ok(targets)
    }
}

impl SqliteRepository {
    async fn load_refs(&self, day: StudyDay) -> Result<Vec<ChapterRef>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT subject_name, chapter_name
            FROM target_chapters
            WHERE target_day = ?1
            ORDER BY position ASC
            ",
        )
        .bind(day.date())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut refs = Vec::with_capacity(rows.len());
        for row in rows {
            refs.push(map_ref_row(&row)?);
        }
        Ok(refs)
    }
}
