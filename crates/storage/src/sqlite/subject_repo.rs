use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use study_core::model::{Chapter, Subject};

use super::SqliteRepository;
use super::mapping::{map_chapter_row, pages_to_i64, ser};
use crate::repository::{StorageError, SubjectRepository};

#[async_trait::async_trait]
impl SubjectRepository for SqliteRepository {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let res = sqlx::query(
            r"
            INSERT INTO subjects (name, created_at)
            VALUES (?1, ?2)
            ",
        )
        .bind(subject.name())
        .bind(subject.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            _ => StorageError::Connection(e.to_string()),
        })?;

        let subject_id = res.last_insert_rowid();
        insert_chapters(&mut tx, subject_id, subject.chapters()).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn upsert_subject(&self, subject: &Subject) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM subjects WHERE name = ?1")
            .bind(subject.name())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let subject_id = match existing {
            Some(id) => id,
            None => sqlx::query("INSERT INTO subjects (name, created_at) VALUES (?1, ?2)")
                .bind(subject.name())
                .bind(subject.created_at())
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?
                .last_insert_rowid(),
        };

        sqlx::query("DELETE FROM chapters WHERE subject_id = ?1")
            .bind(subject_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        insert_chapters(&mut tx, subject_id, subject.chapters()).await?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_subject(&self, name: &str) -> Result<Option<Subject>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, created_at
            FROM subjects WHERE name = ?1
            ",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => {
                let id: i64 = row.try_get("id").map_err(ser)?;
                let chapters = self.load_chapters(id).await?;
                subject_from_row(&row, chapters).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, created_at
            FROM subjects
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut subjects = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id").map_err(ser)?;
            let chapters = self.load_chapters(id).await?;
            subjects.push(subject_from_row(&row, chapters)?);
        }
        Ok(subjects)
    }
}

impl SqliteRepository {
    async fn load_chapters(&self, subject_id: i64) -> Result<Vec<Chapter>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT name, total_pages, is_complete
            FROM chapters
            WHERE subject_id = ?1
            ORDER BY position ASC
            ",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut chapters = Vec::with_capacity(rows.len());
        for row in rows {
            chapters.push(map_chapter_row(&row)?);
        }
        Ok(chapters)
    }
}

async fn insert_chapters(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    subject_id: i64,
    chapters: &[Chapter],
) -> Result<(), StorageError> {
    for (position, chapter) in chapters.iter().enumerate() {
        let position = i64::try_from(position)
            .map_err(|_| StorageError::Serialization("position overflow".into()))?;
        sqlx::query(
            r"
            INSERT INTO chapters (subject_id, position, name, total_pages, is_complete)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(subject_id)
        .bind(position)
        .bind(chapter.name())
        .bind(pages_to_i64(chapter.total_pages())?)
        .bind(i64::from(chapter.is_complete()))
        .execute(&mut **tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
    }
    Ok(())
}

fn subject_from_row(row: &SqliteRow, chapters: Vec<Chapter>) -> Result<Subject, StorageError> {
    Subject::from_persisted(
        row.try_get::<String, _>("name").map_err(ser)?,
        chapters,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(|e| StorageError::Serialization(e.to_string()))
}
