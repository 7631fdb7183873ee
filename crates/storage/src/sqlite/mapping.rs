use sqlx::Row;

use study_core::model::{Chapter, ChapterRef};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn pages_to_i64(pages: u64) -> Result<i64, StorageError> {
    i64::try_from(pages).map_err(|_| StorageError::Serialization("total_pages overflow".into()))
}

pub(crate) fn pages_from_i64(v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid total_pages: {v}")))
}

pub(crate) fn flag_from_i64(field: &'static str, v: i64) -> Result<bool, StorageError> {
    match v {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::Serialization(format!(
            "invalid {field}: {other}"
        ))),
    }
}

pub(crate) fn map_chapter_row(row: &sqlx::sqlite::SqliteRow) -> Result<Chapter, StorageError> {
    let name: String = row.try_get("name").map_err(ser)?;
    let total_pages = pages_from_i64(row.try_get::<i64, _>("total_pages").map_err(ser)?)?;
    let is_complete = flag_from_i64(
        "is_complete",
        row.try_get::<i64, _>("is_complete").map_err(ser)?,
    )?;

    Chapter::from_persisted(name, total_pages, is_complete).map_err(ser)
}

pub(crate) fn map_ref_row(row: &sqlx::sqlite::SqliteRow) -> Result<ChapterRef, StorageError> {
    let subject: String = row.try_get("subject_name").map_err(ser)?;
    let chapter: String = row.try_get("chapter_name").map_err(ser)?;

    ChapterRef::new(subject, chapter).map_err(ser)
}
