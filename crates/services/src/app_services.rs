use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::planner_service::PlannerService;

/// Assembles the catalog and planner over a shared storage handle.
///
/// The caller owns construction and teardown; services hold `Arc` handles to
/// the repositories, never module-level globals.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    planner: Arc<PlannerService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    /// Build services over in-memory storage, for tests and prototyping.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    fn from_storage(storage: &Storage, clock: Clock) -> Self {
        let catalog = Arc::new(CatalogService::new(clock, Arc::clone(&storage.subjects)));
        let planner = Arc::new(PlannerService::new(clock, Arc::clone(&storage.targets)));
        Self { catalog, planner }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn planner(&self) -> Arc<PlannerService> {
        Arc::clone(&self.planner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::time::fixed_clock;

    #[tokio::test]
    async fn catalog_and_planner_share_a_store() {
        let services = AppServices::in_memory(fixed_clock());
        let catalog = services.catalog();
        let planner = services.planner();

        catalog.add_subject("Math").await.unwrap();
        catalog.add_chapter("Math", "Ch1", 50).await.unwrap();
        catalog.complete_chapter("Math", "Ch1").await.unwrap();

        let target = planner
            .set_study_target(planner.today(), [("Math", "Ch1"), ("Math", "Ch2")])
            .await
            .unwrap();

        // display progress is computed from live catalog state, not from the
        // target's own completion flag
        let subjects = catalog.get_all_subjects().await.unwrap();
        assert_eq!(target.progress_percent(&subjects), 50);
        assert!(!target.is_complete());
    }
}
