//! Narrow view of the kennel database used by the compatibility service.

use async_trait::async_trait;
use db::models::{
    breeding_program::BreedingProgram,
    compatibility_report::{CompatibilityReport, CreateCompatibilityReport},
    dna_test::DnaTest,
    dog::Dog,
};
use sqlx::SqlitePool;
use uuid::Uuid;

#[async_trait]
pub trait BreedingRecordStore: Send + Sync {
    async fn find_dog(&self, id: Uuid) -> Result<Option<Dog>, sqlx::Error>;

    async fn dna_tests(&self, dog_id: Uuid) -> Result<Vec<DnaTest>, sqlx::Error>;

    async fn find_program(&self, id: Uuid) -> Result<Option<BreedingProgram>, sqlx::Error>;

    async fn save_report(
        &self,
        report: &CreateCompatibilityReport,
    ) -> Result<CompatibilityReport, sqlx::Error>;

    async fn find_report(&self, id: Uuid) -> Result<Option<CompatibilityReport>, sqlx::Error>;

    async fn reports_for(
        &self,
        requested_by: Uuid,
        dog_id: Option<Uuid>,
        limit: i32,
    ) -> Result<Vec<CompatibilityReport>, sqlx::Error>;
}

/// Record store backed by the application's SQLite pool
#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BreedingRecordStore for SqliteRecordStore {
    async fn find_dog(&self, id: Uuid) -> Result<Option<Dog>, sqlx::Error> {
        Dog::find_by_id(&self.pool, id).await
    }

    async fn dna_tests(&self, dog_id: Uuid) -> Result<Vec<DnaTest>, sqlx::Error> {
        DnaTest::find_by_dog_id(&self.pool, dog_id).await
    }

    async fn find_program(&self, id: Uuid) -> Result<Option<BreedingProgram>, sqlx::Error> {
        BreedingProgram::find_by_id(&self.pool, id).await
    }

    async fn save_report(
        &self,
        report: &CreateCompatibilityReport,
    ) -> Result<CompatibilityReport, sqlx::Error> {
        CompatibilityReport::create(&self.pool, report, Uuid::new_v4()).await
    }

    async fn find_report(&self, id: Uuid) -> Result<Option<CompatibilityReport>, sqlx::Error> {
        CompatibilityReport::find_by_id(&self.pool, id).await
    }

    async fn reports_for(
        &self,
        requested_by: Uuid,
        dog_id: Option<Uuid>,
        limit: i32,
    ) -> Result<Vec<CompatibilityReport>, sqlx::Error> {
        CompatibilityReport::find_by_requester(&self.pool, requested_by, dog_id, limit).await
    }
}
