use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A breeding program; its color focus is the target color for pairings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct BreedingProgram {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub color_focus: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateBreedingProgram {
    pub owner_id: Uuid,
    pub name: String,
    pub color_focus: Option<String>,
}

impl BreedingProgram {
    /// The program's target color, if it names a non-blank one
    pub fn target_color(&self) -> Option<&str> {
        self.color_focus
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateBreedingProgram,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, BreedingProgram>(
            r#"INSERT INTO breeding_programs (id, owner_id, name, color_focus)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, color_focus, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.color_focus)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BreedingProgram>(
            r#"SELECT id, owner_id, name, color_focus, created_at, updated_at
            FROM breeding_programs
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
