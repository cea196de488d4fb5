use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A dog registered to an account. Sires and dams are both dogs.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Dog {
    pub id: Uuid,
    pub owner_id: Uuid, // Account that owns the dog
    pub name: String,
    pub breed: Option<String>,
    pub color: Option<String>, // Visual coat color, free text
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDog {
    pub owner_id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub color: Option<String>,
}

impl Dog {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }

    pub async fn create(pool: &SqlitePool, data: &CreateDog, id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Dog>(
            r#"INSERT INTO dogs (id, owner_id, name, breed, color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, breed, color, created_at, updated_at"#,
        )
        .bind(id)
        .bind(data.owner_id)
        .bind(&data.name)
        .bind(&data.breed)
        .bind(&data.color)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Dog>(
            r#"SELECT id, owner_id, name, breed, color, created_at, updated_at
            FROM dogs
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    #[tokio::test]
    async fn create_and_find_dog() {
        let db = DBService::new_in_memory().await.unwrap();
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();

        let created = Dog::create(
            &db.pool,
            &CreateDog {
                owner_id: owner,
                name: "Biscuit".to_string(),
                breed: Some("French Bulldog".to_string()),
                color: Some("Fawn".to_string()),
            },
            id,
        )
        .await
        .unwrap();
        assert_eq!(created.id, id);
        assert!(created.is_owned_by(owner));
        assert!(!created.is_owned_by(Uuid::new_v4()));

        let found = Dog::find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(found.name, "Biscuit");
        assert_eq!(found.color.as_deref(), Some("Fawn"));

        assert!(Dog::find_by_id(&db.pool, Uuid::new_v4()).await.unwrap().is_none());
    }
}
