use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// Severity of a health risk. Ordered so that `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, TS, EnumString, Display,
)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Share of a litter expected to show a given coat color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
pub struct ColorPrediction {
    pub color: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
pub struct HealthRisk {
    pub condition: String,
    pub risk: RiskLevel,
    pub description: String,
}

/// A saved compatibility calculation
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CompatibilityReport {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub sire_id: Uuid,
    pub dam_id: Uuid,
    pub breeding_program_id: Option<Uuid>,
    pub score: i32,
    pub coi: f64,
    pub color_predictions: String, // JSON-serialized Vec<ColorPrediction>
    pub health_risks: String,      // JSON-serialized Vec<HealthRisk>
    pub recommendation: String,
    pub ai_enhanced: bool,
    pub created_at: DateTime<Utc>,
}

impl CompatibilityReport {
    pub fn parsed_color_predictions(&self) -> Vec<ColorPrediction> {
        serde_json::from_str(&self.color_predictions).unwrap_or_default()
    }

    pub fn parsed_health_risks(&self) -> Vec<HealthRisk> {
        serde_json::from_str(&self.health_risks).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCompatibilityReport {
    pub requested_by: Uuid,
    pub sire_id: Uuid,
    pub dam_id: Uuid,
    pub breeding_program_id: Option<Uuid>,
    pub score: u8,
    pub coi: f64,
    pub color_predictions: Vec<ColorPrediction>,
    pub health_risks: Vec<HealthRisk>,
    pub recommendation: String,
    pub ai_enhanced: bool,
}

/// API view of a saved report with its JSON columns expanded
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReportView {
    pub id: Uuid,
    pub sire_id: Uuid,
    pub dam_id: Uuid,
    pub breeding_program_id: Option<Uuid>,
    pub score: i32,
    pub coi: f64,
    pub color_predictions: Vec<ColorPrediction>,
    pub health_risks: Vec<HealthRisk>,
    pub recommendation: String,
    pub ai_enhanced: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CompatibilityReport> for CompatibilityReportView {
    fn from(report: CompatibilityReport) -> Self {
        Self {
            color_predictions: report.parsed_color_predictions(),
            health_risks: report.parsed_health_risks(),
            id: report.id,
            sire_id: report.sire_id,
            dam_id: report.dam_id,
            breeding_program_id: report.breeding_program_id,
            score: report.score,
            coi: report.coi,
            recommendation: report.recommendation,
            ai_enhanced: report.ai_enhanced,
            created_at: report.created_at,
        }
    }
}

const REPORT_COLUMNS: &str = "id, requested_by, sire_id, dam_id, breeding_program_id, score, coi, \
     color_predictions, health_risks, recommendation, ai_enhanced, created_at";

impl CompatibilityReport {
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCompatibilityReport,
        id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let color_predictions = serde_json::to_string(&data.color_predictions)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        let health_risks = serde_json::to_string(&data.health_risks)
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

        sqlx::query_as::<_, CompatibilityReport>(&format!(
            r#"INSERT INTO compatibility_reports
                (id, requested_by, sire_id, dam_id, breeding_program_id, score, coi,
                 color_predictions, health_risks, recommendation, ai_enhanced)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {REPORT_COLUMNS}"#
        ))
        .bind(id)
        .bind(data.requested_by)
        .bind(data.sire_id)
        .bind(data.dam_id)
        .bind(data.breeding_program_id)
        .bind(i32::from(data.score))
        .bind(data.coi)
        .bind(color_predictions)
        .bind(health_risks)
        .bind(&data.recommendation)
        .bind(data.ai_enhanced)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CompatibilityReport>(&format!(
            "SELECT {REPORT_COLUMNS} FROM compatibility_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Reports requested by an account, newest first. With `dog_id`, only
    /// reports where that dog is the sire or the dam.
    pub async fn find_by_requester(
        pool: &SqlitePool,
        requested_by: Uuid,
        dog_id: Option<Uuid>,
        limit: i32,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match dog_id {
            Some(dog_id) => {
                sqlx::query_as::<_, CompatibilityReport>(&format!(
                    r#"SELECT {REPORT_COLUMNS}
                    FROM compatibility_reports
                    WHERE requested_by = $1 AND (sire_id = $2 OR dam_id = $3)
                    ORDER BY created_at DESC
                    LIMIT $4"#
                ))
                .bind(requested_by)
                .bind(dog_id)
                .bind(dog_id)
                .bind(limit)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, CompatibilityReport>(&format!(
                    r#"SELECT {REPORT_COLUMNS}
                    FROM compatibility_reports
                    WHERE requested_by = $1
                    ORDER BY created_at DESC
                    LIMIT $2"#
                ))
                .bind(requested_by)
                .bind(limit)
                .fetch_all(pool)
                .await
            }
        }
    }
}
