//! Breeding compatibility: scoring a sire/dam pairing and the request flow
//! around it (lookup, ownership, narrative, persistence).

use std::sync::Arc;

use db::models::{
    breeding_program::BreedingProgram,
    compatibility_report::{
        ColorPrediction, CompatibilityReportView, CreateCompatibilityReport, HealthRisk, RiskLevel,
    },
    dog::Dog,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    color_genetics, health_risk, inbreeding,
    dog_profile::DogProfile,
    narrative::{NarrativeEnhancer, NarrativeRequest},
    record_store::BreedingRecordStore,
};

const BASE_SCORE: f64 = 70.0;
const MISSING_TARGET_COLOR_PENALTY: f64 = 5.0;
const REPORT_LIST_LIMIT: i32 = 50;

#[derive(Debug, Error)]
pub enum CompatibilityError {
    #[error("Both sireId and damId are required")]
    MissingParents,
    #[error("Sire not found")]
    SireNotFound,
    #[error("Dam not found")]
    DamNotFound,
    #[error("You must own at least one of the dogs")]
    NotOwner,
    #[error("Report not found")]
    ReportNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationTier {
    Excellent,
    Good,
    Moderate,
    Fair,
    NotRecommended,
}

impl RecommendationTier {
    pub fn for_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            70..=79 => Self::Good,
            60..=69 => Self::Moderate,
            50..=59 => Self::Fair,
            _ => Self::NotRecommended,
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            Self::Excellent => {
                "Excellent match! This pairing shows strong compatibility with low health risks and good genetic diversity."
            }
            Self::Good => {
                "Good match. This pairing is compatible with manageable health considerations. Review the listed health risks before proceeding."
            }
            Self::Moderate => {
                "Moderate match. Consider additional DNA health testing of both dogs before breeding to better understand the risks."
            }
            Self::Fair => {
                "Fair match. Several concerns were identified. Comprehensive health testing is strongly recommended before proceeding."
            }
            Self::NotRecommended => {
                "Not recommended. This pairing presents significant health or genetic concerns. Consider alternative matches."
            }
        }
    }
}

/// Scorer output before any narrative enhancement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub score: u8,
    pub tier: RecommendationTier,
}

impl Score {
    pub fn recommendation(&self) -> &'static str {
        self.tier.template()
    }
}

fn risk_penalty(risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::High => 10.0,
        RiskLevel::Medium => 5.0,
        RiskLevel::Low => 1.0,
    }
}

fn coi_adjustment(coi: f64) -> f64 {
    if coi < 5.0 {
        10.0
    } else if coi < 10.0 {
        5.0
    } else {
        -(coi - 10.0) * 2.0
    }
}

/// Combine predictions, risks and COI into a 0-100 score and its tier.
///
/// With a target color, a matching prediction (case-insensitive) adds a
/// tenth of its percentage; no match costs five points.
pub fn score(
    color_predictions: &[ColorPrediction],
    health_risks: &[HealthRisk],
    coi: f64,
    target_color: Option<&str>,
) -> Score {
    let mut total = BASE_SCORE;
    total -= health_risks
        .iter()
        .map(|risk| risk_penalty(risk.risk))
        .sum::<f64>();
    total += coi_adjustment(coi);

    if let Some(target) = target_color {
        let target = target.trim().to_lowercase();
        match color_predictions
            .iter()
            .find(|prediction| prediction.color.to_lowercase() == target)
        {
            Some(prediction) => total += f64::from(prediction.percentage) / 10.0,
            None => total -= MISSING_TARGET_COLOR_PENALTY,
        }
    }

    let score = total.clamp(0.0, 100.0).round() as u8;
    Score {
        score,
        tier: RecommendationTier::for_score(score),
    }
}

/// Full result of the calculator for one pairing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityAssessment {
    pub score: u8,
    pub color_predictions: Vec<ColorPrediction>,
    pub health_risks: Vec<HealthRisk>,
    pub coi: f64,
    pub recommendation: String,
    pub ai_enhanced: bool,
}

/// Run predictor, risk assessor, COI estimate and scorer for a pairing.
pub fn assess_pairing<R: Rng>(
    sire: &DogProfile,
    dam: &DogProfile,
    target_color: Option<&str>,
    rng: &mut R,
) -> CompatibilityAssessment {
    let color_predictions = color_genetics::predict(sire.color(), dam.color());
    let health_risks = health_risk::assess(sire, dam, rng);
    let coi = inbreeding::estimate(sire, dam, rng);
    let scored = score(&color_predictions, &health_risks, coi, target_color);

    CompatibilityAssessment {
        score: scored.score,
        color_predictions,
        health_risks,
        coi,
        recommendation: scored.recommendation().to_string(),
        ai_enhanced: false,
    }
}

/// Request body for a compatibility check
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    #[serde(default)]
    pub sire_id: Option<String>,
    #[serde(default)]
    pub dam_id: Option<String>,
    #[serde(default)]
    pub breeding_program_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ParentSummary {
    pub id: Uuid,
    pub name: String,
    pub breed: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "hasDNA")]
    pub has_dna: bool,
}

impl From<&DogProfile> for ParentSummary {
    fn from(profile: &DogProfile) -> Self {
        Self {
            id: profile.dog.id,
            name: profile.dog.name.clone(),
            breed: profile.dog.breed.clone(),
            color: profile.dog.color.clone(),
            has_dna: profile.has_dna(),
        }
    }
}

/// Response for a compatibility check
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResponse {
    pub sire: ParentSummary,
    pub dam: ParentSummary,
    #[serde(flatten)]
    pub assessment: CompatibilityAssessment,
    /// Id of the saved report; absent if saving failed
    pub report_id: Option<Uuid>,
}

fn required_id(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|id| !id.is_empty())
}

/// Runs compatibility checks against the record store
pub struct BreedingCompatibilityService {
    store: Arc<dyn BreedingRecordStore>,
    narrative: Arc<dyn NarrativeEnhancer>,
}

impl BreedingCompatibilityService {
    pub fn new(store: Arc<dyn BreedingRecordStore>, narrative: Arc<dyn NarrativeEnhancer>) -> Self {
        Self { store, narrative }
    }

    pub async fn evaluate(
        &self,
        caller: Uuid,
        request: &CompatibilityRequest,
    ) -> Result<CompatibilityResponse, CompatibilityError> {
        let mut rng = StdRng::from_entropy();
        self.evaluate_with_rng(caller, request, &mut rng).await
    }

    /// [`Self::evaluate`] with caller-supplied randomness
    pub async fn evaluate_with_rng<R: Rng + Send>(
        &self,
        caller: Uuid,
        request: &CompatibilityRequest,
        rng: &mut R,
    ) -> Result<CompatibilityResponse, CompatibilityError> {
        let (Some(sire_id), Some(dam_id)) = (
            required_id(request.sire_id.as_deref()),
            required_id(request.dam_id.as_deref()),
        ) else {
            return Err(CompatibilityError::MissingParents);
        };

        let sire = self
            .find_dog(sire_id)
            .await?
            .ok_or(CompatibilityError::SireNotFound)?;
        let dam = self
            .find_dog(dam_id)
            .await?
            .ok_or(CompatibilityError::DamNotFound)?;

        if !sire.is_owned_by(caller) && !dam.is_owned_by(caller) {
            warn!(
                caller = %caller,
                sire_id = %sire.id,
                dam_id = %dam.id,
                "Compatibility check rejected: caller owns neither dog"
            );
            return Err(CompatibilityError::NotOwner);
        }

        let sire_tests = self.store.dna_tests(sire.id).await?;
        let dam_tests = self.store.dna_tests(dam.id).await?;
        let sire = DogProfile::new(sire, sire_tests);
        let dam = DogProfile::new(dam, dam_tests);

        let program = self
            .find_program(caller, request.breeding_program_id.as_deref())
            .await?;
        let target_color = program.as_ref().and_then(BreedingProgram::target_color);

        let mut assessment = assess_pairing(&sire, &dam, target_color, rng);

        if let Some(narrative) = self
            .narrative
            .try_enhance(&NarrativeRequest {
                sire: &sire,
                dam: &dam,
                program: program.as_ref(),
                assessment: &assessment,
            })
            .await
        {
            assessment.recommendation = narrative;
            assessment.ai_enhanced = true;
        }

        info!(
            sire_id = %sire.dog.id,
            dam_id = %dam.dog.id,
            score = assessment.score,
            coi = assessment.coi,
            health_risks = assessment.health_risks.len(),
            ai_enhanced = assessment.ai_enhanced,
            "Computed breeding compatibility"
        );

        let report_id = self
            .save_report(caller, &sire, &dam, program.as_ref(), &assessment)
            .await;

        Ok(CompatibilityResponse {
            sire: ParentSummary::from(&sire),
            dam: ParentSummary::from(&dam),
            assessment,
            report_id,
        })
    }

    /// Saved reports requested by `caller`, newest first
    pub async fn list_reports(
        &self,
        caller: Uuid,
        dog_id: Option<Uuid>,
    ) -> Result<Vec<CompatibilityReportView>, CompatibilityError> {
        let reports = self
            .store
            .reports_for(caller, dog_id, REPORT_LIST_LIMIT)
            .await?;
        Ok(reports.into_iter().map(CompatibilityReportView::from).collect())
    }

    pub async fn get_report(
        &self,
        caller: Uuid,
        report_id: Uuid,
    ) -> Result<CompatibilityReportView, CompatibilityError> {
        match self.store.find_report(report_id).await? {
            Some(report) if report.requested_by == caller => Ok(report.into()),
            _ => Err(CompatibilityError::ReportNotFound),
        }
    }

    /// Ids that are not UUIDs cannot name a stored dog.
    async fn find_dog(&self, raw_id: &str) -> Result<Option<Dog>, CompatibilityError> {
        match Uuid::parse_str(raw_id) {
            Ok(id) => Ok(self.store.find_dog(id).await?),
            Err(_) => Ok(None),
        }
    }

    /// Programs belonging to another account are treated as unknown.
    async fn find_program(
        &self,
        caller: Uuid,
        raw_id: Option<&str>,
    ) -> Result<Option<BreedingProgram>, CompatibilityError> {
        let Some(raw_id) = required_id(raw_id) else {
            return Ok(None);
        };
        let program = match Uuid::parse_str(raw_id) {
            Ok(id) => self.store.find_program(id).await?,
            Err(_) => None,
        };
        match program {
            Some(program) if program.owner_id == caller => Ok(Some(program)),
            Some(program) => {
                warn!(
                    caller = %caller,
                    breeding_program_id = %program.id,
                    "Breeding program belongs to another account, scoring without a target color"
                );
                Ok(None)
            }
            None => {
                warn!(
                    breeding_program_id = %raw_id,
                    "Breeding program not found, scoring without a target color"
                );
                Ok(None)
            }
        }
    }

    /// Failures are logged and swallowed; the computed result still stands.
    async fn save_report(
        &self,
        caller: Uuid,
        sire: &DogProfile,
        dam: &DogProfile,
        program: Option<&BreedingProgram>,
        assessment: &CompatibilityAssessment,
    ) -> Option<Uuid> {
        let report = CreateCompatibilityReport {
            requested_by: caller,
            sire_id: sire.dog.id,
            dam_id: dam.dog.id,
            breeding_program_id: program.map(|p| p.id),
            score: assessment.score,
            coi: assessment.coi,
            color_predictions: assessment.color_predictions.clone(),
            health_risks: assessment.health_risks.clone(),
            recommendation: assessment.recommendation.clone(),
            ai_enhanced: assessment.ai_enhanced,
        };

        match self.store.save_report(&report).await {
            Ok(saved) => Some(saved.id),
            Err(e) => {
                warn!(
                    error = %e,
                    sire_id = %sire.dog.id,
                    dam_id = %dam.dog.id,
                    "Failed to save compatibility report"
                );
                None
            }
        }
    }
}
