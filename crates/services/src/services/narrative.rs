//! Optional AI-written breeding recommendations.
//!
//! The compatibility service holds one [`NarrativeEnhancer`], chosen at
//! startup: [`DisabledNarrative`] when no API key is configured, otherwise
//! [`ClaudeNarrativeEnhancer`]. Enhancement failures are logged and the
//! templated recommendation is kept.

use std::{fmt::Write as _, time::Duration};

use async_trait::async_trait;
use db::models::breeding_program::BreedingProgram;
use tracing::{debug, warn};

use super::{
    claude_api::ClaudeApiClient, compatibility::CompatibilityAssessment,
    dog_profile::DogProfile,
};

const NARRATIVE_MAX_TOKENS: u32 = 1024;

const NARRATIVE_SYSTEM_PROMPT: &str = "You are an experienced canine reproduction advisor. \
     Give practical, responsible breeding guidance grounded in the figures provided. \
     Do not invent test results. Write plain prose without headings or bullet points.";

/// Everything the enhancer may mention about a computed pairing
#[derive(Debug, Clone, Copy)]
pub struct NarrativeRequest<'a> {
    pub sire: &'a DogProfile,
    pub dam: &'a DogProfile,
    pub program: Option<&'a BreedingProgram>,
    pub assessment: &'a CompatibilityAssessment,
}

#[async_trait]
pub trait NarrativeEnhancer: Send + Sync {
    /// Prose replacing the templated recommendation, or `None` to keep it.
    async fn try_enhance(&self, request: &NarrativeRequest<'_>) -> Option<String>;
}

/// Used when no language model is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrative;

#[async_trait]
impl NarrativeEnhancer for DisabledNarrative {
    async fn try_enhance(&self, _request: &NarrativeRequest<'_>) -> Option<String> {
        None
    }
}

pub struct ClaudeNarrativeEnhancer {
    client: ClaudeApiClient,
    timeout: Duration,
}

impl ClaudeNarrativeEnhancer {
    /// `timeout` bounds the whole call, retries included.
    pub fn new(client: ClaudeApiClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl NarrativeEnhancer for ClaudeNarrativeEnhancer {
    async fn try_enhance(&self, request: &NarrativeRequest<'_>) -> Option<String> {
        let prompt = build_prompt(request);
        let call = self.client.ask(
            &prompt,
            Some(NARRATIVE_SYSTEM_PROMPT.to_string()),
            NARRATIVE_MAX_TOKENS,
        );

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!(
                    model = %self.client.model(),
                    chars = text.len(),
                    "Breeding narrative generated"
                );
                Some(text.trim().to_string())
            }
            Ok(Ok(_)) => {
                warn!("Narrative provider returned empty text, keeping template");
                None
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Narrative enhancement failed, keeping template");
                None
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Narrative enhancement timed out, keeping template"
                );
                None
            }
        }
    }
}

fn describe_dog(out: &mut String, role: &str, profile: &DogProfile) {
    let dog = &profile.dog;
    let _ = writeln!(
        out,
        "- {role}: {name} ({breed}), color {color}, {dna}",
        name = dog.name,
        breed = dog.breed.as_deref().unwrap_or("breed not recorded"),
        color = profile.color(),
        dna = if profile.has_dna() {
            "DNA tested"
        } else {
            "no DNA tests on file"
        },
    );
}

/// Prompt embedding every computed figure for the pairing
pub fn build_prompt(request: &NarrativeRequest<'_>) -> String {
    let assessment = request.assessment;
    let mut prompt = String::from("Write a breeding recommendation for the following pairing.\n\n## Parents\n");
    describe_dog(&mut prompt, "Sire", request.sire);
    describe_dog(&mut prompt, "Dam", request.dam);

    if let Some(program) = request.program {
        let _ = write!(prompt, "\n## Breeding program\n- Name: {}\n", program.name);
        if let Some(target) = program.target_color() {
            let _ = writeln!(prompt, "- Target color: {target}");
        }
    }

    let _ = write!(
        prompt,
        "\n## Compatibility\n- Score: {}/100\n- Coefficient of inbreeding: {:.1}%\n",
        assessment.score, assessment.coi
    );

    prompt.push_str("\n## Predicted puppy colors\n");
    for prediction in &assessment.color_predictions {
        let _ = writeln!(prompt, "- {}: {}%", prediction.color, prediction.percentage);
    }

    prompt.push_str("\n## Health risks\n");
    if assessment.health_risks.is_empty() {
        prompt.push_str("- None identified\n");
    }
    for risk in &assessment.health_risks {
        let _ = writeln!(
            prompt,
            "- {} ({} risk): {}",
            risk.condition, risk.risk, risk.description
        );
    }

    prompt.push_str(
        r#"
## Instructions
Write 3-4 short paragraphs covering:
1. An overall assessment of the pairing
2. Health considerations and which DNA tests to run before breeding
3. Expected puppy outcomes, including colors
4. Any special warnings or precautions
"#,
    );

    prompt
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use chrono::Utc;
    use db::models::{
        compatibility_report::{ColorPrediction, HealthRisk, RiskLevel},
        dog::Dog,
    };
    use secrecy::SecretString;
    use uuid::Uuid;

    use super::*;

    fn profile(name: &str, color: Option<&str>) -> DogProfile {
        DogProfile::new(
            Dog {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                name: name.to_string(),
                breed: Some("French Bulldog".to_string()),
                color: color.map(str::to_string),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            Vec::new(),
        )
    }

    fn assessment() -> CompatibilityAssessment {
        CompatibilityAssessment {
            score: 74,
            color_predictions: vec![
                ColorPrediction {
                    color: "Brindle".to_string(),
                    percentage: 60,
                },
                ColorPrediction {
                    color: "Fawn".to_string(),
                    percentage: 40,
                },
            ],
            health_risks: vec![HealthRisk {
                condition: "Hip Dysplasia".to_string(),
                risk: RiskLevel::Medium,
                description: "Common breed predisposition.".to_string(),
            }],
            coi: 3.2,
            recommendation: "Good match.".to_string(),
            ai_enhanced: false,
        }
    }

    fn program() -> BreedingProgram {
        BreedingProgram {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Brindle Line".to_string(),
            color_focus: Some("Brindle".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Serve `handler` on an ephemeral port and return the Messages URL
    async fn mock_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    fn client(endpoint: String) -> ClaudeApiClient {
        ClaudeApiClient::new(
            SecretString::from("test-key".to_string()),
            None,
            Duration::from_secs(5),
        )
        .unwrap()
        .with_endpoint(endpoint)
    }

    #[test]
    fn prompt_embeds_all_figures() {
        let (sire, dam) = (profile("Rocco", Some("Brindle")), profile("Mabel", None));
        let assessment = assessment();
        let program = program();
        let prompt = build_prompt(&NarrativeRequest {
            sire: &sire,
            dam: &dam,
            program: Some(&program),
            assessment: &assessment,
        });

        assert!(prompt.contains("Sire: Rocco (French Bulldog), color Brindle, no DNA tests on file"));
        assert!(prompt.contains("Dam: Mabel (French Bulldog), color Unknown"));
        assert!(prompt.contains("Name: Brindle Line"));
        assert!(prompt.contains("Target color: Brindle"));
        assert!(prompt.contains("Score: 74/100"));
        assert!(prompt.contains("Coefficient of inbreeding: 3.2%"));
        assert!(prompt.contains("- Brindle: 60%"));
        assert!(prompt.contains("- Fawn: 40%"));
        assert!(prompt.contains("Hip Dysplasia (Medium risk): Common breed predisposition."));
        assert!(prompt.contains("3-4 short paragraphs"));
    }

    #[tokio::test]
    async fn disabled_narrative_never_enhances() {
        let (sire, dam) = (profile("A", None), profile("B", None));
        let assessment = assessment();
        let request = NarrativeRequest {
            sire: &sire,
            dam: &dam,
            program: None,
            assessment: &assessment,
        };
        assert_eq!(DisabledNarrative.try_enhance(&request).await, None);
    }

    #[tokio::test]
    async fn provider_text_replaces_template() {
        let endpoint = mock_provider(Router::new().route(
            "/v1/messages",
            post(|| async {
                Json(serde_json::json!({
                    "id": "msg_test",
                    "model": "claude-sonnet-4-20250514",
                    "stop_reason": "end_turn",
                    "usage": {"input_tokens": 100, "output_tokens": 40},
                    "content": [{"type": "text", "text": "  A promising pairing.\n\nTest both parents for hips.  "}]
                }))
            }),
        ))
        .await;

        let enhancer = ClaudeNarrativeEnhancer::new(client(endpoint), Duration::from_secs(5));
        let (sire, dam) = (profile("A", Some("Fawn")), profile("B", Some("Fawn")));
        let assessment = assessment();
        let text = enhancer
            .try_enhance(&NarrativeRequest {
                sire: &sire,
                dam: &dam,
                program: None,
                assessment: &assessment,
            })
            .await;

        assert_eq!(
            text.as_deref(),
            Some("A promising pairing.\n\nTest both parents for hips.")
        );
    }

    #[tokio::test]
    async fn provider_error_keeps_template() {
        let endpoint = mock_provider(Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::BAD_REQUEST, "bad request") }),
        ))
        .await;

        let enhancer = ClaudeNarrativeEnhancer::new(client(endpoint), Duration::from_secs(5));
        let (sire, dam) = (profile("A", None), profile("B", None));
        let assessment = assessment();
        let text = enhancer
            .try_enhance(&NarrativeRequest {
                sire: &sire,
                dam: &dam,
                program: None,
                assessment: &assessment,
            })
            .await;
        assert_eq!(text, None);
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let endpoint = mock_provider(Router::new().route(
            "/v1/messages",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                StatusCode::OK
            }),
        ))
        .await;

        let enhancer = ClaudeNarrativeEnhancer::new(client(endpoint), Duration::from_millis(200));
        let (sire, dam) = (profile("A", None), profile("B", None));
        let assessment = assessment();
        let started = std::time::Instant::now();
        let text = enhancer
            .try_enhance(&NarrativeRequest {
                sire: &sire,
                dam: &dam,
                program: None,
                assessment: &assessment,
            })
            .await;

        assert_eq!(text, None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
