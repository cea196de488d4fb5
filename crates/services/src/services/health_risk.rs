//! Health risk assessment for a prospective pairing.
//!
//! DNA results from both parents are merged per condition. Conditions neither
//! parent was tested for are backfilled from a list of common breed
//! predispositions so the owner knows what to test for next.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use db::models::{
    compatibility_report::{HealthRisk, RiskLevel},
    dna_test::{HealthMarker, MarkerStatus},
};
use rand::{Rng, seq::SliceRandom};

use super::dog_profile::DogProfile;

pub const BREED_PREDISPOSITIONS: [&str; 6] = [
    "Hip Dysplasia",
    "Elbow Dysplasia",
    "Progressive Retinal Atrophy",
    "Degenerative Myelopathy",
    "Intervertebral Disc Disease",
    "Brachycephalic Obstructive Airway Syndrome",
];

const MAX_PREDISPOSITION_RISKS: usize = 2;

/// Chance that a backfilled predisposition is reported as Low rather than Medium
const PREDISPOSITION_LOW_CHANCE: f64 = 0.7;

pub const DNA_RISK_DESCRIPTION: &str =
    "Based on DNA test results from one or both parents.";
pub const PREDISPOSITION_DESCRIPTION: &str =
    "Common breed predisposition. Neither parent has been DNA tested for this condition; testing both parents is recommended.";

/// Severity a single marker result implies
pub fn marker_risk(marker: &HealthMarker) -> RiskLevel {
    match marker.known_status() {
        Some(MarkerStatus::AtRisk) => RiskLevel::High,
        Some(MarkerStatus::Carrier) => RiskLevel::Medium,
        Some(MarkerStatus::Clear) | None => RiskLevel::Low,
    }
}

/// Health risks for a pairing: DNA-derived entries first, then up to two
/// untested breed predispositions.
pub fn assess<R: Rng>(sire: &DogProfile, dam: &DogProfile, rng: &mut R) -> Vec<HealthRisk> {
    let markers = sire
        .health_markers()
        .into_iter()
        .chain(dam.health_markers());

    let mut risks = dna_risks(markers);
    let tested: HashSet<String> = risks
        .iter()
        .map(|risk| condition_key(&risk.condition))
        .collect();

    risks.extend(predisposition_risks(&tested, rng));
    risks
}

/// One entry per condition. Repeats only ever raise the severity.
fn dna_risks(markers: impl IntoIterator<Item = HealthMarker>) -> Vec<HealthRisk> {
    let mut risks: Vec<HealthRisk> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for marker in markers {
        let condition = marker.condition.trim();
        if condition.is_empty() {
            continue;
        }
        let risk = marker_risk(&marker);

        match positions.entry(condition_key(condition)) {
            Entry::Occupied(entry) => {
                let existing = &mut risks[*entry.get()];
                if risk > existing.risk {
                    existing.risk = risk;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(risks.len());
                risks.push(HealthRisk {
                    condition: condition.to_string(),
                    risk,
                    description: DNA_RISK_DESCRIPTION.to_string(),
                });
            }
        }
    }

    risks
}

fn predisposition_risks<R: Rng>(tested: &HashSet<String>, rng: &mut R) -> Vec<HealthRisk> {
    let untested: Vec<&str> = BREED_PREDISPOSITIONS
        .iter()
        .copied()
        .filter(|condition| !tested.contains(&condition_key(condition)))
        .collect();

    let picked: Vec<&str> = untested
        .choose_multiple(rng, MAX_PREDISPOSITION_RISKS)
        .copied()
        .collect();

    picked
        .into_iter()
        .map(|condition| HealthRisk {
            condition: condition.to_string(),
            risk: if rng.gen_bool(PREDISPOSITION_LOW_CHANCE) {
                RiskLevel::Low
            } else {
                RiskLevel::Medium
            },
            description: PREDISPOSITION_DESCRIPTION.to_string(),
        })
        .collect()
}

fn condition_key(condition: &str) -> String {
    condition.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::{dna_test::DnaTest, dog::Dog};
    use rand::{SeedableRng, rngs::StdRng};
    use uuid::Uuid;

    use super::*;

    fn profile(tests: &[&[(&str, &str)]]) -> DogProfile {
        let dog = Dog {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Test".to_string(),
            breed: None,
            color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let dna_tests = tests
            .iter()
            .map(|markers| {
                let markers: Vec<HealthMarker> = markers
                    .iter()
                    .map(|(condition, status)| HealthMarker {
                        condition: condition.to_string(),
                        status: status.to_string(),
                    })
                    .collect();
                DnaTest {
                    id: Uuid::new_v4(),
                    dog_id: dog.id,
                    provider: None,
                    health_markers: serde_json::to_string(&markers).unwrap(),
                    genetic_markers: None,
                    tested_at: None,
                    created_at: Utc::now(),
                }
            })
            .collect();
        DogProfile::new(dog, dna_tests)
    }

    fn dna_only(risks: &[HealthRisk]) -> Vec<&HealthRisk> {
        risks
            .iter()
            .filter(|r| r.description == DNA_RISK_DESCRIPTION)
            .collect()
    }

    #[test]
    fn maps_marker_status_to_severity() {
        let marker = |status: &str| HealthMarker {
            condition: "PRA".to_string(),
            status: status.to_string(),
        };
        assert_eq!(marker_risk(&marker("At Risk")), RiskLevel::High);
        assert_eq!(marker_risk(&marker("Carrier")), RiskLevel::Medium);
        assert_eq!(marker_risk(&marker("Clear")), RiskLevel::Low);
        assert_eq!(marker_risk(&marker("Pending")), RiskLevel::Low);
    }

    #[test]
    fn no_dna_tests_gives_two_predispositions() {
        let mut rng = StdRng::seed_from_u64(7);
        let risks = assess(&profile(&[]), &profile(&[]), &mut rng);

        assert_eq!(risks.len(), 2);
        assert_ne!(risks[0].condition, risks[1].condition);
        for risk in &risks {
            assert!(BREED_PREDISPOSITIONS.contains(&risk.condition.as_str()));
            assert_ne!(risk.risk, RiskLevel::High);
            assert_eq!(risk.description, PREDISPOSITION_DESCRIPTION);
        }
    }

    #[test]
    fn duplicate_conditions_upgrade_but_never_downgrade() {
        let sire = profile(&[
            &[("Degenerative Myelopathy", "Clear")],
            &[("Degenerative Myelopathy", "At Risk")],
        ]);
        let dam = profile(&[&[
            ("degenerative myelopathy ", "Carrier"),
            ("Degenerative Myelopathy", "Clear"),
        ]]);

        let mut rng = StdRng::seed_from_u64(1);
        let risks = assess(&sire, &dam, &mut rng);
        let dna = dna_only(&risks);

        assert_eq!(dna.len(), 1);
        assert_eq!(dna[0].condition, "Degenerative Myelopathy");
        assert_eq!(dna[0].risk, RiskLevel::High);
    }

    #[test]
    fn tested_conditions_are_not_backfilled() {
        let tested: Vec<(&str, &str)> = BREED_PREDISPOSITIONS
            .iter()
            .map(|condition| (*condition, "Clear"))
            .collect();
        let sire = profile(&[tested.as_slice()]);

        let mut rng = StdRng::seed_from_u64(3);
        let risks = assess(&sire, &profile(&[]), &mut rng);

        assert_eq!(risks.len(), BREED_PREDISPOSITIONS.len());
        assert!(risks.iter().all(|r| r.description == DNA_RISK_DESCRIPTION));
        assert!(risks.iter().all(|r| r.risk == RiskLevel::Low));
    }

    #[test]
    fn dna_entries_come_first_and_conditions_are_unique() {
        let sire = profile(&[&[("Hip Dysplasia", "Carrier"), ("", "At Risk")]]);
        let dam = profile(&[&[("Exercise Induced Collapse", "At Risk")]]);

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let risks = assess(&sire, &dam, &mut rng);

            assert_eq!(risks[0].condition, "Hip Dysplasia");
            assert_eq!(risks[0].risk, RiskLevel::Medium);
            assert_eq!(risks[1].condition, "Exercise Induced Collapse");
            assert_eq!(risks[1].risk, RiskLevel::High);
            assert_eq!(risks.len(), 4);

            let unique: HashSet<String> =
                risks.iter().map(|r| condition_key(&r.condition)).collect();
            assert_eq!(unique.len(), risks.len());
            assert!(risks[2..].iter().all(|r| r.condition != "Hip Dysplasia"));
        }
    }

    #[test]
    fn same_seed_same_backfill() {
        let a = assess(&profile(&[]), &profile(&[]), &mut StdRng::seed_from_u64(42));
        let b = assess(&profile(&[]), &profile(&[]), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
