//! Coefficient of inbreeding (COI) estimate, as a percentage.

use rand::Rng;

use super::dog_profile::DogProfile;

pub const MIN_COI: f64 = 1.0;
pub const MAX_COI: f64 = 15.0;

/// Placeholder estimate drawn uniformly from [1.0, 15.0] at one decimal.
///
/// Pedigrees are not stored yet, so the parents are not consulted.
// TODO: compute Wright's COI over shared ancestors once pedigree records exist.
pub fn estimate<R: Rng>(_sire: &DogProfile, _dam: &DogProfile, rng: &mut R) -> f64 {
    let raw: f64 = rng.gen_range(MIN_COI..=MAX_COI);
    ((raw * 10.0).round() / 10.0).clamp(MIN_COI, MAX_COI)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::dog::Dog;
    use rand::{SeedableRng, rngs::StdRng};
    use uuid::Uuid;

    use super::*;

    fn profile() -> DogProfile {
        DogProfile::new(
            Dog {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                name: "Pip".to_string(),
                breed: None,
                color: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            Vec::new(),
        )
    }

    #[test]
    fn stays_in_range_with_one_decimal() {
        let (sire, dam) = (profile(), profile());
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1_000 {
            let coi = estimate(&sire, &dam, &mut rng);
            assert!((MIN_COI..=MAX_COI).contains(&coi), "{coi}");
            assert!(((coi * 10.0).round() - coi * 10.0).abs() < 1e-9, "{coi}");
        }
    }
}
