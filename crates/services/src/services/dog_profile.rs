use db::models::{
    dna_test::{DnaTest, HealthMarker},
    dog::Dog,
};

use super::color_genetics::UNKNOWN_COLOR;

/// A dog together with its DNA test history, as consumed by the calculator.
#[derive(Debug, Clone)]
pub struct DogProfile {
    pub dog: Dog,
    pub dna_tests: Vec<DnaTest>,
}

impl DogProfile {
    pub fn new(dog: Dog, dna_tests: Vec<DnaTest>) -> Self {
        Self { dog, dna_tests }
    }

    pub fn has_dna(&self) -> bool {
        !self.dna_tests.is_empty()
    }

    /// Coat color used for prediction; blank or missing reads as "Unknown"
    pub fn color(&self) -> &str {
        self.dog
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_COLOR)
    }

    /// Health markers across every DNA test, in test order
    pub fn health_markers(&self) -> Vec<HealthMarker> {
        self.dna_tests
            .iter()
            .flat_map(|test| test.parsed_health_markers())
            .collect()
    }
}
