//! Coat color inheritance table and litter color prediction.

use db::models::compatibility_report::ColorPrediction;

pub const UNKNOWN_COLOR: &str = "Unknown";

const UNKNOWN_ONLY: &[&str] = &[UNKNOWN_COLOR];

/// Extra share given to a color one of the parents actually shows
const PARENT_COLOR_BONUS: u8 = 10;

/// Visual parent color -> colors it can pass on
static COLOR_GENETICS: &[(&str, &[&str])] = &[
    ("Black", &["Black", "Blue", "Chocolate"]),
    ("Blue", &["Blue", "Black"]),
    ("Chocolate", &["Chocolate", "Black"]),
    ("Lilac", &["Lilac", "Blue", "Chocolate"]),
    ("Brindle", &["Brindle", "Fawn"]),
    ("Fawn", &["Fawn"]),
    ("Cream", &["Cream"]),
    ("White", &["White", "Cream"]),
    ("Pied", &["Pied", "White"]),
    ("Merle", &["Merle", "Black", "Blue"]),
    ("Red", &["Red", "Fawn"]),
    ("Sable", &["Sable", "Fawn"]),
];

/// Colors a parent of the given visual color can pass on.
///
/// Lookup ignores case and surrounding whitespace; colors missing from the
/// table resolve to `["Unknown"]`.
pub fn possible_colors(color: &str) -> &'static [&'static str] {
    let color = color.trim();
    COLOR_GENETICS
        .iter()
        .find(|(parent, _)| parent.eq_ignore_ascii_case(color))
        .map(|(_, colors)| *colors)
        .unwrap_or(UNKNOWN_ONLY)
}

/// Predict the litter's color distribution, highest share first.
pub fn predict(sire_color: &str, dam_color: &str) -> Vec<ColorPrediction> {
    let mut candidates: Vec<&str> = Vec::new();
    for color in possible_colors(sire_color)
        .iter()
        .chain(possible_colors(dam_color))
    {
        if !candidates.contains(color) {
            candidates.push(*color);
        }
    }

    let mut predictions = distribute(&candidates, [sire_color.trim(), dam_color.trim()]);
    // Stable, so equal shares keep their table order.
    predictions.sort_by(|a, b| b.percentage.cmp(&a.percentage));
    predictions
}

/// Split 100% across `candidates` in their given order. The first entry
/// absorbs whatever the per-color shares leave over.
fn distribute(candidates: &[&str], parent_colors: [&str; 2]) -> Vec<ColorPrediction> {
    if let [only] = candidates {
        return vec![ColorPrediction {
            color: only.to_string(),
            percentage: 100,
        }];
    }

    let base = (100 / candidates.len().max(1)) as u8;
    let mut remaining: u8 = 100;
    let mut predictions: Vec<ColorPrediction> = candidates
        .iter()
        .map(|color| {
            let shown_by_parent = parent_colors
                .iter()
                .any(|parent| parent.eq_ignore_ascii_case(color));
            let wanted = if shown_by_parent {
                base + PARENT_COLOR_BONUS
            } else {
                base
            };
            let percentage = wanted.min(remaining);
            remaining -= percentage;
            ColorPrediction {
                color: color.to_string(),
                percentage,
            }
        })
        .collect();

    if let Some(first) = predictions.first_mut() {
        first.percentage += remaining;
    }

    predictions
}
