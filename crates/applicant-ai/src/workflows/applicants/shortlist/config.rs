use serde::{Deserialize, Serialize};

use crate::workflows::applicants::domain::Currency;

/// Thresholds and allow-lists driving the shortlist decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistConfig {
    /// Exact company names that waive the experience threshold.
    pub tier_one_companies: Vec<String>,
    /// Location fragments an applicant's location must contain.
    pub eligible_locations: Vec<String>,
    pub max_hourly_rate: f64,
    /// Currency the rate ceiling is stated in. Preferences in any other
    /// currency are compared as-is and flagged.
    pub rate_currency: Currency,
    pub min_availability_hours: u32,
    pub min_experience_years: f64,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            tier_one_companies: [
                "Google", "Meta", "OpenAI", "Microsoft", "Apple", "Amazon", "Netflix",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            eligible_locations: ["US", "Canada", "UK", "Germany", "India"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            max_hourly_rate: 100.0,
            rate_currency: Currency::Usd,
            min_availability_hours: 20,
            min_experience_years: 4.0,
        }
    }
}
