//! Pure review logic for the three shortlist criteria.

use chrono::NaiveDate;

use super::config::ShortlistConfig;
use super::{CriterionReview, ShortlistCriterion};
use crate::workflows::applicants::domain::{ApplicationDossier, WorkExperience};

const DAYS_PER_YEAR: f64 = 365.25;

/// Sum of stint lengths in years. Ongoing stints run to `today`;
/// overlapping stints are counted twice on purpose.
pub(crate) fn total_experience_years(stints: &[WorkExperience], today: NaiveDate) -> f64 {
    stints
        .iter()
        .map(|stint| {
            let end = stint.end_date.unwrap_or(today);
            let days = (end - stint.start_date).num_days() as f64;
            (days / DAYS_PER_YEAR).max(0.0)
        })
        .sum::<f64>()
        // The empty sum's identity is -0.0, which would format as "-0.0";
        // adding +0.0 normalizes it (f64::max's zero-sign choice varies).
        + 0.0
}

/// First configured tier-one company the applicant has worked for.
/// Comparison is exact after trimming and case folding.
pub(crate) fn tier_one_match<'a>(
    stints: &[WorkExperience],
    companies: &'a [String],
) -> Option<&'a str> {
    stints.iter().find_map(|stint| {
        companies
            .iter()
            .find(|company| company.trim().eq_ignore_ascii_case(stint.company.trim()))
            .map(|company| company.as_str())
    })
}

pub(crate) fn review_experience(
    dossier: &ApplicationDossier,
    config: &ShortlistConfig,
    today: NaiveDate,
) -> CriterionReview {
    if let Some(company) = tier_one_match(&dossier.experience, &config.tier_one_companies) {
        return CriterionReview {
            criterion: ShortlistCriterion::Experience,
            passed: true,
            detail: format!("Has tier-1 company experience ({company})"),
        };
    }

    let years = total_experience_years(&dossier.experience, today);
    if years >= config.min_experience_years {
        CriterionReview {
            criterion: ShortlistCriterion::Experience,
            passed: true,
            detail: format!("Has {years:.1} years of experience"),
        }
    } else {
        CriterionReview {
            criterion: ShortlistCriterion::Experience,
            passed: false,
            detail: format!("Insufficient experience ({years:.1} years)"),
        }
    }
}

/// Reviews rate and availability together. Returns an extra data-quality
/// note when the stated currency differs from the ceiling's currency, since
/// the raw figures are then compared without conversion.
pub(crate) fn review_compensation(
    dossier: &ApplicationDossier,
    config: &ShortlistConfig,
) -> (CriterionReview, Option<String>) {
    let salary = match &dossier.salary {
        Some(salary) => salary,
        None => {
            return (
                CriterionReview {
                    criterion: ShortlistCriterion::Compensation,
                    passed: false,
                    detail: "No salary preference recorded".to_string(),
                },
                None,
            );
        }
    };

    let flag = (salary.currency != config.rate_currency).then(|| {
        format!(
            "rates stated in {} but ceiling is {}; compared without conversion",
            salary.currency.code(),
            config.rate_currency.code()
        )
    });

    let rate_ok = salary.preferred_rate <= config.max_hourly_rate;
    let hours_ok = salary.availability_hours >= config.min_availability_hours;

    let review = match (rate_ok, hours_ok) {
        (true, true) => CriterionReview {
            criterion: ShortlistCriterion::Compensation,
            passed: true,
            detail: format!(
                "Rate ${}/hr {}, {} hrs/week available",
                salary.preferred_rate,
                salary.currency.code(),
                salary.availability_hours
            ),
        },
        (false, true) => CriterionReview {
            criterion: ShortlistCriterion::Compensation,
            passed: false,
            detail: format!(
                "Rate too high (${}/hr exceeds ${}/hr ceiling)",
                salary.preferred_rate, config.max_hourly_rate
            ),
        },
        (true, false) => CriterionReview {
            criterion: ShortlistCriterion::Compensation,
            passed: false,
            detail: format!(
                "Insufficient availability ({} hrs/week, need {})",
                salary.availability_hours, config.min_availability_hours
            ),
        },
        (false, false) => CriterionReview {
            criterion: ShortlistCriterion::Compensation,
            passed: false,
            detail: format!(
                "Rate too high (${}/hr) and insufficient availability ({} hrs/week)",
                salary.preferred_rate, salary.availability_hours
            ),
        },
    };

    (review, flag)
}

pub(crate) fn review_location(
    dossier: &ApplicationDossier,
    config: &ShortlistConfig,
) -> CriterionReview {
    let personal = match &dossier.personal {
        Some(personal) => personal,
        None => {
            return CriterionReview {
                criterion: ShortlistCriterion::Location,
                passed: false,
                detail: "No personal details recorded".to_string(),
            };
        }
    };

    let eligible = config
        .eligible_locations
        .iter()
        .any(|fragment| contains_ignore_case(&personal.location, fragment));

    if eligible {
        CriterionReview {
            criterion: ShortlistCriterion::Location,
            passed: true,
            detail: format!("Located in {}", personal.location),
        }
    } else {
        CriterionReview {
            criterion: ShortlistCriterion::Location,
            passed: false,
            detail: format!("Location {} not eligible", personal.location),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
