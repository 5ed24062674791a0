use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier shared by an applicant's child records and their dossier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

/// Currencies accepted on salary preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Inr,
}

impl Currency {
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Inr => "INR",
        }
    }

    /// Accepts the ISO code in any casing, with surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            "CAD" => Some(Currency::Cad),
            "INR" => Some(Currency::Inr),
            _ => None,
        }
    }
}

/// Where an applicant stands in the shortlist process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistStatus {
    Pending,
    Shortlisted,
    Rejected,
}

impl ShortlistStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ShortlistStatus::Pending => "pending",
            ShortlistStatus::Shortlisted => "shortlisted",
            ShortlistStatus::Rejected => "rejected",
        }
    }
}

/// Contact and location details for one applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub full_name: String,
    pub email: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// One employment stint. An open `end_date` means the role is ongoing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkExperience {
    pub company: String,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies: Option<String>,
}

/// Rates are hourly, in the stated currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryPreference {
    pub preferred_rate: f64,
    pub minimum_rate: f64,
    pub currency: Currency,
    pub availability_hours: u32,
}

/// Canonical merged view of an applicant. Sections the applicant never
/// supplied are omitted rather than serialized as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDossier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal: Option<PersonalDetails>,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryPreference>,
}

impl ApplicationDossier {
    pub fn is_empty(&self) -> bool {
        self.personal.is_none() && self.experience.is_empty() && self.salary.is_none()
    }
}

/// Qualitative review produced by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmAssessment {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_ups: Vec<String>,
}

/// Row appended to the shortlist ledger when an applicant first qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistedLead {
    pub applicant_id: ApplicantId,
    pub compressed_document: String,
    pub score_reason: String,
    pub created_at: DateTime<Utc>,
}
