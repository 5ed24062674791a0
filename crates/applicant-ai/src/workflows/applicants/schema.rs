//! Field-level mapping between raw store records and typed domain values.
//!
//! Store records arrive as loosely typed JSON objects keyed by human-facing
//! column names. Everything here is total over that input: a field is either
//! converted to its typed form or reported as a [`ValidationError`] naming
//! the record kind and column.

use chrono::NaiveDate;
use serde_json::Value;

use super::domain::{
    ApplicationDossier, Currency, PersonalDetails, SalaryPreference, WorkExperience,
};

/// Column names used by the record store.
pub mod fields {
    pub const FULL_NAME: &str = "Full Name";
    pub const EMAIL: &str = "Email";
    pub const LOCATION: &str = "Location";
    pub const LINKEDIN: &str = "LinkedIn";
    pub const COMPANY: &str = "Company";
    pub const TITLE: &str = "Title";
    pub const START: &str = "Start";
    pub const END: &str = "End";
    pub const TECHNOLOGIES: &str = "Technologies";
    pub const PREFERRED_RATE: &str = "Preferred Rate";
    pub const MINIMUM_RATE: &str = "Minimum Rate";
    pub const CURRENCY: &str = "Currency";
    pub const AVAILABILITY: &str = "Availability (hrs/wk)";
}

/// One raw record: column name to JSON value.
pub type RecordFields = serde_json::Map<String, Value>;

/// Everything the store holds for a single applicant, still untyped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildRecords {
    pub personal: Option<RecordFields>,
    pub experience: Vec<RecordFields>,
    pub salary: Option<RecordFields>,
}

/// Which child table a field belongs to, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Personal,
    Experience,
    Salary,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Personal => "personal details",
            RecordKind::Experience => "work experience",
            RecordKind::Salary => "salary preference",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("{kind} record is missing required field '{field}'")]
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },
    #[error("{kind} field '{field}' must be text")]
    ExpectedText {
        kind: RecordKind,
        field: &'static str,
    },
    #[error("{kind} field '{field}' must be numeric, found '{found}'")]
    InvalidNumber {
        kind: RecordKind,
        field: &'static str,
        found: String,
    },
    #[error("{kind} field '{field}' must be a YYYY-MM-DD date, found '{found}'")]
    InvalidDate {
        kind: RecordKind,
        field: &'static str,
        found: String,
    },
    #[error("unsupported currency '{found}'")]
    UnsupportedCurrency { found: String },
    #[error("minimum rate {minimum} exceeds preferred rate {preferred}")]
    RateOrdering { minimum: f64, preferred: f64 },
    #[error("availability must be a whole number of hours, found '{found}'")]
    InvalidAvailability { found: String },
    #[error("document is not a valid dossier: {0}")]
    MalformedDocument(String),
    #[error("dossier could not be serialized: {0}")]
    Serialization(String),
}

pub fn personal_from_fields(record: &RecordFields) -> Result<PersonalDetails, ValidationError> {
    let kind = RecordKind::Personal;
    Ok(PersonalDetails {
        full_name: text_field(kind, record, fields::FULL_NAME)?,
        email: text_field(kind, record, fields::EMAIL)?,
        location: text_field(kind, record, fields::LOCATION)?,
        linkedin: optional_text(kind, record, fields::LINKEDIN)?,
    })
}

pub fn personal_to_fields(details: &PersonalDetails) -> RecordFields {
    let mut record = RecordFields::new();
    record.insert(
        fields::FULL_NAME.to_string(),
        Value::String(details.full_name.clone()),
    );
    record.insert(
        fields::EMAIL.to_string(),
        Value::String(details.email.clone()),
    );
    record.insert(
        fields::LOCATION.to_string(),
        Value::String(details.location.clone()),
    );
    if let Some(linkedin) = &details.linkedin {
        record.insert(fields::LINKEDIN.to_string(), Value::String(linkedin.clone()));
    }
    record
}

pub fn experience_from_fields(record: &RecordFields) -> Result<WorkExperience, ValidationError> {
    let kind = RecordKind::Experience;
    Ok(WorkExperience {
        company: text_field(kind, record, fields::COMPANY)?,
        title: text_field(kind, record, fields::TITLE)?,
        start_date: date_field(kind, record, fields::START)?,
        end_date: end_date_field(record)?,
        technologies: technologies_field(record)?,
    })
}

pub fn experience_to_fields(stint: &WorkExperience) -> RecordFields {
    let mut record = RecordFields::new();
    record.insert(
        fields::COMPANY.to_string(),
        Value::String(stint.company.clone()),
    );
    record.insert(fields::TITLE.to_string(), Value::String(stint.title.clone()));
    record.insert(
        fields::START.to_string(),
        Value::String(stint.start_date.format("%Y-%m-%d").to_string()),
    );
    if let Some(end) = stint.end_date {
        record.insert(
            fields::END.to_string(),
            Value::String(end.format("%Y-%m-%d").to_string()),
        );
    }
    if let Some(technologies) = &stint.technologies {
        record.insert(
            fields::TECHNOLOGIES.to_string(),
            Value::String(technologies.clone()),
        );
    }
    record
}

pub fn salary_from_fields(record: &RecordFields) -> Result<SalaryPreference, ValidationError> {
    let kind = RecordKind::Salary;
    let preferred_rate = number_field(kind, record, fields::PREFERRED_RATE)?;
    let minimum_rate = number_field(kind, record, fields::MINIMUM_RATE)?;
    let currency_raw = text_field(kind, record, fields::CURRENCY)?;
    let currency = Currency::parse(&currency_raw)
        .ok_or(ValidationError::UnsupportedCurrency { found: currency_raw })?;
    let availability_hours = availability_field(record)?;

    if minimum_rate > preferred_rate {
        return Err(ValidationError::RateOrdering {
            minimum: minimum_rate,
            preferred: preferred_rate,
        });
    }

    Ok(SalaryPreference {
        preferred_rate,
        minimum_rate,
        currency,
        availability_hours,
    })
}

pub fn salary_to_fields(salary: &SalaryPreference) -> RecordFields {
    let mut record = RecordFields::new();
    record.insert(
        fields::PREFERRED_RATE.to_string(),
        Value::from(salary.preferred_rate),
    );
    record.insert(
        fields::MINIMUM_RATE.to_string(),
        Value::from(salary.minimum_rate),
    );
    record.insert(
        fields::CURRENCY.to_string(),
        Value::String(salary.currency.code().to_string()),
    );
    record.insert(
        fields::AVAILABILITY.to_string(),
        Value::from(salary.availability_hours),
    );
    record
}

/// Parse canonical dossier JSON back into its typed form.
pub fn parse_dossier(text: &str) -> Result<ApplicationDossier, ValidationError> {
    let dossier: ApplicationDossier = serde_json::from_str(text)
        .map_err(|err| ValidationError::MalformedDocument(err.to_string()))?;
    validate_dossier(&dossier)?;
    Ok(dossier)
}

/// Render the canonical dossier JSON. Output is pretty-printed and stable
/// for equal inputs.
pub fn render_dossier(dossier: &ApplicationDossier) -> Result<String, ValidationError> {
    serde_json::to_string_pretty(dossier)
        .map_err(|err| ValidationError::Serialization(err.to_string()))
}

fn validate_dossier(dossier: &ApplicationDossier) -> Result<(), ValidationError> {
    if let Some(salary) = &dossier.salary {
        if salary.minimum_rate > salary.preferred_rate {
            return Err(ValidationError::RateOrdering {
                minimum: salary.minimum_rate,
                preferred: salary.preferred_rate,
            });
        }
    }
    Ok(())
}

fn text_field(
    kind: RecordKind,
    record: &RecordFields,
    field: &'static str,
) -> Result<String, ValidationError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { kind, field }),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Err(ValidationError::MissingField { kind, field })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ValidationError::ExpectedText { kind, field }),
    }
}

fn optional_text(
    kind: RecordKind,
    record: &RecordFields,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(_) => Err(ValidationError::ExpectedText { kind, field }),
    }
}

fn number_field(
    kind: RecordKind,
    record: &RecordFields,
    field: &'static str,
) -> Result<f64, ValidationError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField { kind, field }),
        Some(Value::Number(number)) => number.as_f64().ok_or(ValidationError::InvalidNumber {
            kind,
            field,
            found: number.to_string(),
        }),
        Some(Value::String(text)) => {
            text.trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidNumber {
                    kind,
                    field,
                    found: text.clone(),
                })
        }
        Some(other) => Err(ValidationError::InvalidNumber {
            kind,
            field,
            found: render_raw(other),
        }),
    }
}

fn date_field(
    kind: RecordKind,
    record: &RecordFields,
    field: &'static str,
) -> Result<NaiveDate, ValidationError> {
    let text = text_field(kind, record, field)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        kind,
        field,
        found: text,
    })
}

/// An absent, blank, or "Present" end marker means the role is ongoing.
fn end_date_field(record: &RecordFields) -> Result<Option<NaiveDate>, ValidationError> {
    let kind = RecordKind::Experience;
    match record.get(fields::END) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("present") {
                return Ok(None);
            }
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(Some).map_err(|_| {
                ValidationError::InvalidDate {
                    kind,
                    field: fields::END,
                    found: trimmed.to_string(),
                }
            })
        }
        Some(other) => Err(ValidationError::InvalidDate {
            kind,
            field: fields::END,
            found: render_raw(other),
        }),
    }
}

/// Technology tags arrive either as free text or a list of tag strings.
fn technologies_field(record: &RecordFields) -> Result<Option<String>, ValidationError> {
    match record.get(fields::TECHNOLOGIES) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Array(entries)) => {
            let mut parts = Vec::with_capacity(entries.len());
            for entry in entries {
                match entry {
                    Value::String(text) if !text.trim().is_empty() => {
                        parts.push(text.trim().to_string());
                    }
                    Value::String(_) => {}
                    _ => {
                        return Err(ValidationError::ExpectedText {
                            kind: RecordKind::Experience,
                            field: fields::TECHNOLOGIES,
                        });
                    }
                }
            }
            Ok((!parts.is_empty()).then(|| parts.join(", ")))
        }
        Some(_) => Err(ValidationError::ExpectedText {
            kind: RecordKind::Experience,
            field: fields::TECHNOLOGIES,
        }),
    }
}

fn availability_field(record: &RecordFields) -> Result<u32, ValidationError> {
    let kind = RecordKind::Salary;
    let value = match record.get(fields::AVAILABILITY) {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingField {
                kind,
                field: fields::AVAILABILITY,
            });
        }
        Some(value) => value,
    };

    let hours = match value {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|n| n.fract() == 0.0 && *n >= 0.0)
                .map(|n| n as u64)
        }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    hours
        .and_then(|hours| u32::try_from(hours).ok())
        .ok_or_else(|| ValidationError::InvalidAvailability {
            found: render_raw(value),
        })
}

fn render_raw(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
