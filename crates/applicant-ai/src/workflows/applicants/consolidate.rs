//! Merges an applicant's child records into one canonical dossier.

use super::domain::ApplicationDossier;
use super::schema::{self, ChildRecords, ValidationError};

/// Build the typed dossier from whatever child records exist. Sections with
/// no record are omitted; experience entries keep their stored order.
pub fn dossier_from_children(children: &ChildRecords) -> Result<ApplicationDossier, ValidationError> {
    let personal = children
        .personal
        .as_ref()
        .map(|record| schema::personal_from_fields(record))
        .transpose()?;

    let mut experience = Vec::with_capacity(children.experience.len());
    for record in &children.experience {
        experience.push(schema::experience_from_fields(record)?);
    }

    let salary = children
        .salary
        .as_ref()
        .map(|record| schema::salary_from_fields(record))
        .transpose()?;

    Ok(ApplicationDossier {
        personal,
        experience,
        salary,
    })
}

/// Consolidate child records straight to canonical dossier JSON.
pub fn compress(children: &ChildRecords) -> Result<String, ValidationError> {
    let dossier = dossier_from_children(children)?;
    schema::render_dossier(&dossier)
}
