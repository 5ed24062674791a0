//! Expands a canonical dossier back into per-table child records.

use super::domain::ApplicationDossier;
use super::schema::{self, ChildRecords, ValidationError};

/// Project the dossier back into raw record fields. This is the inverse of
/// consolidation: sections absent from the dossier produce no record, so a
/// restore replaces whatever the store previously held.
pub fn children_from_dossier(dossier: &ApplicationDossier) -> ChildRecords {
    ChildRecords {
        personal: dossier.personal.as_ref().map(schema::personal_to_fields),
        experience: dossier
            .experience
            .iter()
            .map(schema::experience_to_fields)
            .collect(),
        salary: dossier.salary.as_ref().map(schema::salary_to_fields),
    }
}

/// Parse dossier JSON and expand it in one step. Returns the typed dossier
/// alongside the records so callers can re-render the canonical form.
pub fn decompress(text: &str) -> Result<(ApplicationDossier, ChildRecords), ValidationError> {
    let dossier = schema::parse_dossier(text)?;
    let children = children_from_dossier(&dossier);
    Ok((dossier, children))
}
