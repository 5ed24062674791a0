//! Consolidation, restoration, and decisioning engine for contractor applications.
//!
//! Child records held in an external store (personal details, work experience,
//! salary preferences) are consolidated into one canonical JSON dossier per
//! applicant, restored back on demand, screened against deterministic shortlist
//! rules, and assessed by a language model behind a retry-aware gateway.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
