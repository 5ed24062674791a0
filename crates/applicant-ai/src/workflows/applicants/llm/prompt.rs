//! Fixed prompt pair sent with every assessment request.

pub(crate) const SYSTEM_PROMPT: &str = "You are a professional recruiting analyst.";

/// Instructions plus the dossier JSON. The response template here is what
/// the tolerant parser expects back.
pub(crate) fn user_prompt(document: &str) -> String {
    format!(
        "You are a recruiting analyst. Given this JSON applicant profile, do four things:\n\
         1. Provide a concise 75-word summary.\n\
         2. Rate overall candidate quality from 1-10 (higher is better).\n\
         3. List any data gaps or inconsistencies you notice.\n\
         4. Suggest up to three follow-up questions to clarify gaps.\n\
         \n\
         Applicant JSON:\n\
         {document}\n\
         \n\
         Return exactly:\n\
         Summary: <text>\n\
         Score: <integer>\n\
         Issues: <comma-separated list or 'None'>\n\
         Follow-Ups: <bullet list>"
    )
}
