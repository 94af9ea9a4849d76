use serde::{Deserialize, Serialize};

/// A user-declared competence claim. Advisory only: the scheduler never
/// consults these; they exist so a host UI can warn when a
/// declared-proficient value is struggling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proficiency {
    pub dimension: String,
    pub value: String,
}
