use serde::{Deserialize, Serialize};
use crate::common::LeafClass;
use crate::data::ResultSet;

/// Overall verdict for an image, derived from its [`ResultSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    NoLeafDetected,
    Healthy,
    Infected,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::NoLeafDetected => "No Detected Leaf",
            Status::Healthy => "Healthy",
            Status::Infected => "Infected",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Nothing counted: no leaf. Any infected leaf or disease part: infected. Else healthy.
pub fn status_of(results: &ResultSet) -> Status {
    if results.total_count() == 0 {
        Status::NoLeafDetected
    } else if results.count(LeafClass::InfectedLeaf) > 0 || results.count(LeafClass::DiseasePart) > 0 {
        Status::Infected
    } else {
        Status::Healthy
    }
}

impl From<&ResultSet> for Status {
    fn from(results: &ResultSet) -> Self {
        status_of(results)
    }
}
