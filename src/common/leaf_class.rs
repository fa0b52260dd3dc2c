use image::Rgb;
use serde::{Deserialize, Serialize};

/// The fixed set of classes the leaf model is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafClass {
    Healthy,
    InfectedLeaf,
    DiseasePart,
}

// Canonical label spelling and the lowercase/underscored variant some exports use.
const HEALTHY: [&str; 2] = ["Healthy", "healthy"];
const INFECTED_LEAF: [&str; 2] = ["Infected Leaf", "infected_leaf"];
const DISEASE_PART: [&str; 2] = ["Disease Part", "disease_part"];

impl LeafClass {
    /// Model order: class id 0, 1, 2.
    pub const ALL: [LeafClass; 3] = [LeafClass::Healthy, LeafClass::InfectedLeaf, LeafClass::DiseasePart];

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        LeafClass::ALL.into_iter().find(|class| {
            let [proper, snake] = class.spellings();
            label == proper.to_lowercase() || label == snake
        })
    }

    pub fn from_id(class_id: usize) -> Option<Self> {
        LeafClass::ALL.get(class_id).copied()
    }

    pub fn id(&self) -> usize {
        match self {
            LeafClass::Healthy => 0,
            LeafClass::InfectedLeaf => 1,
            LeafClass::DiseasePart => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        self.spellings()[0]
    }

    /// Box and label-background colour used by the annotator.
    pub fn colour(&self) -> Rgb<u8> {
        match self {
            LeafClass::Healthy => Rgb([0, 255, 0]),        // green
            LeafClass::InfectedLeaf => Rgb([255, 165, 0]), // orange
            LeafClass::DiseasePart => Rgb([255, 0, 0]),    // red
        }
    }

    fn spellings(&self) -> [&'static str; 2] {
        match self {
            LeafClass::Healthy => HEALTHY,
            LeafClass::InfectedLeaf => INFECTED_LEAF,
            LeafClass::DiseasePart => DISEASE_PART,
        }
    }

    pub fn all_labels() -> Vec<String> {
        LeafClass::ALL.iter().map(|class| class.label().to_string()).collect()
    }
}

impl std::fmt::Display for LeafClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
