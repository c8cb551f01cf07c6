use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownAttributeError;

/// A category of image analysis that can be requested from the API.
///
/// The declaration order is the wire order: `Ord` follows it, so a
/// `BTreeSet<AnalysisAttribute>` always iterates logos first and colors last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisAttribute {
    Logos,
    Objects,
    Scenes,
    People,
    Activities,
    Type,
    Subtype,
    ContentSensitivity,
    Texts,
    Embedding,
    Colors,
}

impl AnalysisAttribute {
    /// Every attribute, in declaration order.
    pub const ALL: [AnalysisAttribute; 11] = [
        AnalysisAttribute::Logos,
        AnalysisAttribute::Objects,
        AnalysisAttribute::Scenes,
        AnalysisAttribute::People,
        AnalysisAttribute::Activities,
        AnalysisAttribute::Type,
        AnalysisAttribute::Subtype,
        AnalysisAttribute::ContentSensitivity,
        AnalysisAttribute::Texts,
        AnalysisAttribute::Embedding,
        AnalysisAttribute::Colors,
    ];

    /// The name the API uses for this attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisAttribute::Logos => "logos",
            AnalysisAttribute::Objects => "objects",
            AnalysisAttribute::Scenes => "scenes",
            AnalysisAttribute::People => "people",
            AnalysisAttribute::Activities => "activities",
            AnalysisAttribute::Type => "type",
            AnalysisAttribute::Subtype => "subtype",
            AnalysisAttribute::ContentSensitivity => "content_sensitivity",
            AnalysisAttribute::Texts => "texts",
            AnalysisAttribute::Embedding => "embedding",
            AnalysisAttribute::Colors => "colors",
        }
    }
}

impl fmt::Display for AnalysisAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisAttribute {
    type Err = UnknownAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        AnalysisAttribute::ALL
            .into_iter()
            .find(|attr| attr.as_str() == normalized)
            .ok_or_else(|| UnknownAttributeError::new(s))
    }
}
