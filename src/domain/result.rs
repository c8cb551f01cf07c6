use serde::{Deserialize, Deserializer, Serialize};

use super::AnalysisAttribute;

/// A labeled detection with a confidence score, expected in `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundAttribute {
    pub label: String,
    pub confidence: f64,
}

/// Pixel coordinate on the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Recognized text and the rectangle it was found in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundText {
    pub label: String,
    pub confidence: f64,
    pub topleft: Point,
    pub bottomright: Point,
}

impl FoundText {
    pub fn attribute(&self) -> FoundAttribute {
        FoundAttribute {
            label: self.label.clone(),
            confidence: self.confidence,
        }
    }
}

/// A color found in the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundColor {
    pub color: String,
    /// Simplified canonical color.
    pub shade: String,
    /// Share of the image area covered by this color.
    pub percentage: f64,
}

/// Successful analysis of a single image.
///
/// Attribute lists that were not requested, or not returned, are empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysisResult {
    pub version: String,
    pub cached: bool,
    #[serde(default)]
    pub cache_origin: Option<String>,
    pub cached_attributes: Vec<AnalysisAttribute>,
    pub hash: String,
    pub elapsed: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub logos: Vec<FoundAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<FoundAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scenes: Vec<FoundAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub people: Vec<FoundAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: Vec<FoundAttribute>,
    #[serde(rename = "type", default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_sensitivity: Vec<FoundAttribute>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub texts: Vec<FoundText>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub embedding: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<FoundColor>,
}

/// The server could not analyse one image of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisFailedResult {
    #[serde(deserialize_with = "status_text")]
    pub status: String,
    #[serde(rename = "error", alias = "error_text", default)]
    pub error_text: String,
}

/// Outcome for one image of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageResult {
    Success(Box<ImageAnalysisResult>),
    Failed(ImageAnalysisFailedResult),
}

impl ImageResult {
    pub fn as_success(&self) -> Option<&ImageAnalysisResult> {
        match self {
            ImageResult::Success(result) => Some(result),
            ImageResult::Failed(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ImageAnalysisFailedResult> {
        match self {
            ImageResult::Success(_) => None,
            ImageResult::Failed(failure) => Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ImageResult::Success(_))
    }
}

/// One result per submitted image, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageDetectResponse {
    pub results: Vec<ImageResult>,
}

impl ImageDetectResponse {
    pub fn successes(&self) -> impl Iterator<Item = &ImageAnalysisResult> {
        self.results.iter().filter_map(ImageResult::as_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ImageAnalysisFailedResult> {
        self.results.iter().filter_map(ImageResult::as_failure)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API reports failure status either as a string or as a numeric code.
/// A null status still marks the item as failed, with empty status text.
fn status_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Code(i64),
    }

    Ok(match Option::<Status>::deserialize(deserializer)? {
        Some(Status::Text(text)) => text,
        Some(Status::Code(code)) => code.to_string(),
        None => String::new(),
    })
}
