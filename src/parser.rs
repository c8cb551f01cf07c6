//! Turns detect responses into typed results.
//!
//! A batch is not transactional on the server side: any image may fail while
//! the others succeed. Each item of `results` is decoded on its own, and the
//! presence of a `status` key marks it as a failure.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    FoundAttribute, FoundColor, FoundText, ImageAnalysisFailedResult, ImageAnalysisResult,
    ImageDetectResponse, ImageResult,
};
use crate::error::DecodeError;

fn decode<'a, T: Deserialize<'a>>(what: &str, obj: &'a Value) -> Result<T, DecodeError> {
    T::deserialize(obj)
        .map_err(|e| DecodeError::new(format!("invalid {}: {}", what, e), obj.to_string()))
}

pub fn parse_found_attribute(obj: &Value) -> Result<FoundAttribute, DecodeError> {
    decode("found attribute", obj)
}

pub fn parse_found_text(obj: &Value) -> Result<FoundText, DecodeError> {
    decode("found text", obj)
}

pub fn parse_color(obj: &Value) -> Result<FoundColor, DecodeError> {
    decode("color", obj)
}

pub fn parse_success_result(obj: &Value) -> Result<ImageAnalysisResult, DecodeError> {
    decode("image analysis result", obj)
}

pub fn parse_failed_result(obj: &Value) -> Result<ImageAnalysisFailedResult, DecodeError> {
    decode("failed image result", obj)
}

/// Selects the failure variant when the item carries a `status` key.
pub fn parse_image_result(obj: &Value) -> Result<ImageResult, DecodeError> {
    if obj.get("status").is_some() {
        parse_failed_result(obj).map(ImageResult::Failed)
    } else {
        parse_success_result(obj).map(|result| ImageResult::Success(Box::new(result)))
    }
}

/// Decodes a whole response. Results keep the order of the `results` array;
/// matching them against the submitted images is up to the caller.
pub fn parse_detect_response(obj: &Value) -> Result<ImageDetectResponse, DecodeError> {
    let Some(results) = obj.get("results") else {
        return Err(DecodeError::new(
            "'results' field is not in the response",
            obj.to_string(),
        ));
    };

    let Some(items) = results.as_array() else {
        return Err(DecodeError::new(
            "'results' field is not an array",
            obj.to_string(),
        ));
    };

    let results = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_image_result(item).map_err(|e| {
                DecodeError::new(
                    format!("results[{}]: {}", index, e.reason()),
                    obj.to_string(),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ImageDetectResponse { results })
}

/// Decodes a raw response body.
pub fn parse_detect_body(body: &str) -> Result<ImageDetectResponse, DecodeError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| DecodeError::new(format!("response is not valid JSON: {}", e), body))?;
    parse_detect_response(&value)
}
