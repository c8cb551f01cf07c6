//! Wire JSON for detect requests.

use serde_json::{Value, json};
use std::collections::BTreeSet;

use crate::domain::{AnalysisAttribute, Image, ImageDetectRequest};

/// `{"url": ...}` when the image has a URL, `{"content": ...}` otherwise.
pub fn build_image_payload(image: &Image) -> Value {
    match image.url() {
        Some(url) => json!({ "url": url }),
        None => json!({ "content": image.b64_content().unwrap_or_default() }),
    }
}

/// Attribute names in declaration order.
pub fn build_attributes_payload(attributes: &BTreeSet<AnalysisAttribute>) -> Vec<&'static str> {
    attributes.iter().map(|attr| attr.as_str()).collect()
}

pub fn build_detect_payload(request: &ImageDetectRequest) -> Value {
    let images: Vec<Value> = request.images().iter().map(build_image_payload).collect();

    json!({
        "images": images,
        "attributes": build_attributes_payload(request.attributes()),
        "optimize_throughput": request.optimize_throughput(),
    })
}
