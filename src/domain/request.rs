use std::collections::BTreeSet;

use super::{AnalysisAttribute, Image};
use crate::error::ValidationError;

/// A batch of images to analyse together in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDetectRequest {
    images: Vec<Image>,
    attributes: BTreeSet<AnalysisAttribute>,
    optimize_throughput: bool,
}

impl ImageDetectRequest {
    /// Requests every attribute with throughput optimization off.
    pub fn new(images: Vec<Image>) -> Result<Self, ValidationError> {
        if images.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        Ok(Self {
            images,
            attributes: AnalysisAttribute::ALL.into_iter().collect(),
            optimize_throughput: false,
        })
    }

    /// Replaces the requested attributes. Duplicates collapse.
    pub fn with_attributes(
        mut self,
        attributes: impl IntoIterator<Item = AnalysisAttribute>,
    ) -> Result<Self, ValidationError> {
        let attributes: BTreeSet<_> = attributes.into_iter().collect();
        if attributes.is_empty() {
            return Err(ValidationError::NoAttributes);
        }
        self.attributes = attributes;
        Ok(self)
    }

    pub fn with_optimize_throughput(mut self, optimize_throughput: bool) -> Self {
        self.optimize_throughput = optimize_throughput;
        self
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Requested attributes in declaration order.
    pub fn attributes(&self) -> &BTreeSet<AnalysisAttribute> {
        &self.attributes
    }

    pub fn optimize_throughput(&self) -> bool {
        self.optimize_throughput
    }
}
