//! Client for the YouScan image recognition API.
//!
//! Build an [`ImageDetectRequest`], hand it to an [`AnalysisClient`] and get
//! back one [`ImageResult`] per submitted image. Network failures are retried
//! with exponential backoff; responses that cannot be decoded are not.

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod parser;
pub mod payload;

pub use client::AnalysisClient;
pub use config::ClientConfig;
pub use domain::{
    AnalysisAttribute, FoundAttribute, FoundColor, FoundText, Image, ImageAnalysisFailedResult,
    ImageAnalysisResult, ImageDetectRequest, ImageDetectResponse, ImageResult, Point,
};
pub use error::{ConfigError, DecodeError, Error, Result, TransportError, ValidationError};
