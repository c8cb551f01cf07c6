//! Value types for detect requests and their per-image results.

pub mod attribute;
pub mod image;
pub mod request;
pub mod result;

pub use attribute::*;
pub use image::*;
pub use request::*;
pub use result::*;
