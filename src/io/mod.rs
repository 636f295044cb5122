//! I/O layer: the attribute directory, capture decoding (`header`, `samples`,
//! `polar`) and `writers` for PNG output with embedded header metadata.
pub mod directory;
pub use directory::{AttributeCategory, AttributeDirectory, AttributeInfo};

pub mod header;
pub use header::{AttributeValue, Header, HeaderAttribute, HeaderLayout, decode_header};

pub mod samples;
pub use samples::{SampleGrid, decode_samples};

pub mod polar;
pub use polar::PolarImage;

pub mod writers;
