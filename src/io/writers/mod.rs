pub mod metadata;
pub mod png;
