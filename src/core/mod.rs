//! Core rendering building blocks: render parameters, the Cartesian raster,
//! intensity normalization, polar resampling and save/load helpers. These are
//! internal primitives consumed by the high-level `api` module.
pub mod params;
pub mod processing;
pub mod raster;
