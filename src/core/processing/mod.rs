pub mod normalize;
pub mod resample;
pub mod save;
