pub mod normalize;
pub mod severity;
