pub mod analysis;
pub mod area;
pub mod point;
