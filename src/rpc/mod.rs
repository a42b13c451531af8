pub mod analyze_parcel;
pub mod compute_area;
pub mod extract_points;
pub mod get_sources;
pub mod handler;
