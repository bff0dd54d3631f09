pub mod placement;
pub mod rotation;
