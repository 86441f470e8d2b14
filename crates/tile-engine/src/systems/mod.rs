pub mod patrol;
pub mod physics;
