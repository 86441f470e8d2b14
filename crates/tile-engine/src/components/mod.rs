pub mod brain;
pub mod dockable;
pub mod entity;
pub mod patrol;
pub mod physics;
pub mod tilemap;
pub mod viewport;
