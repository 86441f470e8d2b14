pub mod properties;
pub mod registry;
pub mod tilemap_data;
