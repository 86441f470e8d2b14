pub mod collider_type;
pub mod error;
pub mod game;
pub mod types;
