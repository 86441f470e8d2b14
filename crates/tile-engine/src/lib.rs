pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod prefabs;

// Re-export key types at crate root for convenience
pub use api::collider_type;
pub use api::error::EngineError;
pub use api::game::{EngineConfig, EngineContext, PhysicsConfig};
pub use api::types::{Axis, ColliderRef, EntityId, LayerId};
pub use assets::properties::{Properties, PropertyValue};
pub use assets::registry::{EntityRegistry, SpawnRequest};
pub use assets::tilemap_data::{LayerData, MapObject, ObjectLayerData, TileLayerData, TileMapData};
pub use components::brain::{Brain, Commands};
pub use components::dockable::Dockable;
pub use components::entity::{Entity, MoveModifier};
pub use components::patrol::Patrol;
pub use components::physics::{Bump, TopDownPhysics};
pub use components::tilemap::{AutobuildRegion, TileCollider, TileLayer};
pub use components::viewport::{FollowAxes, Viewport};
pub use core::algorithms::{Body, Detector};
pub use core::collision::Collision;
pub use core::events::{EventBus, EventKind, EventPayload, EventTarget, GameEvent};
pub use core::game_loop::{GameLoop, Platform, PlatformEvent, StopHandle};
pub use core::rect::Rect;
pub use core::stage::{Stage, StageOptions};
pub use core::state::{ListenerId, State};
pub use input::keyboard::{InputEvent, KeyState, KeyboardInputs};
pub use renderer::{DrawItem, NullSurface, Surface};
