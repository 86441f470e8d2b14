use thiserror::Error;

use crate::api::types::EntityId;

/// Errors raised while building stages, loading maps and wiring components.
///
/// These all indicate broken content or a programming mistake; none of them
/// is expected once a scene is set up. `QuitRequested` is the one exception:
/// it is how the game loop surfaces the platform's quit signal.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("tile layer `{0}` already exists in stage")]
    DuplicateLayer(String),
    #[error("object group `{0}` already exists in stage")]
    DuplicateGroup(String),
    #[error("unknown collider type `{0}`")]
    UnknownColliderType(String),
    #[error("class `{name}` (layer `{layer}`) is not registered")]
    UnknownClass { name: String, layer: String },
    #[error("malformed tile map: {0}")]
    MalformedMap(String),
    #[error("entity {entity:?} already has a `{component}` component")]
    DuplicateComponent {
        entity: EntityId,
        component: &'static str,
    },
    #[error("a game loop is already alive on this engine context")]
    DuplicateLoop,
    #[error("stage slot {index} is out of range (max {max})")]
    StageSlotOutOfRange { index: usize, max: usize },
    #[error("event `{0}` has not been registered on this bus")]
    UnregisteredEvent(&'static str),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("quit requested by platform")]
    QuitRequested,
    #[error("no game state stored under `{0}`")]
    UnknownStateKey(String),
    #[error("game state `{0}` is not a number")]
    NonNumericState(String),
}
