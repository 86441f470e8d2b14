//! Rendering contract.
//!
//! The engine does not draw anything itself. A stage walks its draw list in
//! ascending render order and hands each tile layer or entity to a
//! [`Surface`] together with the camera offset; the backend decides what a
//! "draw" means (blitting, terminal output, recording for tests).

use glam::Vec2;

use crate::api::types::{EntityId, LayerId};
use crate::components::entity::Entity;
use crate::components::tilemap::TileLayer;

/// Something a stage can draw onto.
pub trait Surface {
    /// Called once per frame before any stage renders.
    fn clear(&mut self) {}

    /// Draw a whole tile layer, translated by `offset` pixels.
    fn draw_layer(&mut self, layer: &TileLayer, offset: Vec2);

    /// Draw one entity, translated by `offset` pixels.
    fn draw_entity(&mut self, entity: &Entity, offset: Vec2);
}

/// One entry of a stage's draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawItem {
    Layer(LayerId),
    Entity(EntityId),
}

/// A surface that draws nothing. Useful for headless stepping.
#[derive(Debug, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn draw_layer(&mut self, _layer: &TileLayer, _offset: Vec2) {}

    fn draw_entity(&mut self, _entity: &Entity, _offset: Vec2) {}
}
