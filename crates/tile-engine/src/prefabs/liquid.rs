use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::assets::properties::PropertyValue;
use crate::components::entity::Entity;
use crate::components::tilemap::AutobuildRegion;
use crate::core::rect::Rect;

/// Fraction of the top tile row that shows only the liquid's surface.
pub const SURFACE_DEPTH: f32 = 0.9;

/// A body of liquid (water, quicksand) built from a region of liquid tiles.
/// The collider starts below the surface row so actors sink in before they
/// touch it. The kind of liquid is kept in the `description` property.
pub fn build(region: &AutobuildRegion, id: EntityId) -> Result<Entity, EngineError> {
    let surface = (region.tile_h * SURFACE_DEPTH).floor();
    let rect = Rect::new(
        region.x as f32 * region.tile_w,
        region.y as f32 * region.tile_h + surface,
        region.w as f32 * region.tile_w,
        region.h as f32 * region.tile_h - surface,
    );
    let mut properties = region.kwargs.clone();
    properties
        .entry("description".to_string())
        .or_insert_with(|| PropertyValue::Str("quicksand".into()));
    let mut liquid = Entity::new(id)
        .with_tag("liquid")
        .with_rect(rect)
        .with_type(collider_type::LIQUID)
        .with_mask(collider_type::NONE)
        .with_properties(properties);
    liquid.do_render = false;
    Ok(liquid)
}
