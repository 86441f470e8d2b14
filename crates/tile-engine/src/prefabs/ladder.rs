use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::tilemap::AutobuildRegion;
use crate::core::rect::Rect;

/// Width of the climbable axis in pixels.
pub const AXIS_WIDTH: f32 = 2.0;

/// A climbable ladder built from a region of ladder tiles.
///
/// The collider is a thin vertical axis through the region's horizontal
/// center, so climbers only touch it when lined up with the ladder. The
/// ladder is drawn by its tile layer, never by itself.
pub fn build(region: &AutobuildRegion, id: EntityId) -> Result<Entity, EngineError> {
    let width = region.w as f32 * region.tile_w;
    let x = region.x as f32 * region.tile_w + (width / 2.0).floor() - AXIS_WIDTH / 2.0;
    let y = region.y as f32 * region.tile_h;
    let mut ladder = Entity::new(id)
        .with_tag("ladder")
        .with_rect(Rect::new(x, y, AXIS_WIDTH, region.h as f32 * region.tile_h))
        .with_type(collider_type::LADDER | collider_type::DOCKABLE | collider_type::ONE_WAY_PLATFORM)
        .with_mask(collider_type::NONE)
        .with_properties(region.kwargs.clone());
    ladder.do_render = false;
    Ok(ladder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::properties::Properties;

    fn region(x: u32, y: u32, w: u32, h: u32) -> AutobuildRegion {
        AutobuildRegion {
            class: "Ladder".into(),
            x,
            y,
            w,
            h,
            tile_w: 16.0,
            tile_h: 16.0,
            kwargs: Properties::new(),
        }
    }

    #[test]
    fn ladder_is_a_centered_axis() {
        let ladder = build(&region(2, 1, 1, 4), EntityId(7)).unwrap();
        assert_eq!(ladder.rect, Rect::new(32.0 + 8.0 - 1.0, 16.0, 2.0, 64.0));
        assert_eq!(ladder.rect.center().x, 40.0);
        assert_eq!(ladder.collision_mask, 0);
        assert_ne!(ladder.collider_type & collider_type::LADDER, 0);
        assert_ne!(ladder.collider_type & collider_type::DOCKABLE, 0);
        assert!(!ladder.do_render);
    }

    #[test]
    fn wide_ladder_centers_on_the_region() {
        let ladder = build(&region(0, 0, 3, 1), EntityId(1)).unwrap();
        // 48px wide region, center at 24
        assert_eq!(ladder.rect.left(), 23.0);
    }
}
