//! Tile layers: dense grids of static tile colliders.
//!
//! Each occupied cell holds a [`TileCollider`] with its world rectangle,
//! collider type and coerced tile properties. Cells are stored row-major
//! (`index = y * width + x`) and never change after construction.

use glam::Vec2;
use log::debug;

use crate::api::collider_type;
use crate::api::error::EngineError;
use crate::api::types::{Axis, ColliderRef, LayerId};
use crate::assets::properties::{coerce_all, Properties, PropertyValue};
use crate::assets::tilemap_data::{TileLayerData, TileMapData};
use crate::core::algorithms::{Body, Detector};
use crate::core::collision::Collision;
use crate::core::rect::Rect;

/// Tile property naming the class an autobuild region is built as.
pub const AUTOBUILD_CLASS: &str = "autobuild_class";
/// Tile property prefix marking constructor arguments for autobuild classes.
pub const AUTOBUILD_ARG_PREFIX: &str = "P_";

/// One occupied cell of a tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCollider {
    pub rect: Rect,
    pub gid: u32,
    pub tile_x: u32,
    pub tile_y: u32,
    /// Layer type plus `dockable`: anything can stand on a tile.
    pub collider_type: u32,
    pub props: Properties,
    /// `P_`-prefixed properties (prefix stripped) of autobuild tiles.
    pub autobuild_kwargs: Properties,
}

impl TileCollider {
    pub fn prop(&self, key: &str) -> Option<&PropertyValue> {
        self.props.get(key)
    }

    /// Whether this tile ends the level when touched.
    pub fn is_exit(&self) -> bool {
        self.prop("exit").is_some_and(PropertyValue::is_truthy)
    }
}

/// Inclusive tile-coordinate bounds of a rectangle, clamped into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

/// A rectangle of same-tagged tiles found by autobuild extraction.
/// Position and size are in tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct AutobuildRegion {
    pub class: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub tile_w: f32,
    pub tile_h: f32,
    pub kwargs: Properties,
}

#[derive(Debug, Clone)]
pub struct TileLayer {
    /// Assigned by the stage when the layer is added.
    pub id: LayerId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_w: f32,
    pub tile_h: f32,
    /// World position of the grid's top-left corner.
    pub origin: Vec2,
    pub collider_type: u32,
    pub do_render: bool,
    pub render_order: i32,
    /// Extract autobuild regions when the layer is loaded into a stage.
    pub autobuild_objects: bool,
    pub properties: Properties,
    tiles: Vec<Option<TileCollider>>,
}

impl TileLayer {
    /// Empty layer; fails on a zero-sized grid or tile.
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        tile_w: f32,
        tile_h: f32,
    ) -> Result<Self, EngineError> {
        let name = name.into();
        if width == 0 || height == 0 || tile_w <= 0.0 || tile_h <= 0.0 {
            return Err(EngineError::MalformedMap(format!(
                "layer `{}` has an empty grid ({}x{} tiles of {}x{})",
                name, width, height, tile_w, tile_h
            )));
        }
        Ok(Self {
            id: LayerId(0),
            name,
            width,
            height,
            tile_w,
            tile_h,
            origin: Vec2::ZERO,
            collider_type: collider_type::NONE,
            do_render: true,
            render_order: 0,
            autobuild_objects: false,
            properties: Properties::new(),
            tiles: vec![None; (width * height) as usize],
        })
    }

    pub fn with_type(mut self, mask: u32) -> Self {
        self.collider_type = mask;
        for tile in self.tiles.iter_mut().flatten() {
            tile.collider_type = mask | collider_type::DOCKABLE;
        }
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        let delta = origin - self.origin;
        self.origin = origin;
        for tile in self.tiles.iter_mut().flatten() {
            tile.rect.translate(delta);
        }
        self
    }

    pub fn with_render_order(mut self, render_order: i32) -> Self {
        self.render_order = render_order;
        self
    }

    /// Place a tile. Raw string properties are coerced; `P_` arguments are
    /// split off for tiles that carry an `autobuild_class`.
    pub fn with_tile<'a, I>(mut self, x: u32, y: u32, gid: u32, raw_props: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        if x >= self.width || y >= self.height {
            return self;
        }
        let mut props = coerce_all(raw_props);
        let mut autobuild_kwargs = Properties::new();
        if props.contains_key(AUTOBUILD_CLASS) {
            let args: Vec<String> = props
                .keys()
                .filter(|k| k.starts_with(AUTOBUILD_ARG_PREFIX))
                .cloned()
                .collect();
            for key in args {
                if let Some(value) = props.remove(&key) {
                    autobuild_kwargs.insert(key[AUTOBUILD_ARG_PREFIX.len()..].to_string(), value);
                }
            }
        }
        let rect = Rect::new(
            self.origin.x + x as f32 * self.tile_w,
            self.origin.y + y as f32 * self.tile_h,
            self.tile_w,
            self.tile_h,
        );
        let idx = self.index(x, y);
        self.tiles[idx] = Some(TileCollider {
            rect,
            gid,
            tile_x: x,
            tile_y: y,
            collider_type: self.collider_type | collider_type::DOCKABLE,
            props,
            autobuild_kwargs,
        });
        self
    }

    /// Build a layer from parsed map data. Layer properties: `type`
    /// (collider type list, default `none`), `do_render` (default true),
    /// `render_order` (default 0), `autobuild_objects` (default false).
    pub fn from_map_layer(map: &TileMapData, data: &TileLayerData) -> Result<Self, EngineError> {
        let expected = (map.width as usize) * (map.height as usize);
        if data.data.len() != expected {
            return Err(EngineError::MalformedMap(format!(
                "layer `{}` has {} cells, expected {}",
                data.name,
                data.data.len(),
                expected
            )));
        }

        let properties = coerce_all(&data.properties);
        let type_list = data.properties.get("type").map(String::as_str).unwrap_or("none");
        let mut layer = TileLayer::new(
            data.name.clone(),
            map.width,
            map.height,
            map.tile_width as f32,
            map.tile_height as f32,
        )?
        .with_type(collider_type::parse(type_list)?);

        layer.do_render = properties
            .get("do_render")
            .and_then(PropertyValue::as_bool)
            .unwrap_or(true);
        layer.render_order = properties
            .get("render_order")
            .and_then(PropertyValue::as_i64)
            .unwrap_or(0) as i32;
        layer.autobuild_objects = properties
            .get("autobuild_objects")
            .and_then(PropertyValue::as_bool)
            .unwrap_or(false);
        layer.properties = properties;

        let empty = std::collections::HashMap::new();
        for (i, &gid) in data.data.iter().enumerate() {
            if gid == 0 {
                continue;
            }
            let x = i as u32 % map.width;
            let y = i as u32 / map.width;
            let raw = map.tile_properties(gid).unwrap_or(&empty);
            layer = layer.with_tile(x, y, gid, raw);
        }
        debug!(
            "tile layer `{}`: {} tiles, type {:?}",
            layer.name,
            layer.tile_count(),
            collider_type::names(layer.collider_type)
        );
        Ok(layer)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Get the tile at grid position (x, y).
    pub fn get(&self, x: u32, y: u32) -> Option<&TileCollider> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.tiles[self.index(x, y)].as_ref()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileCollider> {
        self.tiles.iter().flatten()
    }

    /// Count of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Tiles a rectangle covers, clamped into `[0, width-1] x [0, height-1]`.
    pub fn overlapping_tile_range(&self, rect: &Rect) -> TileRange {
        let local = rect.pos - self.origin;
        let clamp = |v: f32, max: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as i64).min(max as i64) as u32
            }
        };
        let (w, h) = (self.width - 1, self.height - 1);
        TileRange {
            min_x: clamp((local.x / self.tile_w).floor(), w),
            max_x: clamp(((local.x + rect.size.x) / self.tile_w).ceil() - 1.0, w),
            min_y: clamp((local.y / self.tile_h).floor(), h),
            max_y: clamp(((local.y + rect.size.y) / self.tile_h).ceil() - 1.0, h),
        }
    }

    fn body(&self, tile: &TileCollider) -> Body {
        Body::new(
            ColliderRef::Tile {
                layer: self.id,
                x: tile.tile_x,
                y: tile.tile_y,
            },
            tile.rect,
        )
    }

    /// Scan the overlapped tiles in the direction of travel and return the
    /// first hit. Columns (for x) or rows (for y) are visited ascending when
    /// moving in the positive direction, descending otherwise.
    pub fn collide_along_axis(
        &self,
        mover: Body,
        axis: Axis,
        veloc: f32,
        original_pos: Vec2,
        detector: Detector,
    ) -> Option<Collision> {
        if veloc == 0.0 {
            return None;
        }
        let range = self.overlapping_tile_range(&mover.rect);
        let (outer, inner): (Vec<u32>, Vec<u32>) = match axis {
            Axis::X => (ordered(range.min_x, range.max_x, veloc), (range.min_y..=range.max_y).collect()),
            Axis::Y => (ordered(range.min_y, range.max_y, veloc), (range.min_x..=range.max_x).collect()),
        };
        for &a in &outer {
            for &b in &inner {
                let (x, y) = match axis {
                    Axis::X => (a, b),
                    Axis::Y => (b, a),
                };
                let Some(tile) = self.get(x, y) else { continue };
                if let Some(col) = detector.collide(mover, self.body(tile), axis, veloc, Some(original_pos)) {
                    return Some(col);
                }
            }
        }
        None
    }

    /// First hit in plain column-major order, for colliders that do not
    /// resolve their own movement.
    pub fn collide_simple(
        &self,
        mover: Body,
        axis: Axis,
        veloc: f32,
        detector: Detector,
    ) -> Option<Collision> {
        let range = self.overlapping_tile_range(&mover.rect);
        for x in range.min_x..=range.max_x {
            for y in range.min_y..=range.max_y {
                let Some(tile) = self.get(x, y) else { continue };
                if let Some(col) = detector.collide(mover, self.body(tile), axis, veloc, Some(mover.rect.pos)) {
                    return Some(col);
                }
            }
        }
        None
    }

    fn tag_at(&self, x: u32, y: u32, key: &str) -> Option<&PropertyValue> {
        self.get(x, y).and_then(|t| t.prop(key))
    }

    /// Group tiles tagged with `key` into rectangles.
    ///
    /// Regions are anchored at a tagged tile whose left and top neighbours do
    /// not carry the same tag, and measured right along the first row and
    /// down along the first column. Non-rectangular areas only yield their
    /// anchor's row/column extent.
    pub fn autobuild_regions(&self, key: &str) -> Vec<AutobuildRegion> {
        let mut regions = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(tile) = self.get(x, y) else { continue };
                let Some(tag) = tile.prop(key) else { continue };
                let same = |v: Option<&PropertyValue>| v == Some(tag);
                if (x > 0 && same(self.tag_at(x - 1, y, key)))
                    || (y > 0 && same(self.tag_at(x, y - 1, key)))
                {
                    continue;
                }
                let w = (x..self.width).take_while(|&x2| same(self.tag_at(x2, y, key))).count() as u32;
                let h = (y..self.height).take_while(|&y2| same(self.tag_at(x, y2, key))).count() as u32;
                let class = match tag {
                    PropertyValue::Class(name) | PropertyValue::Str(name) => name.clone(),
                    other => format!("{:?}", other),
                };
                regions.push(AutobuildRegion {
                    class,
                    x,
                    y,
                    w,
                    h,
                    tile_w: self.tile_w,
                    tile_h: self.tile_h,
                    kwargs: tile.autobuild_kwargs.clone(),
                });
            }
        }
        regions
    }
}

fn ordered(min: u32, max: u32, veloc: f32) -> Vec<u32> {
    if veloc > 0.0 {
        (min..=max).collect()
    } else {
        (min..=max).rev().collect()
    }
}
