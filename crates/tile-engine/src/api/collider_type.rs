//! Collider type bits.
//!
//! Every entity and tile layer carries a `u32` type mask describing what kind
//! of collider it is, and entities additionally carry a collision mask of the
//! types they test against. Map content refers to the bits by name, usually
//! as comma-separated lists (`"ladder,dockable"`).

use crate::api::error::EngineError;

pub const NONE: u32 = 0x0;
pub const DEFAULT: u32 = 0x1;
pub const ONE_WAY_PLATFORM: u32 = 0x2;
pub const DOCKABLE: u32 = 0x4;
pub const LADDER: u32 = 0x8;
pub const LIQUID: u32 = 0x10;
pub const ENEMY: u32 = 0x20;
pub const FRIENDLY: u32 = 0x40;
pub const PARTICLE: u32 = 0x80;
pub const ARROW: u32 = 0x100;

const NAMED: [(&str, u32); 10] = [
    ("none", NONE),
    ("default", DEFAULT),
    ("one_way_platform", ONE_WAY_PLATFORM),
    ("dockable", DOCKABLE),
    ("ladder", LADDER),
    ("liquid", LIQUID),
    ("enemy", ENEMY),
    ("friendly", FRIENDLY),
    ("particle", PARTICLE),
    ("arrow", ARROW),
];

/// Look up a single type bit by name.
pub fn by_name(name: &str) -> Option<u32> {
    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, bits)| *bits)
}

/// Parse a comma-separated list of type names into a mask.
/// Whitespace around names is ignored; an empty string is `NONE`.
pub fn parse(list: &str) -> Result<u32, EngineError> {
    let mut mask = NONE;
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        mask |= by_name(name).ok_or_else(|| EngineError::UnknownColliderType(name.to_string()))?;
    }
    Ok(mask)
}

/// Names of all bits set in `mask`, in bit order.
pub fn names(mask: u32) -> Vec<&'static str> {
    NAMED
        .iter()
        .filter(|(_, bits)| *bits != NONE && mask & bits != 0)
        .map(|(n, _)| *n)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_lists() {
        assert_eq!(parse("ladder,dockable").unwrap(), LADDER | DOCKABLE);
        assert_eq!(parse(" default , one_way_platform ").unwrap(), DEFAULT | ONE_WAY_PLATFORM);
        assert_eq!(parse("").unwrap(), NONE);
        assert_eq!(parse("none").unwrap(), NONE);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = parse("default,lava").unwrap_err();
        assert!(matches!(err, EngineError::UnknownColliderType(ref n) if n == "lava"));
    }

    #[test]
    fn names_lists_set_bits() {
        assert_eq!(names(DOCKABLE | DEFAULT), vec!["default", "dockable"]);
        assert!(names(NONE).is_empty());
    }
}
