//! Type-safe numeric identifier wrappers.
//!
//! The host platform identifies everything by plain integers: item kinds,
//! game-data prop kinds, and live entity handles. Wrapping each in its own
//! newtype prevents passing an item id where a prop id is expected.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around an integer with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident($inner:ty)
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl $name {
            /// Return the raw integer value.
            pub const fn into_inner(self) -> $inner {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Item kind identifier (e.g. 4004 for "Harvesting Gloves").
    ItemId(u32)
}

define_id! {
    /// Game-data prop identifier shared by every instance of a world entity
    /// kind (bush type, monster type).
    PropId(u32)
}

define_id! {
    /// Runtime handle of a live mover (NPC or monster) in the world.
    MoverId(u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_as_raw_integers() {
        assert_eq!(ItemId(4004).to_string(), "4004");
        assert_eq!(PropId(47).to_string(), "47");
        assert_eq!(MoverId(9_000_001).to_string(), "9000001");
    }

    #[test]
    fn ids_convert_both_ways() {
        let id = ItemId::from(3231);
        assert_eq!(u32::from(id), 3231);
        assert_eq!(id.into_inner(), 3231);
    }
}
