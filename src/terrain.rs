use crate::error::EditorError;
use crate::tile_info::TileInfoStore;
use tracing::debug;

/// Terrain masks are `u32`, so the registry tops out at 32 names.
pub const MAX_TERRAINS: usize = 32;

/// Drops bit `index` from `mask` and shifts every higher bit down by one.
#[inline]
pub fn remove_bit(mask: u32, index: usize) -> u32 {
    if index >= MAX_TERRAINS {
        return mask;
    }
    let pivot = (1u32 << index) - 1;
    (mask & pivot) | ((mask >> 1) & !pivot)
}

/// Mask with the bits `0..len` set.
#[inline]
pub fn valid_bits(len: usize) -> u32 {
    if len >= MAX_TERRAINS {
        u32::MAX
    } else {
        (1u32 << len) - 1
    }
}

/// Ordered list of terrain names. Position `k` is bit `k` of every
/// [`TileInfo::terrain`](crate::TileInfo::terrain) mask.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerrainRegistry {
    names: Vec<String>,
}

impl TerrainRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names by bit index.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Bit index of `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Bit for `name`, if registered.
    pub fn bit(&self, name: &str) -> Option<u32> {
        self.index_of(name).map(|i| 1u32 << i)
    }

    /// Appends `name`. Empty names, duplicates and a full registry are
    /// ignored; returns whether the name was added.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.index_of(name).is_some() || self.names.len() >= MAX_TERRAINS {
            return false;
        }
        self.names.push(name.to_owned());
        debug!(terrain = name, index = self.names.len() - 1, "terrain added");
        true
    }

    /// Removes `name` and rewrites every mask in `store` so the remaining
    /// bits keep naming the same terrains.
    pub fn remove(&mut self, name: &str, store: &mut TileInfoStore) -> Result<usize, EditorError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| EditorError::TerrainNotFound(name.to_owned()))?;
        self.names.remove(index);
        for info in store.iter_mut() {
            info.terrain = remove_bit(info.terrain, index);
        }
        debug!(terrain = name, index, "terrain removed");
        Ok(index)
    }

    /// Names whose bit is set in `mask`, in registry order.
    pub fn describe(&self, mask: u32) -> Vec<&str> {
        self.names
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, n)| n.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(names: &[&str]) -> TerrainRegistry {
        let mut r = TerrainRegistry::new();
        for n in names {
            assert!(r.add(n));
        }
        r
    }

    #[test]
    fn add_ignores_empty_and_duplicate_names() {
        let mut r = registry(&["grass"]);
        assert!(!r.add(""));
        assert!(!r.add("  "));
        assert!(!r.add("grass"));
        assert_eq!(r.names(), ["grass"]);
    }

    #[test]
    fn remove_bit_keeps_lower_and_shifts_higher_bits() {
        assert_eq!(remove_bit(0b101, 1), 0b11);
        assert_eq!(remove_bit(0b111, 0), 0b11);
        assert_eq!(remove_bit(0b1000_0001, 3), 0b0100_0001);
        assert_eq!(remove_bit(u32::MAX, 31), u32::MAX >> 1);
    }

    #[test]
    fn remove_bit_matches_bitwise_definition() {
        let masks = [0u32, 1, 0b1011_0110, 0xDEAD_BEEF, u32::MAX];
        for &m in &masks {
            for i in 0..MAX_TERRAINS {
                let out = remove_bit(m, i);
                for k in 0..31 {
                    let expected = if k < i { (m >> k) & 1 } else { (m >> (k + 1)) & 1 };
                    assert_eq!((out >> k) & 1, expected, "mask {m:#x} index {i} bit {k}");
                }
            }
        }
    }

    #[test]
    fn remove_unknown_terrain_leaves_state_alone() {
        let mut r = registry(&["grass", "water"]);
        let mut store = TileInfoStore::new(1, 1);
        store.get_mut(0, 0).unwrap().terrain = 0b11;
        let err = r.remove("lava", &mut store).unwrap_err();
        assert!(matches!(err, EditorError::TerrainNotFound(n) if n == "lava"));
        assert_eq!(r.len(), 2);
        assert_eq!(store.at(0, 0).terrain, 0b11);
    }

    #[test]
    fn describe_lists_set_bits() {
        let r = registry(&["grass", "water", "sand"]);
        assert_eq!(r.describe(0b101), vec!["grass", "sand"]);
        assert_eq!(r.bit("water"), Some(0b10));
        assert_eq!(valid_bits(r.len()), 0b111);
    }
}
