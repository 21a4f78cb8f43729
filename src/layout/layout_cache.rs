use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::justified::{JustifiedLayout, RowBreak, Tile};
use crate::models::RowModel;

/// Maximum number of cached layouts to keep in memory.
const MAX_CACHE_ENTRIES: usize = 8;

/// Key for the layout cache. Floats are keyed by their bit patterns, so
/// only an identical width and target height hit.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct CacheKey {
    width_bits: u64,
    target_bits: u64,
    params_hash: u64,
    list_hash: u64,
}

impl CacheKey {
    fn new(layout: &JustifiedLayout, container_width: f64, target_height: f64, list_hash: u64) -> Self {
        Self {
            width_bits: container_width.to_bits(),
            target_bits: target_height.to_bits(),
            params_hash: LayoutCache::params_hash(layout),
            list_hash,
        }
    }
}

/// Cached layout data: the row breaks that can reconstruct the full layout.
#[derive(Debug, Clone)]
struct CachedLayout {
    breaks: Vec<RowBreak>,
    /// Number of tiles this layout was computed for
    item_count: usize,
}

/// Layout cache for storing and retrieving row breaks.
///
/// Keyed by (container width, target height, packing parameters, list hash).
/// The list hash covers every tile's working dimensions in display order,
/// so a shuffle, a new media list or changed clamp options all miss.
pub struct LayoutCache {
    cache: Mutex<LruCache<CacheKey, CachedLayout>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(MAX_CACHE_ENTRIES).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Computes a fast hash of the tile list.
    pub fn compute_list_hash(tiles: &[Tile]) -> u64 {
        let mut hasher_input = Vec::with_capacity(tiles.len() * 16);
        for tile in tiles {
            hasher_input.extend_from_slice(&tile.width.to_le_bytes());
            hasher_input.extend_from_slice(&tile.height.to_le_bytes());
        }
        xxh3_64(&hasher_input)
    }

    fn params_hash(layout: &JustifiedLayout) -> u64 {
        let mut input = Vec::with_capacity(17);
        input.extend_from_slice(&layout.gap.to_le_bytes());
        input.extend_from_slice(&(layout.max_rows as u64).to_le_bytes());
        input.push(u8::from(layout.stretch_last_row));
        xxh3_64(&input)
    }

    /// Attempts to retrieve cached rows, reconstructing them from breaks.
    /// Returns None on cache miss.
    pub fn get(
        &self,
        layout: &JustifiedLayout,
        tiles: &[Tile],
        container_width: f64,
        target_height: f64,
    ) -> Option<Vec<RowModel>> {
        let key = CacheKey::new(
            layout,
            container_width,
            target_height,
            Self::compute_list_hash(tiles),
        );

        let breaks = {
            let mut cache = self.cache.lock();
            let entry = cache.get(&key)?;
            if entry.item_count != tiles.len() {
                return None;
            }
            entry.breaks.clone()
        };

        Some(layout.rows_from_breaks(tiles, &breaks))
    }

    /// Stores row breaks in the cache.
    pub fn set(
        &self,
        layout: &JustifiedLayout,
        tiles: &[Tile],
        container_width: f64,
        target_height: f64,
        breaks: Vec<RowBreak>,
    ) {
        let key = CacheKey::new(
            layout,
            container_width,
            target_height,
            Self::compute_list_hash(tiles),
        );
        self.cache.lock().put(
            key,
            CachedLayout {
                breaks,
                item_count: tiles.len(),
            },
        );
    }

    /// Computes the layout, using cached breaks if available.
    pub fn compute(
        &self,
        layout: &JustifiedLayout,
        tiles: &[Tile],
        container_width: f64,
        target_height: f64,
    ) -> Vec<RowModel> {
        if tiles.is_empty() {
            return Vec::new();
        }
        if let Some(rows) = self.get(layout, tiles, container_width, target_height) {
            return rows;
        }

        let breaks = layout.compute_breaks(tiles, container_width, target_height);
        let rows = layout.rows_from_breaks(tiles, &breaks);
        self.set(layout, tiles, container_width, target_height, breaks);
        rows
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Returns the number of cached layouts.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}
