use crate::models::{RowItem, RowModel};

/// Working size of one item, after fallback and ratio clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub width: f64,
    pub height: f64,
}

impl Tile {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Configuration for the justified row packing.
///
/// Items are packed greedily left-to-right at a target height, then each
/// row is scaled so it spans the container exactly. The last row is
/// rebalanced or capped depending on `stretch_last_row`.
#[derive(Debug, Clone)]
pub struct JustifiedLayout {
    /// Gap between items and between rows in pixels (default: 4)
    pub gap: f64,
    /// Maximum number of rows, 0 for unlimited (default: 0)
    pub max_rows: usize,
    /// Justify the final row too (default: true)
    pub stretch_last_row: bool,
}

impl Default for JustifiedLayout {
    fn default() -> Self {
        Self {
            gap: 4.0,
            max_rows: 0,
            stretch_last_row: true,
        }
    }
}

impl JustifiedLayout {
    pub fn new(gap: f64, max_rows: usize, stretch_last_row: bool) -> Self {
        Self {
            gap,
            max_rows,
            stretch_last_row,
        }
    }

    /// Computes the justified layout for a list of tiles.
    ///
    /// # Algorithm
    /// 1. Pack tiles at `target_height`, closing a row when the next tile
    ///    would overshoot more than the row currently falls short.
    /// 2. Fold a one- or two-item remainder into the previous rows.
    /// 3. Size each row so its tiles plus gaps span `container_width`.
    ///
    /// # Arguments
    /// * `tiles` - Working dimensions, in display order
    /// * `container_width` - The available width in pixels
    /// * `target_height` - Preferred row height in pixels
    ///
    /// # Returns
    /// A vector of RowModels with item indices into `tiles`.
    pub fn compute(&self, tiles: &[Tile], container_width: f64, target_height: f64) -> Vec<RowModel> {
        let breaks = self.compute_breaks(tiles, container_width, target_height);
        self.rows_from_breaks(tiles, &breaks)
    }

    /// Computes row breaks and per-row heights, the minimal data the layout
    /// cache stores.
    pub fn compute_breaks(
        &self,
        tiles: &[Tile],
        container_width: f64,
        target_height: f64,
    ) -> Vec<RowBreak> {
        if tiles.is_empty() || container_width <= 0.0 || target_height <= 0.0 {
            return Vec::new();
        }

        let ranges = self.pack(tiles, container_width, target_height);
        let last = ranges.len().saturating_sub(1);
        ranges
            .into_iter()
            .enumerate()
            .map(|(row_idx, (start, end))| {
                self.size_row(
                    &tiles[start..end],
                    start,
                    end,
                    container_width,
                    target_height,
                    row_idx == last,
                )
            })
            .collect()
    }

    /// Greedy pass producing contiguous `[start, end)` ranges.
    fn pack(&self, tiles: &[Tile], container_width: f64, target_height: f64) -> Vec<(usize, usize)> {
        let mut rows: Vec<(usize, usize)> = Vec::new();
        let mut row_start = 0usize;
        let mut row_len = 0usize;
        let mut row_width = 0.0f64;

        for (i, tile) in tiles.iter().enumerate() {
            let scaled = tile.aspect_ratio() * target_height;
            let projected = row_width + scaled + row_len as f64 * self.gap;

            if row_len == 0 || projected < container_width {
                row_len += 1;
                row_width += scaled;
            } else if projected > container_width
                && projected - container_width < container_width - row_width
            {
                // Overshooting by less than the current shortfall.
                row_len += 1;
                row_width += scaled;
            } else {
                rows.push((row_start, row_start + row_len));
                if self.max_rows > 0 && rows.len() >= self.max_rows {
                    row_len = 0;
                    break;
                }
                row_start = i;
                row_len = 1;
                row_width = scaled;
            }
        }

        if row_len == 0 {
            return rows;
        }
        let row_end = row_start + row_len;

        if !self.stretch_last_row {
            rows.push((row_start, row_end));
            return rows;
        }

        let closed = rows.len();
        match row_len {
            1 if closed > 0 => rows[closed - 1].1 = row_end,
            2 if closed > 1 => {
                // The previous row hands its first item to the row before it
                // and takes the remaining pair.
                rows[closed - 2].1 += 1;
                rows[closed - 1].0 += 1;
                rows[closed - 1].1 = row_end;
            }
            _ => rows.push((row_start, row_end)),
        }
        rows
    }

    fn size_row(
        &self,
        row: &[Tile],
        start: usize,
        end: usize,
        container_width: f64,
        target_height: f64,
        is_last: bool,
    ) -> RowBreak {
        let total_gaps = row.len().saturating_sub(1) as f64 * self.gap;
        let total_ratio: f64 = row.iter().map(Tile::aspect_ratio).sum();
        let mut row_height = (container_width - total_gaps) / total_ratio;
        if !row_height.is_finite() || row_height <= 0.0 {
            row_height = target_height;
        }

        let mut width_scale = 1.0;
        if is_last && row_height > target_height {
            if self.stretch_last_row {
                // Keep filling the width at the target height by widening tiles.
                width_scale = row_height / target_height;
            }
            row_height = target_height;
        }

        RowBreak {
            start_index: start,
            end_index: end,
            row_height,
            width_scale,
        }
    }

    /// Reconstructs rows from breaks without re-running the packing.
    pub fn rows_from_breaks(&self, tiles: &[Tile], breaks: &[RowBreak]) -> Vec<RowModel> {
        breaks
            .iter()
            .enumerate()
            .filter(|(_, brk)| brk.start_index < brk.end_index && brk.end_index <= tiles.len())
            .map(|(row_idx, brk)| {
                let row_items: Vec<RowItem> = (brk.start_index..brk.end_index)
                    .map(|index| RowItem {
                        index,
                        display_w: tiles[index].aspect_ratio() * brk.row_height * brk.width_scale,
                        display_h: brk.row_height,
                    })
                    .collect();

                RowModel::new(row_idx as u32, brk.row_height, row_items)
            })
            .collect()
    }

    /// Calculates the total height of all rows including the gaps between them.
    pub fn total_height(&self, rows: &[RowModel]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }

        let heights_sum: f64 = rows.iter().map(|r| r.height_px).sum();
        let gaps_sum = (rows.len().saturating_sub(1)) as f64 * self.gap;
        heights_sum + gaps_sum
    }
}

/// Represents a row break for caching purposes.
/// Contains only the indices and sizing, not the actual items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBreak {
    /// Start index in the tiles array (inclusive)
    pub start_index: usize,
    /// End index in the tiles array (exclusive)
    pub end_index: usize,
    /// The computed height for this row
    pub row_height: f64,
    /// Width multiplier for a stretched final row capped at the target height
    pub width_scale: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tile(ratio: f64) -> Tile {
        Tile {
            width: ratio * 1000.0,
            height: 1000.0,
        }
    }

    fn scenario_tiles() -> Vec<Tile> {
        [1.5, 1.5, 1.5, 1.5, 1.5, 1.5, 0.7]
            .into_iter()
            .map(make_tile)
            .collect()
    }

    fn memberships(rows: &[RowModel]) -> Vec<Vec<usize>> {
        rows.iter()
            .map(|r| r.items.iter().map(|i| i.index).collect())
            .collect()
    }

    #[test]
    fn test_empty_items() {
        let layout = JustifiedLayout::default();
        assert!(layout.compute(&[], 1200.0, 200.0).is_empty());
        assert!(layout.compute(&scenario_tiles(), 0.0, 200.0).is_empty());
    }

    #[test]
    fn test_seven_image_scenario() {
        let layout = JustifiedLayout::default();
        let rows = layout.compute(&scenario_tiles(), 1200.0, 200.0);

        assert_eq!(
            memberships(&rows),
            vec![vec![0, 1, 2, 3], vec![4, 5, 6]]
        );
        assert!((rows[0].height_px - 198.0).abs() < 1e-9);
        for item in &rows[0].items {
            assert!((item.display_w - 297.0).abs() < 1e-9);
        }

        // The final row is capped at the target height but still spans the width.
        let last = &rows[1];
        assert!((last.height_px - 200.0).abs() < 1e-9);
        assert!((last.filled_width(4.0) - 1200.0).abs() < 1e-6);
        assert!((last.items[0].display_w - 483.24).abs() < 0.01);
        assert!((last.items[2].display_w - 225.51).abs() < 0.01);
    }

    #[test]
    fn test_single_leftover_merges_into_previous_row() {
        let layout = JustifiedLayout::default();
        let rows = layout.compute(&scenario_tiles(), 1200.0, 250.0);

        assert_eq!(rows.len(), 2);
        assert_eq!(memberships(&rows), vec![vec![0, 1, 2], vec![3, 4, 5, 6]]);
        assert!((rows[0].height_px - 1192.0 / 4.5).abs() < 1e-9);
        assert!((rows[1].height_px - 1188.0 / 5.2).abs() < 1e-9);
        assert!((rows[1].filled_width(4.0) - 1200.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_leftovers_rebalance_previous_rows() {
        let layout = JustifiedLayout::new(0.0, 0, true);
        let tiles: Vec<Tile> = (0..10).map(|_| make_tile(1.0)).collect();
        let breaks = layout.compute_breaks(&tiles, 1000.0, 200.0);
        let ranges: Vec<(usize, usize)> =
            breaks.iter().map(|b| (b.start_index, b.end_index)).collect();
        assert_eq!(ranges, vec![(0, 5), (5, 10)]);
    }

    #[test]
    fn test_two_leftovers_with_one_closed_row_stay_separate() {
        let layout = JustifiedLayout::new(0.0, 0, true);
        let tiles: Vec<Tile> = (0..6).map(|_| make_tile(1.0)).collect();
        let rows = layout.compute(&tiles, 1000.0, 200.0);
        assert_eq!(memberships(&rows), vec![vec![0, 1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_max_rows_discards_remainder() {
        let layout = JustifiedLayout::new(4.0, 1, true);
        let rows = layout.compute(&scenario_tiles(), 1200.0, 200.0);
        assert_eq!(memberships(&rows), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn test_unstretched_last_row_is_capped_without_widening() {
        let layout = JustifiedLayout::new(4.0, 0, false);
        let rows = layout.compute(&scenario_tiles(), 1200.0, 200.0);

        let last = rows.last().unwrap();
        assert!((last.height_px - 200.0).abs() < 1e-9);
        assert!((last.items[0].display_w - 300.0).abs() < 1e-9);
        assert!((last.items[2].display_w - 140.0).abs() < 1e-9);
        assert!(last.filled_width(4.0) < 1200.0);
    }

    #[test]
    fn test_row_fill_invariant_and_order() {
        let layout = JustifiedLayout::default();
        let ratios = [
            0.65, 1.6, 1.33, 0.75, 1.0, 1.5, 1.5, 0.8, 1.2, 1.6, 0.7, 1.1, 0.9, 1.4, 1.25, 0.66,
            1.55, 1.0, 1.0, 0.85, 1.3,
        ];
        let tiles: Vec<Tile> = ratios.into_iter().map(make_tile).collect();

        for width in [360.0, 800.0, 1200.0, 1920.0] {
            let target = 0.2 * width;
            let rows = layout.compute(&tiles, width, target);

            let order: Vec<usize> = rows.iter().flat_map(|r| r.items.iter().map(|i| i.index)).collect();
            assert_eq!(order, (0..tiles.len()).collect::<Vec<_>>());

            for row in &rows {
                assert!(
                    (row.filled_width(layout.gap) - width).abs() < 1.0,
                    "row {} fills {} of {}",
                    row.row_index,
                    row.filled_width(layout.gap),
                    width
                );
                for item in &row.items {
                    assert!((item.display_h - row.height_px).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_rows_from_breaks_matches_compute() {
        let layout = JustifiedLayout::default();
        let tiles = scenario_tiles();
        let breaks = layout.compute_breaks(&tiles, 1200.0, 200.0);
        let rows = layout.rows_from_breaks(&tiles, &breaks);
        assert_eq!(rows, layout.compute(&tiles, 1200.0, 200.0));

        // Breaks that do not fit the list are skipped.
        assert!(layout.rows_from_breaks(&tiles[..2], &breaks).is_empty());
    }

    #[test]
    fn test_total_height() {
        let layout = JustifiedLayout::default();
        let rows = layout.compute(&scenario_tiles(), 1200.0, 200.0);
        assert!((layout.total_height(&rows) - (198.0 + 200.0 + 4.0)).abs() < 1e-9);
    }
}
