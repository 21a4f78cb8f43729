/// One placed item: an index into the laid-out list plus its display box.
#[derive(Debug, Clone, PartialEq)]
pub struct RowItem {
    pub index: usize,
    pub display_w: f64,
    pub display_h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowModel {
    pub row_index: u32,
    pub height_px: f64,
    pub items: Vec<RowItem>,
}

impl RowModel {
    pub fn new(row_index: u32, height_px: f64, items: Vec<RowItem>) -> Self {
        Self {
            row_index,
            height_px,
            items,
        }
    }

    /// Sum of display widths plus the gaps between items.
    pub fn filled_width(&self, gap: f64) -> f64 {
        let widths: f64 = self.items.iter().map(|i| i.display_w).sum();
        widths + self.items.len().saturating_sub(1) as f64 * gap
    }
}
