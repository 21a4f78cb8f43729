/// Discrete zoom state for the viewer image.
///
/// Level 0 is unzoomed; level `k` scales by `levels[k - 1]`. The drag offset
/// lives here because a level change rescales it, keeping the same image
/// point under the cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoomState {
    level: usize,
    prev_level: usize,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ZoomState {
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_zoomed(&self) -> bool {
        self.level > 0
    }

    /// Steps up unless already at the last table entry.
    pub fn zoom_in(&mut self, levels: &[f64]) -> bool {
        if self.level < levels.len() {
            self.level += 1;
            true
        } else {
            false
        }
    }

    pub fn zoom_out(&mut self) -> bool {
        if self.level > 0 {
            self.level -= 1;
            true
        } else {
            false
        }
    }

    pub fn set_level(&mut self, level: usize) {
        self.level = level;
    }

    /// Back to level 0 with no offset.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn ratio(&self, levels: &[f64]) -> f64 {
        ratio_at(levels, self.level)
    }

    /// Commits the current level: clears the offset at level 0, otherwise
    /// rescales it by the ratio change since the last committed level.
    pub fn settle(&mut self, levels: &[f64]) {
        if self.level == 0 {
            self.translate_x = 0.0;
            self.translate_y = 0.0;
        } else if self.prev_level > 0 {
            let prev = ratio_at(levels, self.prev_level);
            if prev > 0.0 {
                let factor = self.ratio(levels) / prev;
                self.translate_x *= factor;
                self.translate_y *= factor;
            }
        }
        self.prev_level = self.level;
    }

    /// CSS transform placing the image at the current offset and scale.
    pub fn transform(&self, levels: &[f64]) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            css_number(self.translate_x),
            css_number(self.translate_y),
            css_number(self.ratio(levels))
        )
    }

    /// Text of the zoom ratio label, e.g. `2.5x`.
    pub fn label(&self, levels: &[f64]) -> String {
        format!("{}x", css_number(self.ratio(levels)))
    }
}

fn ratio_at(levels: &[f64], level: usize) -> f64 {
    match level {
        0 => 1.0,
        k => levels.get(k - 1).copied().unwrap_or(1.0),
    }
}

/// Formats a number for CSS, printing negative zero as `0`.
fn css_number(value: f64) -> f64 {
    value + 0.0
}
