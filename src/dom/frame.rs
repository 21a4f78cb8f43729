/// Coalesces work requests to at most one run per animation frame.
///
/// `request` schedules, `take` consumes the pending flag when the host
/// delivers the frame. Bursts between two frames collapse into one run.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    /// Returns `true` only when this call scheduled a new frame.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
