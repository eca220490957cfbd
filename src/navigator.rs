use tracing::debug;

/// Index reached by moving `delta` records from `current`. Moves that would
/// leave `[0, len)` are ignored.
pub fn step_index(current: usize, delta: isize, len: usize) -> usize {
    match current.checked_add_signed(delta) {
        Some(next) if next < len => next,
        _ => current,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Navigator {
    current: usize,
    len: usize,
}

impl Navigator {
    pub fn new(len: usize) -> Self {
        Self { current: 0, len }
    }

    #[inline(always)]
    pub fn current(&self) -> usize {
        self.current
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn move_by(&mut self, delta: isize) -> usize {
        let next = step_index(self.current, delta, self.len);
        if next == self.current {
            debug!(current = self.current, delta, "navigation ignored at boundary");
        } else {
            debug!(from = self.current, to = next, "navigated");
        }
        self.current = next;
        self.current
    }

    pub fn forward(&mut self) -> usize {
        self.move_by(1)
    }

    pub fn back(&mut self) -> usize {
        self.move_by(-1)
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.len
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }
}
