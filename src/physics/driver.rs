/// Decides how many simulation ticks run at each scheduling point: one
/// animation frame, one timer firing, or one manual step in a test.
pub trait TickDriver {
    fn ticks_due(&mut self) -> usize;
}

impl<F> TickDriver for F
where
    F: FnMut() -> usize,
{
    fn ticks_due(&mut self) -> usize {
        self()
    }
}

/// Releases a fixed number of ticks once, then nothing.
#[derive(Clone, Copy, Debug)]
pub struct ManualSteps {
    remaining: usize,
}

impl ManualSteps {
    pub fn new(ticks: usize) -> Self {
        Self { remaining: ticks }
    }
}

impl TickDriver for ManualSteps {
    fn ticks_due(&mut self) -> usize {
        std::mem::take(&mut self.remaining)
    }
}

/// Converts elapsed frame time into whole ticks at a fixed tick rate.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    ticks_per_second: f32,
    max_ticks_per_frame: usize,
    accumulator: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60.0, 4)
    }
}

impl FrameClock {
    pub fn new(ticks_per_second: f32, max_ticks_per_frame: usize) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1.0),
            max_ticks_per_frame: max_ticks_per_frame.max(1),
            accumulator: 0.0,
        }
    }

    pub fn advance(&mut self, delta_seconds: f32) {
        if delta_seconds.is_finite() && delta_seconds > 0.0 {
            self.accumulator += delta_seconds * self.ticks_per_second;
        }
    }
}

impl TickDriver for FrameClock {
    fn ticks_due(&mut self) -> usize {
        let whole = self.accumulator.floor();
        self.accumulator -= whole;
        let due = whole as usize;
        if due > self.max_ticks_per_frame {
            // Drop the backlog after a stall instead of catching up.
            self.accumulator = 0.0;
            return self.max_ticks_per_frame;
        }
        due
    }
}
