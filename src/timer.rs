// Nomination countdown: a cooperative state machine driven by the
// session event loop's one-second interval.
//
// The timer itself never schedules anything. The loop only advances it
// while it is running, so resetting (or dropping the loop) cancels any
// pending tick deterministically: there is no task left behind that
// could fire a stale expiry.

/// Outcome of advancing the countdown by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timer was not running; nothing happened.
    Idle,
    /// The countdown decremented to the contained number of seconds.
    Running(u32),
    /// The countdown reached zero. Emitted exactly once per
    /// start-to-expiry cycle; the timer has already re-armed itself to
    /// Idle at the initial duration.
    Expired,
}

/// Per-nomination countdown timer.
///
/// Three states: Idle (`time_left == initial`, not running), Running
/// (ticking), and a transient Expired that immediately resolves back to
/// Idle so the expiry signal can never repeat on subsequent ticks.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    initial: u32,
    time_left: u32,
    running: bool,
}

impl CountdownTimer {
    /// Create an idle timer with the given per-nomination duration.
    pub fn new(initial_secs: u32) -> Self {
        CountdownTimer {
            initial: initial_secs,
            time_left: initial_secs,
            running: false,
        }
    }

    /// Idle -> Running. No-op if already running.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Any state -> Idle at the initial duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.time_left = self.initial;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Advance the countdown by one second.
    ///
    /// While more than a second remains this just decrements. When the
    /// countdown would drop below one it reports [`Tick::Expired`] once
    /// and re-arms to Idle at the initial duration. The caller reacts
    /// to the expiry (attempting an auto-sale), never the timer itself.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        if self.time_left > 1 {
            self.time_left -= 1;
            return Tick::Running(self.time_left);
        }
        self.reset();
        Tick::Expired
    }
}
