//! Duty-cycle timing for a single sensor.
//!
//! The scheduler is a pure state machine: it never touches the transport.
//! [`Scheduler::poll`] reports what the session should do at `now`, and the
//! session reports back with [`Scheduler::mark_turned_on`],
//! [`Scheduler::mark_sampled`] or [`Scheduler::abandon`].

/// Where the sensor is in its sampling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Fan off, no read pending.
    #[default]
    Dormant,
    /// Fan on, waiting for the air flow to stabilise.
    WarmingUp,
    /// A frame is being requested and read.
    Sampling,
}

/// What the session has to do after a [`Scheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing is due yet.
    Wait,
    /// Send the wake command and report it with [`Scheduler::mark_turned_on`].
    WakeUp,
    /// Read one frame and report it with [`Scheduler::mark_sampled`] or [`Scheduler::abandon`].
    Sample,
}

/// Timing state of one sensor's duty cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduler {
    phase: Phase,
    last_sample_at: Option<u64>,
    last_turn_on_at: Option<u64>,
    sampling_interval: u64,
    // `None` skips the warm-up phase entirely (active mode).
    warmup_duration: Option<u64>,
}

impl Scheduler {
    /// Scheduler for a passive-mode sensor that is woken up before every read.
    pub fn passive(sampling_interval: u64, warmup_duration: u64) -> Self {
        Self {
            phase: Phase::Dormant,
            last_sample_at: None,
            last_turn_on_at: None,
            sampling_interval,
            warmup_duration: Some(warmup_duration),
        }
    }

    /// Scheduler for an active-mode sensor whose fan runs continuously.
    pub fn active(sampling_interval: u64) -> Self {
        Self {
            phase: Phase::Dormant,
            last_sample_at: None,
            last_turn_on_at: None,
            sampling_interval,
            warmup_duration: None,
        }
    }

    /// Current phase of the cycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// When the last reading was taken, `None` if never.
    pub fn last_sample_at(&self) -> Option<u64> {
        self.last_sample_at
    }

    /// When the sensor was last woken up, `None` if never.
    pub fn last_turn_on_at(&self) -> Option<u64> {
        self.last_turn_on_at
    }

    /// Evaluates the transition rules at `now`.
    pub fn poll(&mut self, now: u64) -> Action {
        match self.phase {
            Phase::Dormant => {
                if !elapsed(self.last_sample_at, now, self.sampling_interval) {
                    return Action::Wait;
                }
                match self.warmup_duration {
                    Some(_) => Action::WakeUp,
                    None => {
                        self.phase = Phase::Sampling;
                        Action::Sample
                    }
                }
            }
            Phase::WarmingUp => {
                let warmup = self.warmup_duration.unwrap_or(0);
                if elapsed(self.last_turn_on_at, now, warmup) && self.turned_on_since_sample() {
                    self.phase = Phase::Sampling;
                    Action::Sample
                } else {
                    Action::Wait
                }
            }
            Phase::Sampling => Action::Sample,
        }
    }

    /// The wake command went out at `now`.
    pub fn mark_turned_on(&mut self, now: u64) {
        if self.phase != Phase::Dormant {
            log::warn!("Wake-up recorded while {:?}", self.phase);
        }
        self.last_turn_on_at = Some(now);
        self.phase = Phase::WarmingUp;
    }

    /// A reading was taken at `now`; the cycle is complete.
    pub fn mark_sampled(&mut self, now: u64) {
        self.last_sample_at = Some(now);
        self.phase = Phase::Dormant;
    }

    /// The read failed; go back to `Dormant` with both timestamps untouched.
    ///
    /// If the sampling interval has already elapsed the next poll asks for a
    /// new wake-up straight away.
    pub fn abandon(&mut self) {
        self.phase = Phase::Dormant;
    }

    fn turned_on_since_sample(&self) -> bool {
        match (self.last_turn_on_at, self.last_sample_at) {
            (Some(on), Some(sample)) => on >= sample,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

// `true` once strictly more than `period` seconds have passed since `since`.
// A timestamp that never happened counts as infinitely long ago.
fn elapsed(since: Option<u64>, now: u64, period: u64) -> bool {
    match since {
        Some(at) => now.saturating_sub(at) > period,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_wakes_the_sensor() {
        let mut scheduler = Scheduler::passive(30, 20);
        assert_eq!(scheduler.poll(1000), Action::WakeUp);
        scheduler.mark_turned_on(1000);
        assert_eq!(scheduler.phase(), Phase::WarmingUp);
        assert_eq!(scheduler.last_turn_on_at(), Some(1000));
    }

    #[test]
    fn test_warmup_then_sample() {
        let mut scheduler = Scheduler::passive(30, 20);
        scheduler.mark_sampled(0);
        scheduler.mark_turned_on(1000);

        assert_eq!(scheduler.poll(1010), Action::Wait);
        assert_eq!(scheduler.poll(1020), Action::Wait);
        assert_eq!(scheduler.poll(1021), Action::Sample);
        assert_eq!(scheduler.phase(), Phase::Sampling);
    }

    #[test]
    fn test_full_cycle_timing() {
        let mut scheduler = Scheduler::passive(10, 20);
        assert_eq!(scheduler.poll(100), Action::WakeUp);
        scheduler.mark_turned_on(100);
        assert_eq!(scheduler.poll(121), Action::Sample);
        scheduler.mark_sampled(121);
        assert_eq!(scheduler.phase(), Phase::Dormant);

        assert_eq!(scheduler.poll(131), Action::Wait);
        assert_eq!(scheduler.poll(132), Action::WakeUp);
    }

    #[test]
    fn test_never_samples_before_warmup() {
        let mut scheduler = Scheduler::passive(5, 20);
        let mut turned_on = None;
        for now in 0..200u64 {
            match scheduler.poll(now) {
                Action::Wait => {}
                Action::WakeUp => {
                    scheduler.mark_turned_on(now);
                    turned_on = Some(now);
                }
                Action::Sample => {
                    let on = turned_on.expect("sampled without wake-up");
                    assert!(now - on > 20);
                    scheduler.mark_sampled(now);
                    turned_on = None;
                }
            }
        }
    }

    #[test]
    fn test_abandon_keeps_timestamps() {
        let mut scheduler = Scheduler::passive(30, 20);
        scheduler.mark_turned_on(1000);
        assert_eq!(scheduler.poll(1021), Action::Sample);
        scheduler.abandon();

        assert_eq!(scheduler.phase(), Phase::Dormant);
        assert_eq!(scheduler.last_sample_at(), None);
        assert_eq!(scheduler.last_turn_on_at(), Some(1000));
        assert_eq!(scheduler.poll(1022), Action::WakeUp);
    }

    #[test]
    fn test_active_mode_skips_warmup() {
        let mut scheduler = Scheduler::active(30);
        assert_eq!(scheduler.poll(0), Action::Sample);
        scheduler.mark_sampled(0);
        assert_eq!(scheduler.poll(30), Action::Wait);
        assert_eq!(scheduler.poll(31), Action::Sample);
        assert_eq!(scheduler.last_turn_on_at(), None);
    }

    #[test]
    fn test_clock_going_backwards_waits() {
        let mut scheduler = Scheduler::passive(30, 20);
        scheduler.mark_sampled(1000);
        assert_eq!(scheduler.poll(900), Action::Wait);
    }
}
