use std::time::Duration;

/// Identifies one scheduled tick stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Schedule {
    handle: TimerHandle,
    interval: Duration,
    elapsed: Duration,
}

/// A repeating timer fed by the frame loop's elapsed time. At most one tick
/// stream is live; scheduling while one is running replaces it.
#[derive(Debug, Default)]
pub struct Timer {
    next_id: u64,
    active: Option<Schedule>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, interval: Duration) -> TimerHandle {
        if let Some(old) = self.active {
            log::warn!("replacing live timer {:?} without cancelling it", old.handle);
        }
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.active = Some(Schedule {
            handle,
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
        });
        log::debug!("scheduled {handle:?} every {interval:?}");
        handle
    }

    /// Returns false if `handle` was not the live schedule.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.active {
            Some(schedule) if schedule.handle == handle => {
                self.active = None;
                log::debug!("cancelled {handle:?}");
                true
            }
            _ => false,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.active.map(|s| s.interval)
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Some(schedule) = &mut self.active {
            schedule.elapsed += dt;
        }
    }

    /// Consumes one elapsed interval, if any, and reports which stream fired.
    pub fn fire(&mut self) -> Option<TimerHandle> {
        let schedule = self.active.as_mut()?;
        if schedule.elapsed < schedule.interval {
            return None;
        }
        schedule.elapsed -= schedule.interval;
        Some(schedule.handle)
    }
}
