//! Process-wide public alarm flag.
//!
//! The flag starts lowered. Only external triggers (the HTTP service, an
//! operator console) raise or clear it; domain code reads it through
//! [`AlarmStatus`].

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

/// Read-only view of the alarm state.
pub trait AlarmStatus: Send + Sync {
    fn is_raised(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct AlarmSwitch {
    raised: AtomicBool,
}

static GLOBAL_ALARM: AlarmSwitch = AlarmSwitch::new();

impl AlarmSwitch {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// The switch shared by the whole process.
    pub fn global() -> &'static AlarmSwitch {
        &GLOBAL_ALARM
    }

    /// Set the flag, returning the previous value.
    pub fn set(&self, raised: bool) -> bool {
        let previous = self.raised.swap(raised, Ordering::AcqRel);
        if previous != raised {
            info!(raised, "public alarm state changed");
        }
        previous
    }

    pub fn raise(&self) -> bool {
        self.set(true)
    }

    pub fn clear(&self) -> bool {
        self.set(false)
    }
}

impl AlarmStatus for AlarmSwitch {
    fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

impl AlarmStatus for &'static AlarmSwitch {
    fn is_raised(&self) -> bool {
        (**self).is_raised()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_lowered_and_toggles() {
        let switch = AlarmSwitch::new();
        assert!(!switch.is_raised());
        assert!(!switch.raise());
        assert!(switch.is_raised());
        assert!(switch.raise());
        assert!(switch.clear());
        assert!(!switch.is_raised());
    }
}
