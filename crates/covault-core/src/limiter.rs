use crate::error::VaultError;
use crate::types::SECS_PER_DAY;

/// Rolling daily cap on aggregate value released via execution.
///
/// A limit of 0 means unlimited. `spent_today_minor` resets the first time
/// an execution observes the day index advancing past `last_day_index`;
/// queries report the post-rollover allowance without materializing it.
///
/// The struct is `Copy` so the engine can snapshot it before an external
/// call and restore it verbatim when the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendingLimiter {
    daily_limit_minor: u64,
    spent_today_minor: u64,
    last_day_index: u64,
}

impl SpendingLimiter {
    pub fn new(daily_limit_minor: u64, now_secs: u64) -> Self {
        Self {
            daily_limit_minor,
            spent_today_minor: 0,
            last_day_index: day_index(now_secs),
        }
    }

    pub fn daily_limit_minor(&self) -> u64 {
        self.daily_limit_minor
    }

    pub fn spent_today_minor(&self) -> u64 {
        self.spent_today_minor
    }

    /// Amount still withdrawable at `now_secs` without mutating stored state.
    pub fn max_withdrawable_minor(&self, now_secs: u64) -> u64 {
        if self.daily_limit_minor == 0 {
            return u64::MAX;
        }
        if day_index(now_secs) > self.last_day_index {
            return self.daily_limit_minor;
        }
        self.daily_limit_minor.saturating_sub(self.spent_today_minor)
    }

    /// Roll the day over if it advanced, then check headroom for `value`.
    ///
    /// Called only from the execution path; the caller applies the actual
    /// consumption after its other eligibility checks pass.
    pub(crate) fn authorize(&mut self, now_secs: u64, value_minor: u64) -> Result<(), VaultError> {
        if self.daily_limit_minor == 0 {
            return Ok(());
        }

        let today = day_index(now_secs);
        if today > self.last_day_index {
            self.last_day_index = today;
            self.spent_today_minor = 0;
        }

        let headroom_exceeded = match self.spent_today_minor.checked_add(value_minor) {
            Some(total) => total > self.daily_limit_minor,
            None => true,
        };
        if headroom_exceeded {
            return Err(VaultError::DailyLimitExceeded {
                requested: value_minor,
                remaining: self.daily_limit_minor.saturating_sub(self.spent_today_minor),
            });
        }
        Ok(())
    }

    /// Apply consumption previously authorized. No-op when unlimited.
    pub(crate) fn consume(&mut self, value_minor: u64) {
        if self.daily_limit_minor > 0 {
            self.spent_today_minor = self.spent_today_minor.saturating_add(value_minor);
        }
    }

    pub(crate) fn set_daily_limit(&mut self, daily_limit_minor: u64) {
        self.daily_limit_minor = daily_limit_minor;
    }
}

fn day_index(now_secs: u64) -> u64 {
    now_secs / SECS_PER_DAY
}
