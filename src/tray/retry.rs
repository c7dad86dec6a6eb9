use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub pause: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded { attempts: u32 },
    Exhausted,
}

impl RetryOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            pause: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, pause: Duration) -> Self {
        Self { attempts, pause }
    }

    pub fn budget(&self) -> Duration {
        self.pause * self.attempts.saturating_sub(1)
    }

    /// Always makes at least one attempt.
    pub fn run(&self, mut attempt: impl FnMut() -> bool) -> RetryOutcome {
        let attempts = self.attempts.max(1);
        for n in 1..=attempts {
            if attempt() {
                return RetryOutcome::Succeeded { attempts: n };
            }
            if n < attempts {
                thread::sleep(self.pause);
            }
        }
        RetryOutcome::Exhausted
    }
}
