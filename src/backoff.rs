use std::time::Duration;

use rand::Rng;

/// Fallback delay when a [`Backoff::fixed`] strategy is built with a zero delay.
pub const DEFAULT_FIXED_DELAY: Duration = Duration::from_secs(1);
/// Fallback base delay for [`Backoff::exponential`].
pub const DEFAULT_EXPONENTIAL_BASE_DELAY: Duration = Duration::from_millis(100);
/// Fallback multiplier for [`Backoff::exponential`].
pub const DEFAULT_EXPONENTIAL_MULTIPLIER: f64 = 2.0;
/// Fallback cap for [`Backoff::exponential`].
pub const DEFAULT_EXPONENTIAL_MAX_DELAY: Duration = Duration::from_secs(10);

/// Width of the jitter window, as a fraction of the pre-jitter delay.
const JITTER_RATIO: f64 = 0.25;

/// How long to wait before a retry attempt.
///
/// The set of strategies is closed on purpose: new ones are added as new
/// variants. Every variant is pure and stateless, so a single `Backoff` can
/// be shared across concurrent calls without synchronization.
#[derive(Debug, Clone)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed { delay: Duration, jitter: bool },
    /// `base_delay * multiplier^attempt`, capped at `max_delay`.
    Exponential {
        base_delay: Duration,
        multiplier: f64,
        max_delay: Duration,
        jitter: bool,
    },
}

impl Backoff {
    /// A fixed backoff. A zero `delay` falls back to [`DEFAULT_FIXED_DELAY`].
    pub fn fixed(delay: Duration) -> Self {
        let delay = if delay.is_zero() {
            DEFAULT_FIXED_DELAY
        } else {
            delay
        };
        Backoff::Fixed {
            delay,
            jitter: false,
        }
    }

    /// An exponential backoff. Zero or non-positive parameters fall back to
    /// the documented defaults (100ms base, x2 multiplier, 10s cap).
    pub fn exponential(base_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Backoff::Exponential {
            base_delay: if base_delay.is_zero() {
                DEFAULT_EXPONENTIAL_BASE_DELAY
            } else {
                base_delay
            },
            multiplier: if multiplier <= 0.0 {
                DEFAULT_EXPONENTIAL_MULTIPLIER
            } else {
                multiplier
            },
            max_delay: if max_delay.is_zero() {
                DEFAULT_EXPONENTIAL_MAX_DELAY
            } else {
                max_delay
            },
            jitter: false,
        }
    }

    /// Enables a uniformly random +/-25% perturbation of every computed delay.
    pub fn with_jitter(mut self) -> Self {
        match &mut self {
            Backoff::Fixed { jitter, .. } => *jitter = true,
            Backoff::Exponential { jitter, .. } => *jitter = true,
        }
        self
    }

    /// Computes the delay to wait before the given attempt. The jitter offset,
    /// when enabled, is re-sampled on every call.
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed { delay, jitter } => {
                if jitter {
                    jittered(delay, delay)
                } else {
                    delay
                }
            }
            Backoff::Exponential {
                base_delay,
                multiplier,
                max_delay,
                jitter,
            } => {
                let raw = base_delay.as_secs_f64() * multiplier.powi(attempt as i32);
                let capped = Duration::from_secs_f64(raw.min(max_delay.as_secs_f64()));
                if jitter {
                    jittered(capped, base_delay)
                } else {
                    capped
                }
            }
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::exponential(
            DEFAULT_EXPONENTIAL_BASE_DELAY,
            DEFAULT_EXPONENTIAL_MULTIPLIER,
            DEFAULT_EXPONENTIAL_MAX_DELAY,
        )
    }
}

/// Adds a uniform offset in `[-25%, +25%]` of `delay`. A negative result
/// clamps to `floor`, the strategy's un-jittered base delay.
fn jittered(delay: Duration, floor: Duration) -> Duration {
    let base = delay.as_secs_f64();
    let offset = rand::thread_rng().gen_range(-JITTER_RATIO..=JITTER_RATIO) * base;
    let sampled = base + offset;
    if sampled < 0.0 {
        floor
    } else {
        Duration::from_secs_f64(sampled)
    }
}
