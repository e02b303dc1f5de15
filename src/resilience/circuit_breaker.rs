//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests are skipped
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= failure_threshold
//! Open → Closed: permission check after reset_timeout since the last failure
//! Open → Closed: any reported success
//! ```
//!
//! # Design Decisions
//! - Per-backend circuit breaker (not global)
//! - No half-open state: after the cooldown the backend gets full traffic again
//! - The permission check is the only place the cooldown is evaluated, so it mutates state
//! - Counter and last failure timestamp live under one lock and always change together

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default number of consecutive failures before the circuit opens.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default cooldown after the last failure before an open circuit closes again.
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_millis(5000);

/// Circuit breaker parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures needed to open the circuit.
    pub failure_threshold: u32,
    /// Time since the last failure after which an open circuit grants permission again.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Observable state of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
        }
    }
}

/// Result of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The circuit was closed.
    Granted,
    /// The circuit was open and this check closed it.
    Reset,
    Denied,
}

impl Permission {
    pub fn is_granted(&self) -> bool {
        !matches!(self, Permission::Denied)
    }
}

#[derive(Debug, Default)]
struct Counters {
    consecutive_failures: u32,
    /// `None` until the first failure is reported.
    last_failure: Option<Instant>,
}

/// Consecutive-failure circuit breaker for a single backend.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    counters: Mutex<Counters>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask whether a call may be sent now.
    ///
    /// Closes an open circuit as a side effect once the cooldown has elapsed.
    pub fn acquire_permission(&self) -> bool {
        self.acquire_permission_at(Instant::now())
    }

    pub fn acquire_permission_at(&self, now: Instant) -> bool {
        self.try_acquire_at(now).is_granted()
    }

    /// Permission check that also reports whether it closed an open circuit.
    pub fn try_acquire(&self) -> Permission {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&self, now: Instant) -> Permission {
        let mut counters = self.lock();
        if counters.consecutive_failures < self.config.failure_threshold {
            return Permission::Granted;
        }

        let cooled_down = match counters.last_failure {
            Some(at) => now.saturating_duration_since(at) >= self.config.reset_timeout,
            None => true,
        };
        if cooled_down {
            counters.consecutive_failures = 0;
            Permission::Reset
        } else {
            Permission::Denied
        }
    }

    /// Record a failed call. Returns the updated consecutive failure count.
    pub fn report_failure(&self) -> u32 {
        self.report_failure_at(Instant::now())
    }

    pub fn report_failure_at(&self, now: Instant) -> u32 {
        let mut counters = self.lock();
        counters.last_failure = Some(now);
        counters.consecutive_failures = counters.consecutive_failures.saturating_add(1);
        counters.consecutive_failures
    }

    /// Record a successful call, closing the circuit immediately.
    ///
    /// Returns `true` when the failure count had reached the threshold.
    pub fn report_success(&self) -> bool {
        let mut counters = self.lock();
        let was_open = counters.consecutive_failures >= self.config.failure_threshold;
        counters.consecutive_failures = 0;
        was_open
    }

    /// Current consecutive failure count.
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Read-only view of the state. Never transitions the breaker.
    pub fn state(&self) -> CircuitState {
        self.state_at(Instant::now())
    }

    pub fn state_at(&self, now: Instant) -> CircuitState {
        let counters = self.lock();
        if counters.consecutive_failures < self.config.failure_threshold {
            return CircuitState::Closed;
        }
        match counters.last_failure {
            Some(at) if now.saturating_duration_since(at) < self.config.reset_timeout => {
                CircuitState::Open
            }
            _ => CircuitState::Closed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
