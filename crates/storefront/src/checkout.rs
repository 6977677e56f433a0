//! Simulated payment processing.
//!
//! "Proceed to Pay" starts a background task that waits a fixed delay and
//! then always succeeds. Each payment carries a [`CancellationToken`]; the
//! cart panel cancels it when it closes, and a cancelled task finishes
//! without recording a result.
//!
//! Terminal states are handed out once: the first [`PaymentSimulator::status`]
//! call that observes `Succeeded` or `Cancelled` also evicts the entry. A
//! result nobody reads is dropped by its own task after [`RESULT_RETENTION`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// How long a finished or cancelled payment waits to be polled.
pub const RESULT_RETENTION: Duration = Duration::from_secs(60);

/// Identifier handed to the browser for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for PaymentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Where a payment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Processing,
    Succeeded,
    Cancelled,
    /// Never started, or already reported as finished.
    Unknown,
}

impl PaymentStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

struct PaymentEntry {
    status: PaymentStatus,
    token: CancellationToken,
}

/// Registry of simulated payments shared across requests.
#[derive(Clone, Default)]
pub struct PaymentSimulator {
    payments: Arc<Mutex<HashMap<PaymentId, PaymentEntry>>>,
}

impl PaymentSimulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PaymentId, PaymentEntry>> {
        // Entries are plain data; a panicked holder cannot leave them torn.
        self.payments.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a payment that succeeds after `delay` unless cancelled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, delay: Duration) -> PaymentId {
        let id = PaymentId::new();
        let token = CancellationToken::new();

        self.lock().insert(
            id,
            PaymentEntry {
                status: PaymentStatus::Processing,
                token: token.clone(),
            },
        );

        let registry = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(payment_id = %id, "Payment task cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    registry.finish(id, PaymentStatus::Succeeded);
                }
            }

            tokio::time::sleep(RESULT_RETENTION).await;
            if registry.lock().remove(&id).is_some() {
                debug!(payment_id = %id, "Unread payment result dropped");
            }
        });

        info!(payment_id = %id, delay_ms = delay.as_millis(), "Payment started");
        id
    }

    /// Record a final status if the payment is still processing.
    fn finish(&self, id: PaymentId, status: PaymentStatus) {
        let mut payments = self.lock();
        if let Some(entry) = payments.get_mut(&id)
            && entry.status == PaymentStatus::Processing
        {
            entry.status = status;
            info!(payment_id = %id, ?status, "Payment finished");
        }
    }

    /// Cancel a payment that is still processing.
    ///
    /// Returns `true` if the payment was in flight.
    pub fn cancel(&self, id: PaymentId) -> bool {
        let mut payments = self.lock();
        let Some(entry) = payments.get_mut(&id) else {
            return false;
        };
        if entry.status != PaymentStatus::Processing {
            return false;
        }
        entry.token.cancel();
        entry.status = PaymentStatus::Cancelled;
        info!(payment_id = %id, "Payment cancelled");
        true
    }

    /// Current status. Terminal states are evicted once reported.
    pub fn status(&self, id: PaymentId) -> PaymentStatus {
        let mut payments = self.lock();
        let Some(status) = payments.get(&id).map(|entry| entry.status) else {
            return PaymentStatus::Unknown;
        };
        if status.is_terminal() {
            payments.remove(&id);
        }
        status
    }

    /// Number of payments still tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }
}
