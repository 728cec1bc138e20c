//! Per-request deadline shared by every upstream call.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// A cancellation token that fires when the request deadline passes.
///
/// The token also fires when the `Deadline` is dropped, so work spawned for a
/// request that was abandoned (client gone, response already sent) drains
/// quickly instead of running to completion.
pub struct Deadline {
    token: CancellationToken,
    expires_at: Instant,
    _guard: DropGuard,
}

impl Deadline {
    /// Starts the deadline clock. Must be called within a Tokio runtime.
    pub fn start(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let expires_at = Instant::now() + timeout;

        let timer = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(expires_at) => timer.cancel(),
                _ = timer.cancelled() => {}
            }
        });

        Self {
            _guard: token.clone().drop_guard(),
            token,
            expires_at,
        }
    }

    /// Token handed to downstream calls.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Resolves once the deadline has passed.
    ///
    /// Unlike the token, this is not triggered by early cancellation.
    pub async fn expired(&self) {
        tokio::time::sleep_until(self.expires_at).await
    }

    /// Time left before expiry, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
