//! Cooperative cancellation for long-running stages.
//!
//! A [`CancelToken`] is checked by the stage between units of work. The
//! operator's interrupt (SIGINT) reaches it through [`InterruptGuard`], which
//! registers the token's flag with `signal-hook` for as long as it lives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::SIGINT;
use signal_hook::SigId;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Routes SIGINT into a [`CancelToken`] while alive. Dropping the guard
/// unregisters the flag.
pub struct InterruptGuard {
    id: SigId,
}

impl InterruptGuard {
    pub fn install() -> Result<(Self, CancelToken)> {
        let token = CancelToken::new();
        let id = signal_hook::flag::register(SIGINT, Arc::clone(&token.flag)).map_err(|e| {
            Error::internal_io(e.to_string(), Some("register SIGINT handler".to_string()))
        })?;
        Ok((Self { id }, token))
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        signal_hook::low_level::unregister(self.id);
    }
}
