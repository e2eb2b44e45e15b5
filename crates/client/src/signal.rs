//! SIGINT/SIGTERM handling.
//!
//! The first signal sets the run's [`CancellationToken`]: the scheduler stops
//! dispatching, in-flight transfers finish, and the remaining files are
//! reported as skipped. A second signal terminates the process immediately
//! with exit status 1.
//!
//! Handlers only touch the token's atomic flag, so they are
//! async-signal-safe.

use engine::CancellationToken;

use crate::ClientError;

/// Keeps signal handlers registered; dropping it unregisters them.
#[derive(Debug)]
pub struct SignalGuard {
    #[cfg(unix)]
    ids: Vec<signal_hook::SigId>,
}

/// Routes SIGINT and SIGTERM to `token`.
///
/// On non-Unix platforms this is a no-op.
///
/// # Errors
///
/// Returns [`ClientError::Signal`] when a handler cannot be registered.
#[cfg(unix)]
pub fn install_signal_handlers(token: &CancellationToken) -> Result<SignalGuard, ClientError> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::flag;

    let flag_state = token.flag();
    let mut ids = Vec::with_capacity(4);
    for signal in [SIGINT, SIGTERM] {
        // Registered first so it sees the flag as it was before this signal.
        let shutdown = flag::register_conditional_shutdown(signal, 1, flag_state.clone())
            .map_err(|source| ClientError::Signal { source })?;
        ids.push(shutdown);
        let cancel = flag::register(signal, flag_state.clone())
            .map_err(|source| ClientError::Signal { source })?;
        ids.push(cancel);
    }
    Ok(SignalGuard { ids })
}

/// Routes SIGINT and SIGTERM to `token`.
///
/// On non-Unix platforms this is a no-op.
#[cfg(not(unix))]
pub fn install_signal_handlers(_token: &CancellationToken) -> Result<SignalGuard, ClientError> {
    Ok(SignalGuard {})
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        for id in self.ids.drain(..) {
            signal_hook::low_level::unregister(id);
        }
    }
}
