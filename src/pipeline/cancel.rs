use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::{Result, XsqError};

/// A shared flag asking running work to stop.
///
/// Child tokens observe their parents: cancelling a parent cancels every
/// child, while cancelling a child leaves the parent untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    inherited: Vec<Arc<AtomicBool>>,
}
impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that is cancelled with `self` or on its own.
    #[must_use]
    pub fn child(&self) -> Self {
        let mut inherited = self.inherited.clone();
        inherited.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            inherited,
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst) || self.inherited.iter().any(|f| f.load(Ordering::SeqCst))
    }

    /// Returns [`XsqError::Cancelled`] once the token is cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(XsqError::Cancelled)
        } else {
            Ok(())
        }
    }
}

static INTERRUPT: OnceLock<CancelToken> = OnceLock::new();

#[cfg(unix)]
extern "C" fn on_interrupt(_signum: libc::c_int) {
    if let Some(token) = INTERRUPT.get() {
        token.flag.store(true, Ordering::SeqCst);
    }
    // a second interrupt terminates immediately
    unsafe {
        libc::signal(libc::SIGINT, libc::SIG_DFL);
    }
}

/// Routes SIGINT to the returned token.
///
/// The first interrupt only cancels the token so that running conversions
/// can stop cleanly; repeated calls return the same token.
pub fn interrupt_token() -> CancelToken {
    let token = INTERRUPT.get_or_init(CancelToken::new).clone();
    install_handler();
    token
}

#[cfg(unix)]
fn install_handler() {
    let handler = on_interrupt as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_handler() {
    // no-op
}
