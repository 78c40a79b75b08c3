use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cancellation token shared between a view and the submissions it started.
pub type CancellationToken = Arc<AtomicBool>;

pub fn new_token() -> CancellationToken {
    Arc::new(AtomicBool::new(false))
}

#[inline]
pub fn is_cancelled(token: &CancellationToken) -> bool {
    token.load(Ordering::SeqCst)
}

pub fn cancel(token: &CancellationToken) {
    token.store(true, Ordering::SeqCst);
}
