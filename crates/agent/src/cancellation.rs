//! First-class cancellation signal (§5, §9 "Coroutine-like streaming":
//! cancellation is a signal, not a thrown exception). A client disconnect
//! flips this flag; the loop observes it between iterations and before the
//! next LLM call, and ceases further calls without killing in-flight tool
//! executions (§4.5 "Cancellation").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_observes_cancel() {
        let c = Cancellation::new();
        assert!(!c.is_cancelled());
        c.cancel();
        assert!(c.is_cancelled());
    }

    #[test]
    fn clones_share_the_same_flag() {
        let c = Cancellation::new();
        let clone = c.clone();
        clone.cancel();
        assert!(c.is_cancelled());
    }
}
