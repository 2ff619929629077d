use std::sync::atomic::{AtomicU8, Ordering};

const PENDING: u8 = 0;
const RESOLVED: u8 = 1;
const REJECTED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleState {
    Pending,
    Resolved,
    Rejected,
}

/// Single-use settle flag shared by the exit watcher and the deadline.
/// Whichever side moves it out of `Pending` first owns the outcome.
#[derive(Debug, Default)]
pub struct Settle {
    state: AtomicU8,
}

impl Settle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self) -> bool {
        self.transition(RESOLVED)
    }

    pub fn reject(&self) -> bool {
        self.transition(REJECTED)
    }

    pub fn state(&self) -> SettleState {
        match self.state.load(Ordering::Acquire) {
            PENDING => SettleState::Pending,
            RESOLVED => SettleState::Resolved,
            _ => SettleState::Rejected,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.state() == SettleState::Rejected
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(PENDING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn first_transition_wins() {
        let settle = Settle::new();
        assert_eq!(settle.state(), SettleState::Pending);
        assert!(settle.resolve());
        assert!(!settle.reject());
        assert!(!settle.resolve());
        assert_eq!(settle.state(), SettleState::Resolved);
    }

    #[test]
    fn reject_blocks_later_resolve() {
        let settle = Settle::new();
        assert!(settle.reject());
        assert!(settle.is_rejected());
        assert!(!settle.resolve());
    }

    #[test]
    fn racing_threads_settle_exactly_once() {
        for _ in 0..50 {
            let settle = Arc::new(Settle::new());
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|idx| {
                    let settle = Arc::clone(&settle);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        if idx == 0 {
                            settle.resolve()
                        } else {
                            settle.reject()
                        }
                    })
                })
                .collect();
            let wins = handles
                .into_iter()
                .map(|h| h.join().expect("join"))
                .filter(|won| *won)
                .count();
            assert_eq!(wins, 1);
            assert_ne!(settle.state(), SettleState::Pending);
        }
    }
}
