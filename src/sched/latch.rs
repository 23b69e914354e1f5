use std::sync::{Condvar, Mutex};

/// A one-shot barrier that opens after `count` calls to `count_down`.
///
/// The worker pool uses it to wait until every freshly spawned thread is running.
pub struct CountLatch {
    remaining: Mutex<usize>,
    opened: Condvar,
}

impl CountLatch {
    pub fn new(count: usize) -> CountLatch {
        CountLatch {
            remaining: Mutex::new(count),
            opened: Condvar::new(),
        }
    }

    /// Takes one from the counter, and wakes up the waiters once it hits zero. Extra calls
    /// are ignored.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock().unwrap();
        if *remaining == 0 {
            return;
        }

        *remaining -= 1;
        if *remaining == 0 {
            self.opened.notify_all();
        }
    }

    /// Blocks current thread until the counter reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock().unwrap();
        while *remaining > 0 {
            remaining = self.opened.wait(remaining).unwrap();
        }
    }
}
