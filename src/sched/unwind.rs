use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Executes `func` and captures any panic, translating that panic into a
/// `Err` result. Resources are treated as exception safe here: a panicking
/// load leaves the resource in failed state and nothing else.
pub fn halt_unwinding<F, R>(func: F) -> thread::Result<R>
where
    F: FnOnce() -> R,
{
    panic::catch_unwind(AssertUnwindSafe(func))
}

/// Continues a panic captured by `halt_unwinding`, once the caller has restored its own
/// invariants.
pub fn resume_unwinding(payload: Box<dyn Any + Send>) -> ! {
    panic::resume_unwind(payload)
}
