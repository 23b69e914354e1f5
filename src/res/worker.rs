//! The background half of the cache: a FIFO of pending requests and the threads that
//! service it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use crate::sched::latch::CountLatch;

use super::request::{LoadTask, ResultQueue};
use super::table::ResourceTable;

/// A thread-safe FIFO of pending load and reload requests.
///
/// Requests are serialized per resource: while a task for an identifier is queued or running,
/// later tasks for the same identifier are parked, and released one at a time by `complete`.
/// So two workers never touch the same resource at once, and tasks of one resource finish in
/// submission order.
#[derive(Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    condvar: Condvar,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<LoadTask>,
    // Identifiers with a dispatched task, mapped to the tasks parked behind it.
    inflight: HashMap<String, VecDeque<LoadTask>>,
    shutdown: bool,
}

impl TaskQueue {
    pub fn new() -> Self {
        TaskQueue::default()
    }

    /// Pushes a task into the queue and wakes up a idle worker.
    pub fn push(&self, task: LoadTask) {
        {
            let mut state = self.state.lock().unwrap();
            if let Some(parked) = state.inflight.get_mut(&task.id) {
                debug!("[TaskQueue] parks {:?} behind the inflight one.", task);
                parked.push_back(task);
                return;
            }

            state.inflight.insert(task.id.clone(), VecDeque::new());
            state.pending.push_back(task);
        }

        self.condvar.notify_one();
    }

    /// Blocks current thread until a task is available, and returns None once the queue
    /// has been shut down.
    pub fn pop(&self) -> Option<LoadTask> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.shutdown {
                return None;
            }

            if let Some(task) = state.pending.pop_front() {
                return Some(task);
            }

            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Pops a task without blocking, regardless of the shutdown flag.
    pub fn try_pop(&self) -> Option<LoadTask> {
        self.state.lock().unwrap().pending.pop_front()
    }

    /// Marks the task of resource `id` as finished, and releases the next parked task of
    /// the same resource if there is one.
    pub fn complete(&self, id: &str) {
        {
            let mut state = self.state.lock().unwrap();
            let next = match state.inflight.get_mut(id) {
                Some(parked) => parked.pop_front(),
                None => return,
            };

            match next {
                Some(task) => state.pending.push_back(task),
                None => {
                    state.inflight.remove(id);
                    return;
                }
            }
        }

        self.condvar.notify_one();
    }

    /// Returns the number of tasks that have been accepted but not completed yet.
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.inflight.len() + state.inflight.values().map(|v| v.len()).sum::<usize>()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wakes up all the workers and asks them to quit.
    pub fn shutdown(&self) {
        self.state.lock().unwrap().shutdown = true;
        self.condvar.notify_all();
    }

    /// Clears the shutdown flag, so the queue could be serviced by a new set of workers.
    #[inline]
    pub fn resume(&self) {
        self.state.lock().unwrap().shutdown = false;
    }

    /// Discards every task that has not been dispatched yet, and returns how many were dropped.
    pub fn discard(&self) -> usize {
        let mut state = self.state.lock().unwrap();
        let num = state.pending.len() + state.inflight.values().map(|v| v.len()).sum::<usize>();

        state.pending.clear();
        state.inflight.clear();
        num
    }
}

/// Everything the workers share with the cache.
pub struct Shared {
    pub table: Arc<ResourceTable>,
    pub tasks: TaskQueue,
    pub results: ResultQueue,
}

impl Shared {
    pub fn new(table: Arc<ResourceTable>) -> Self {
        Shared {
            table,
            tasks: TaskQueue::new(),
            results: ResultQueue::new(),
        }
    }

    /// Runs `task` on the current thread. Tasks whose resource has been removed from the
    /// table are dropped silently, with their callbacks.
    pub fn run(&self, task: LoadTask) {
        let id = task.id.clone();
        let kind = if task.reload { "reload" } else { "load" };

        match self.table.get(&id) {
            Some(resource) => {
                let result = task.execute(resource);
                debug!(
                    "[WorkerPool] {} of {} finished, success: {}.",
                    kind, id, result.success
                );
                self.results.push(result);
            }
            None => debug!("[WorkerPool] drops task of unknown resource {}.", id),
        }

        self.tasks.complete(&id);
    }
}

/// A fixed set of background threads servicing a `TaskQueue`.
pub struct WorkerPool {
    threads: Vec<thread::JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl WorkerPool {
    /// Launches `num` workers. Blocks current thread until all of them are running.
    pub fn new(num: usize, stack_size: Option<usize>, shared: Arc<Shared>) -> Self {
        shared.tasks.resume();

        let primed = Arc::new(CountLatch::new(num));
        let threads = (0..num)
            .map(|i| {
                let mut b = thread::Builder::new().name(format!("crayon-cache-worker-{}", i));
                if let Some(stack_size) = stack_size {
                    b = b.stack_size(stack_size);
                }

                let shared = shared.clone();
                let primed = primed.clone();
                b.spawn(move || WorkerPool::main_loop(i, &shared, &primed))
                    .expect("failed to spawn resource worker")
            })
            .collect();

        primed.wait();
        info!("[WorkerPool] launched {} workers.", num);

        WorkerPool { threads, shared }
    }

    /// Signals all the workers to quit, and blocks current thread until they finished their
    /// current tasks. Tasks that have not been dispatched stay in the queue.
    pub fn terminate(&mut self) {
        if self.threads.is_empty() {
            return;
        }

        self.shared.tasks.shutdown();

        let num = self.threads.len();
        for t in self.threads.drain(..) {
            if t.join().is_err() {
                warn!("[WorkerPool] a worker quits with panic.");
            }
        }

        info!("[WorkerPool] terminated {} workers.", num);
    }

    fn main_loop(index: usize, shared: &Shared, primed: &CountLatch) {
        primed.count_down();

        while let Some(task) = shared.tasks.pop() {
            debug!("[WorkerPool] worker {} picks {:?}.", index, task);
            shared.run(task);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate();
    }
}
