//! Bounded worker pool shared by every parallel stage.
//!
//! Two join primitives are offered: [`WorkerPool::join_all`] blocks until a
//! batch of tasks has finished, and [`WorkerPool::admit`] keeps a sliding
//! window of tasks in flight, refilling a slot as soon as its task signals
//! completion. Task panics are caught at the pool boundary and returned as
//! [`WorkerPanic`] values.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::mpsc::{self, Receiver, Sender},
};

use log::debug;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;

/// Errors raised while starting the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The underlying thread pool could not be built.
    #[error("failed to start worker pool: {0}")]
    Build(#[from] ThreadPoolBuildError),
}

/// A task panicked instead of returning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("worker panicked: {message}")]
pub struct WorkerPanic {
    /// Panic payload rendered as text.
    pub message: String,
}

impl WorkerPanic {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_owned());
        Self { message }
    }

    fn lost() -> Self {
        Self {
            message: "task finished without reporting a result".to_owned(),
        }
    }
}

fn run_guarded<T, F>(task: F) -> Result<T, WorkerPanic>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(task)).map_err(|payload| WorkerPanic::from_payload(&*payload))
}

/// Completion report delivered by a [`CompletionSignal`].
#[derive(Debug)]
pub struct Completion<T> {
    /// Window slot the task occupied.
    pub slot: usize,
    /// Position of the task in the submitted batch.
    pub task: usize,
    /// Task result, or the panic it raised.
    pub result: Result<T, WorkerPanic>,
}

/// One-shot completion signal handed to a submitted task.
#[derive(Debug)]
pub struct CompletionSignal<T> {
    slot: usize,
    task: usize,
    sender: Sender<Completion<T>>,
}

impl<T> CompletionSignal<T> {
    /// Report the task's result; consumes the signal.
    pub fn fire(self, result: Result<T, WorkerPanic>) {
        let completion = Completion {
            slot: self.slot,
            task: self.task,
            result,
        };
        if self.sender.send(completion).is_err() {
            debug!("completion for task {} arrived after the queue closed", self.task);
        }
    }
}

/// Receiving side of the completion signals for one admission window.
#[derive(Debug)]
pub struct CompletionQueue<T> {
    sender: Sender<Completion<T>>,
    receiver: Receiver<Completion<T>>,
}

impl<T> CompletionQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Create the signal for `task` running in `slot`.
    #[must_use]
    pub fn signal(&self, slot: usize, task: usize) -> CompletionSignal<T> {
        CompletionSignal {
            slot,
            task,
            sender: self.sender.clone(),
        }
    }

    /// Block until any outstanding signal fires.
    ///
    /// Returns `None` once no signal can fire any more.
    pub fn wait_any(&self) -> Option<Completion<T>> {
        self.receiver.recv().ok()
    }
}

impl<T> Default for CompletionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Event emitted by [`WorkerPool::admit`].
#[derive(Debug)]
pub enum AdmissionEvent<T> {
    /// A task entered the window.
    Submitted {
        /// Window slot the task occupies.
        slot: usize,
        /// Position of the task in the submitted batch.
        task: usize,
    },
    /// A task left the window.
    Completed(Completion<T>),
}

/// Fixed-size pool of worker threads.
///
/// Nested use is supported: a task running on the pool may itself call
/// [`WorkerPool::join_all`]; the waiting worker keeps executing queued tasks
/// rather than blocking a thread.
#[derive(Debug)]
pub struct WorkerPool {
    pool: ThreadPool,
}

impl WorkerPool {
    /// Start a pool with `threads` workers, or one per logical core when
    /// `threads` is 0.
    pub fn new(threads: usize) -> Result<Self, PoolError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("courier-worker-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every task and wait for all of them.
    ///
    /// Results are returned in task order. A single task runs on the calling
    /// thread.
    pub fn join_all<T, F>(&self, tasks: Vec<F>) -> Vec<Result<T, WorkerPanic>>
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        if tasks.len() <= 1 {
            return tasks.into_iter().map(run_guarded).collect();
        }
        let mut slots: Vec<Option<Result<T, WorkerPanic>>> =
            std::iter::repeat_with(|| None).take(tasks.len()).collect();
        self.pool.scope(|scope| {
            for (slot, task) in slots.iter_mut().zip(tasks) {
                scope.spawn(move |_| {
                    *slot = Some(run_guarded(task));
                });
            }
        });
        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(WorkerPanic::lost())))
            .collect()
    }

    /// Run `tasks` with at most `window` in flight at once.
    ///
    /// The first `window` tasks are submitted immediately, each into its own
    /// slot. Whenever a task completes, the next unstarted task is submitted
    /// into the freed slot. `on_event` observes every completion followed by
    /// the submission that refilled its slot; it runs on the calling thread.
    pub fn admit<T, F, E>(&self, tasks: Vec<F>, window: usize, mut on_event: E)
    where
        F: FnOnce() -> T + Send,
        T: Send,
        E: FnMut(AdmissionEvent<T>),
    {
        let window = window.max(1);
        let queue = CompletionQueue::new();
        self.pool.in_place_scope(|scope| {
            let mut pending = tasks.into_iter().enumerate();
            let mut in_flight = 0_usize;
            for slot in 0..window {
                let Some((index, task)) = pending.next() else {
                    break;
                };
                let signal = queue.signal(slot, index);
                scope.spawn(move |_| signal.fire(run_guarded(task)));
                on_event(AdmissionEvent::Submitted { slot, task: index });
                in_flight = in_flight.saturating_add(1);
            }
            while in_flight > 0 {
                let Some(completion) = queue.wait_any() else {
                    break;
                };
                in_flight = in_flight.saturating_sub(1);
                let slot = completion.slot;
                let refilled = pending.next().map(|(index, task)| {
                    let signal = queue.signal(slot, index);
                    scope.spawn(move |_| signal.fire(run_guarded(task)));
                    index
                });
                if refilled.is_some() {
                    in_flight = in_flight.saturating_add(1);
                }
                on_event(AdmissionEvent::Completed(completion));
                if let Some(index) = refilled {
                    on_event(AdmissionEvent::Submitted { slot, task: index });
                }
            }
        });
    }
}
