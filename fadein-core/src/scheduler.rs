//! Deferred callbacks on the UI thread.
//!
//! [`MessageQueue`] is the single-threaded equivalent of a looper: tasks
//! are posted with a delay and run later, in deadline order, by whoever
//! drives the queue (the desktop event loop, or a test advancing time by
//! hand). Time is an elapsed [`Duration`] since the queue was created, so
//! the queue itself never reads a wall clock.
//!
//! ## Ordering
//!
//! ```text
//! post_delayed(d) ──► BTreeMap<(deadline, seq), Task>
//!                          │
//! run_until(now) ──────────┘ pops every entry with deadline <= now,
//!                            one at a time, with no borrow held while
//!                            the task runs (tasks may post or cancel).
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use log::trace;

/// A deferred callback.
pub type Task = Box<dyn FnOnce()>;

/// Handle identifying a posted task, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Something that can run callbacks later on the UI thread.
pub trait Scheduler {
    /// Run `task` after `delay`. The returned id can cancel it.
    fn post_delayed(&self, delay: Duration, task: Task) -> TaskId;

    /// Remove a pending task. Returns `false` if it already ran or was
    /// never posted.
    fn cancel(&self, id: TaskId) -> bool;
}

struct QueueInner {
    now: Duration,
    next_seq: u64,
    tasks: BTreeMap<(Duration, u64), Task>,
}

/// UI-thread deferred-callback queue. Cloning shares the same queue.
#[derive(Clone)]
pub struct MessageQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MessageQueue")
            .field("now", &inner.now)
            .field("pending", &inner.tasks.len())
            .finish()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueInner {
                now: Duration::ZERO,
                next_seq: 0,
                tasks: BTreeMap::new(),
            })),
        }
    }

    /// Current queue time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().tasks.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move the clock to `now` and run every task that has come due,
    /// including tasks posted by those tasks with a deadline `<= now`.
    ///
    /// The clock never moves backwards. Returns the number of tasks run.
    pub fn run_until(&self, now: Duration) -> usize {
        {
            let mut inner = self.inner.borrow_mut();
            if now > inner.now {
                inner.now = now;
            }
        }

        let mut ran = 0;
        while let Some(task) = self.pop_due() {
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!("message queue ran {ran} task(s) at {:?}", self.now());
        }
        ran
    }

    /// Advance the clock by `delta` and run due tasks.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.now() + delta;
        self.run_until(target)
    }

    /// Drop every pending task without running it.
    pub fn clear(&self) {
        self.inner.borrow_mut().tasks.clear();
    }

    fn pop_due(&self) -> Option<Task> {
        let mut inner = self.inner.borrow_mut();
        let now = inner.now;
        let key = *inner.tasks.keys().next()?;
        if key.0 > now {
            return None;
        }
        inner.tasks.remove(&key)
    }
}

impl Scheduler for MessageQueue {
    fn post_delayed(&self, delay: Duration, task: Task) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let deadline = inner.now + delay;
        inner.tasks.insert((deadline, seq), task);
        TaskId(seq)
    }

    fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let key = inner.tasks.keys().find(|(_, seq)| *seq == id.0).copied();
        match key {
            Some(key) => inner.tasks.remove(&key).is_some(),
            None => false,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
