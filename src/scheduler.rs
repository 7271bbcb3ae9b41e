use bounded_counter::BoundedCounter;
use derive_more::{Display, From};

/// Handle returned by [`TickScheduler::submit`].
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, PartialEq)]
#[display("task-{_0}")]
pub struct TaskId(u64);

type Condition<W> = Box<dyn FnMut(&W, u32) -> bool + Send>;
type Body<W> = Box<dyn FnMut(&W, u32) + Send>;

/// A unit of work run on host ticks.
///
/// The body and condition receive the number of completed runs.
pub struct Task<W> {
    label:     &'static str,
    delay:     u64,
    period:    u64,
    budget:    Option<u32>,
    runs:      u32,
    next_run:  u64,
    condition: Option<Condition<W>>,
    until:     Option<Condition<W>>,
    body:      Body<W>,
}

impl<W> Task<W> {
    /// Runs once after `delay` ticks.
    pub fn later(label: &'static str, delay: u64, body: impl FnOnce(&W) + Send + 'static) -> Self {
        let mut body = Some(body);
        Self::new(label, delay, 0, move |world, _| {
            if let Some(body) = body.take() {
                body(world);
            }
        })
        .limit(1)
    }

    /// Runs every `period` ticks after `delay` ticks until stopped.
    pub fn timer(
        label: &'static str,
        delay: u64,
        period: u64,
        body: impl FnMut(&W, u32) + Send + 'static,
    ) -> Self {
        Self::new(label, delay, period.max(1), body)
    }

    fn new(
        label: &'static str,
        delay: u64,
        period: u64,
        body: impl FnMut(&W, u32) + Send + 'static,
    ) -> Self {
        Self {
            label,
            delay,
            period,
            budget: None,
            runs: 0,
            next_run: 0,
            condition: None,
            until: None,
            body: Box::new(body),
        }
    }

    /// Stops the task after `runs` executions.
    #[must_use]
    pub fn limit(mut self, runs: u32) -> Self {
        self.budget = Some(runs);
        self
    }

    /// Checked before every run; the task is dropped the first time it returns false.
    #[must_use]
    pub fn run_while(mut self, condition: impl FnMut(&W, u32) -> bool + Send + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    /// Checked before every run; the run on which it first returns true still happens and is the last.
    #[must_use]
    pub fn until(mut self, condition: impl FnMut(&W, u32) -> bool + Send + 'static) -> Self {
        self.until = Some(Box::new(condition));
        self
    }

    const fn exhausted(&self) -> bool {
        self.period == 0 || matches!(self.budget, Some(budget) if self.runs >= budget)
    }
}

struct Scheduled<W> {
    id:   TaskId,
    task: Task<W>,
}

/// Host tick driven task queue.
///
/// Tasks only run inside [`TickScheduler::tick`], so a host that ticks from a
/// single loop never runs two task bodies at once.
pub struct TickScheduler<W> {
    tick:    BoundedCounter<u64>,
    next_id: BoundedCounter<u64>,
    tasks:   Vec<Scheduled<W>>,
}

impl<W> Default for TickScheduler<W> {
    fn default() -> Self {
        Self {
            tick:    BoundedCounter::default(),
            next_id: BoundedCounter::default(),
            tasks:   Vec::new(),
        }
    }
}

impl<W> TickScheduler<W> {
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        *self.tick
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[must_use]
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|scheduled| scheduled.id == id)
    }

    /// Queues a task. A delay of zero runs on the next tick.
    pub fn submit(&mut self, mut task: Task<W>) -> TaskId {
        self.next_id.next();
        let id = TaskId(*self.next_id);

        task.next_run = *self.tick + task.delay.max(1);
        trace!("Scheduled {} as {id} for tick {}", task.label, task.next_run);
        self.tasks.push(Scheduled { id, task });

        id
    }

    pub fn cancel(&mut self, id: TaskId) -> bool {
        let len = self.tasks.len();
        self.tasks.retain(|scheduled| scheduled.id != id);
        len != self.tasks.len()
    }

    /// Advances one tick and runs every due task, returning how many bodies ran.
    pub fn tick(&mut self, world: &W) -> usize {
        self.tick.next();
        let now = *self.tick;
        let mut ran = 0;

        self.tasks.retain_mut(|Scheduled { id, task }| {
            if task.next_run > now {
                return true;
            }

            if let Some(condition) = task.condition.as_mut() {
                if !condition(world, task.runs) {
                    trace!("{} ({id}) stopped after {} runs", task.label, task.runs);
                    return false;
                }
            }

            let last = task.until.as_mut().is_some_and(|until| until(world, task.runs));

            (task.body)(world, task.runs);
            task.runs += 1;
            task.next_run = now + task.period;
            ran += 1;

            if last {
                trace!("{} ({id}) finished after {} runs", task.label, task.runs);
            }

            !last && !task.exhausted()
        });

        ran
    }
}
