//! Peripheral tasks and their run gates.
//!
//! Each peripheral gets one long-lived task, created at startup and never
//! destroyed. A task is parked rather than stopped: the focus coordinator
//! flips its [`RunGate`], and the task checks the gate at the top of every
//! iteration. Parking never resets the task's local state.

use core::sync::atomic::{
    AtomicBool,
    Ordering,
};

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    signal::Signal,
};
use embassy_time::{
    Duration,
    Timer,
};

use crate::{
    config,
    display_lock::DisplayLock,
    error::Error,
};

/// The tasks the focus coordinator parks and resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskId {
    Imu,
    Microphone,
    Fft,
    Wifi,
    Touch,
    LedBarSolid,
    LedBarAnimation,
}

impl TaskId {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Imu,
        Self::Microphone,
        Self::Fft,
        Self::Wifi,
        Self::Touch,
        Self::LedBarSolid,
        Self::LedBarAnimation,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Imu => "imuTask",
            Self::Microphone => "micTask",
            Self::Fft => "fftTask",
            Self::Wifi => "wifiTask",
            Self::Touch => "touchTask",
            Self::LedBarSolid => "ledSolidTask",
            Self::LedBarAnimation => "ledAnimationTask",
        }
    }

    /// Sleep between two refresh cycles.
    pub const fn period(self) -> Duration {
        match self {
            Self::Imu => config::IMU_PERIOD,
            Self::Microphone => config::MIC_PERIOD,
            Self::Fft => config::FFT_PERIOD,
            Self::Wifi => config::WIFI_PERIOD,
            Self::Touch => config::TOUCH_PERIOD,
            Self::LedBarSolid => config::LED_SOLID_PERIOD,
            Self::LedBarAnimation => config::LED_ANIMATION_PERIOD,
        }
    }
}

impl core::fmt::Display for TaskId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// A small set of [`TaskId`]s, one bit per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskSet(u8);

impl TaskSet {
    pub const EMPTY: Self = Self(0);

    pub const fn of(ids: &[TaskId]) -> Self {
        let mut set = Self::EMPTY;
        let mut i = 0;
        while i < ids.len() {
            set = set.with(ids[i]);
            i += 1;
        }
        set
    }

    pub const fn with(self, id: TaskId) -> Self {
        Self(self.0 | 1 << id.index())
    }

    pub const fn without(self, id: TaskId) -> Self {
        Self(self.0 & !(1 << id.index()))
    }

    pub const fn contains(self, id: TaskId) -> bool {
        self.0 & 1 << id.index() != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = TaskId> {
        TaskId::ALL.into_iter().filter(move |id| self.contains(*id))
    }
}

impl FromIterator<TaskId> for TaskSet {
    fn from_iter<I: IntoIterator<Item = TaskId>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Something the coordinator can park and wake.
///
/// Both operations are idempotent: suspending a suspended task or resuming
/// an active one changes nothing.
pub trait Suspendable {
    fn suspend(&self);
    fn resume(&self);
    fn is_active(&self) -> bool;
}

/// Cooperative should-run flag behind every task handle.
pub struct RunGate {
    active: AtomicBool,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl RunGate {
    /// A gate that starts parked.
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            wake: Signal::new(),
        }
    }

    /// A gate that starts open, for tasks nobody coordinates.
    pub const fn new_active() -> Self {
        Self {
            active: AtomicBool::new(true),
            wake: Signal::new(),
        }
    }

    /// Return once the gate is open.
    pub async fn wait_active(&self) {
        while !self.active.load(Ordering::Acquire) {
            self.wake.wait().await;
        }
    }
}

impl Default for RunGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Suspendable for RunGate {
    fn suspend(&self) {
        self.active.store(false, Ordering::Release);
    }

    fn resume(&self) {
        self.active.store(true, Ordering::Release);
        self.wake.signal(());
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Lookup from task identity to its handle.
pub trait TaskRegistry {
    fn task(&self, id: TaskId) -> &dyn Suspendable;

    /// The tasks currently allowed to run.
    fn active_set(&self) -> TaskSet {
        TaskId::ALL
            .into_iter()
            .filter(|id| self.task(*id).is_active())
            .collect()
    }
}

/// One run gate per coordinated task, suitable for a `static`.
pub struct TaskGates {
    gates: [RunGate; TaskId::COUNT],
}

impl TaskGates {
    pub const fn new() -> Self {
        Self {
            gates: [const { RunGate::new() }; TaskId::COUNT],
        }
    }

    pub const fn gate(&self, id: TaskId) -> &RunGate {
        &self.gates[id.index()]
    }
}

impl Default for TaskGates {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry for TaskGates {
    fn task(&self, id: TaskId) -> &dyn Suspendable {
        self.gate(id)
    }
}

/// The body of a peripheral task: one refresh cycle.
///
/// A body reads its driver, then takes the display lock only for the widget
/// update, and returns before the task sleeps. Bodies that never draw (the
/// LED bar) simply ignore the lock.
pub trait Poll<S> {
    /// Task name used in log lines.
    const NAME: &'static str;

    async fn poll(&mut self, display: &DisplayLock<S>) -> Result<(), Error>;
}

/// A body bound to its gate, the display lock and a polling period.
pub struct PeripheralTask<'a, S, P> {
    gate: &'a RunGate,
    display: &'a DisplayLock<S>,
    body: P,
    period: Duration,
}

impl<'a, S, P: Poll<S>> PeripheralTask<'a, S, P> {
    pub const fn new(gate: &'a RunGate, display: &'a DisplayLock<S>, body: P, period: Duration) -> Self {
        Self {
            gate,
            display,
            body,
            period,
        }
    }

    pub const fn body(&self) -> &P {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut P {
        &mut self.body
    }

    /// One iteration without the trailing sleep. A failed read is logged
    /// and reported as `false`; whatever is on screen stays there.
    pub async fn step(&mut self) -> bool {
        self.gate.wait_active().await;
        match self.body.poll(self.display).await {
            Ok(()) => true,
            Err(e) => {
                error!("{}: read failed: {}", P::NAME, e);
                false
            }
        }
    }

    pub async fn run(mut self) -> ! {
        info!("{} started", P::NAME);
        loop {
            self.step().await;
            Timer::after(self.period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use core::{
        future::Future,
        pin::pin,
        task::{
            Context,
            Poll as FuturePoll,
            Waker,
        },
    };

    use embassy_futures::block_on;

    use super::*;

    fn poll_once<F: Future>(fut: core::pin::Pin<&mut F>) -> FuturePoll<F::Output> {
        let mut cx = Context::from_waker(Waker::noop());
        fut.poll(&mut cx)
    }

    struct Counter {
        polls: u32,
        fail_every: Option<u32>,
    }

    impl Poll<u32> for Counter {
        const NAME: &'static str = "counterTask";

        async fn poll(&mut self, display: &DisplayLock<u32>) -> Result<(), Error> {
            self.polls += 1;
            if let Some(n) = self.fail_every
                && self.polls % n == 0
            {
                return Err(Error::Bus);
            }
            display.with(|frame| *frame += 1).await;
            Ok(())
        }
    }

    #[test]
    fn task_set_operations() {
        let set = TaskSet::of(&[TaskId::Imu, TaskId::Fft]);
        assert!(set.contains(TaskId::Imu));
        assert!(!set.contains(TaskId::Wifi));
        assert_eq!(set.len(), 2);
        assert_eq!(set.without(TaskId::Imu), TaskSet::of(&[TaskId::Fft]));
        assert_eq!(
            set.union(TaskSet::of(&[TaskId::Touch])).iter().collect::<std::vec::Vec<_>>(),
            [TaskId::Imu, TaskId::Fft, TaskId::Touch]
        );
        assert!(set.difference(set).is_empty());
    }

    #[test]
    fn capture_outpaces_analysis() {
        assert!(TaskId::Microphone.period() < TaskId::Fft.period());
        assert_eq!(TaskId::Wifi.period(), Duration::from_secs(1));
    }

    #[test]
    fn gate_is_idempotent() {
        let gate = RunGate::new();
        assert!(!gate.is_active());
        gate.suspend();
        assert!(!gate.is_active());
        gate.resume();
        gate.resume();
        assert!(gate.is_active());
        gate.suspend();
        assert!(!gate.is_active());
    }

    #[test]
    fn parked_task_does_no_work() {
        let gate = RunGate::new();
        let display = DisplayLock::new(0_u32);
        let mut task = PeripheralTask::new(
            &gate,
            &display,
            Counter {
                polls: 0,
                fail_every: None,
            },
            Duration::from_millis(10),
        );

        {
            let mut step = pin!(task.step());
            assert!(poll_once(step.as_mut()).is_pending());
            assert!(poll_once(step.as_mut()).is_pending());
        }
        assert_eq!(task.body().polls, 0);
        assert!(display.try_acquire().is_some(), "parked task must not hold the lock");
    }

    #[test]
    fn resume_wakes_a_parked_step() {
        let gate = RunGate::new();
        let display = DisplayLock::new(0_u32);
        let mut task = PeripheralTask::new(
            &gate,
            &display,
            Counter {
                polls: 0,
                fail_every: None,
            },
            Duration::from_millis(10),
        );

        {
            let mut step = pin!(task.step());
            assert!(poll_once(step.as_mut()).is_pending());
            gate.resume();
            assert_eq!(poll_once(step.as_mut()), FuturePoll::Ready(true));
        }
        assert_eq!(task.body().polls, 1);
        assert_eq!(block_on(display.with(|frame| *frame)), 1);
    }

    #[test]
    fn state_survives_suspend_and_resume() {
        let gate = RunGate::new_active();
        let display = DisplayLock::new(0_u32);
        let mut task = PeripheralTask::new(
            &gate,
            &display,
            Counter {
                polls: 0,
                fail_every: None,
            },
            Duration::from_millis(10),
        );

        block_on(task.step());
        block_on(task.step());
        gate.suspend();
        gate.resume();
        block_on(task.step());
        assert_eq!(task.body().polls, 3);
    }

    #[test]
    fn read_failure_keeps_the_task_going() {
        let gate = RunGate::new_active();
        let display = DisplayLock::new(0_u32);
        let mut task = PeripheralTask::new(
            &gate,
            &display,
            Counter {
                polls: 0,
                fail_every: Some(2),
            },
            Duration::from_millis(10),
        );

        assert!(block_on(task.step()));
        assert!(!block_on(task.step()));
        assert!(block_on(task.step()));
        // The failed cycle left the frame untouched.
        assert_eq!(block_on(display.with(|frame| *frame)), 2);
    }

    #[test]
    fn gates_report_the_active_set() {
        let gates = TaskGates::new();
        gates.gate(TaskId::Wifi).resume();
        gates.gate(TaskId::LedBarAnimation).resume();
        assert_eq!(
            gates.active_set(),
            TaskSet::of(&[TaskId::Wifi, TaskId::LedBarAnimation])
        );
    }
}
