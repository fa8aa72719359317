//! Paces execution into fixed-size batches of steps per host "tick" and
//! lets the host interject NMI/IRQ requests and a cancellation flag
//! between steps. Reports why a tick ended early rather than a bare
//! running/stopped flag.

use crate::bus::{AudioSink, Framebuffer, InputSource, LogSink, OutputSink};
use crate::processor::{Processor, StepOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why a [`Scheduler::run_tick`] call stopped before exhausting its step
/// budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The full step budget ran without the program halting, erroring, or
    /// suspending.
    BudgetExhausted,
    Halted,
    Suspended,
    Error(crate::error::RuntimeError),
    Cancelled,
}

/// Runs a processor in batches of `steps_per_tick` steps, the way a host
/// event loop would call in between frames.
pub struct Scheduler {
    steps_per_tick: u32,
    cancel: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(steps_per_tick: u32) -> Scheduler {
        Scheduler {
            steps_per_tick,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle the host can hand to another thread (or a signal handler)
    /// to stop the run loop at the next step boundary.
    pub fn cancellation_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Runs up to `steps_per_tick` instructions, stopping early on a halt,
    /// a runtime error, a `WAI` suspension, or cancellation.
    pub fn run_tick<F, A, O, L>(
        &self,
        processor: &mut Processor<F, A, O, L>,
        input: &mut impl InputSource,
    ) -> TickOutcome
    where
        F: Framebuffer,
        A: AudioSink,
        O: OutputSink,
        L: LogSink,
    {
        for _ in 0..self.steps_per_tick {
            if self.cancel.load(Ordering::Relaxed) {
                return TickOutcome::Cancelled;
            }

            match processor.step(input) {
                StepOutcome::Continue => {}
                StepOutcome::Halted => return TickOutcome::Halted,
                StepOutcome::Suspended => return TickOutcome::Suspended,
                StepOutcome::Error(err) => return TickOutcome::Error(err),
            }
        }

        TickOutcome::BudgetExhausted
    }

    /// Runs ticks back to back until the processor stops executing for any
    /// reason other than a step-budget boundary.
    pub fn run_until_stopped<F, A, O, L>(
        &self,
        processor: &mut Processor<F, A, O, L>,
        input: &mut impl InputSource,
    ) -> TickOutcome
    where
        F: Framebuffer,
        A: AudioSink,
        O: OutputSink,
        L: LogSink,
    {
        loop {
            match self.run_tick(processor, input) {
                TickOutcome::BudgetExhausted => continue,
                other => return other,
            }
        }
    }
}
