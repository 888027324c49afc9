//! Fixed-point scheduler
//!
//! Work reaches a consumer or a transition either by direct recursion, while the
//! propagation depth is below `propagation_depth_limit`, or through one of three
//! queues:
//! - **tasks**: consumer invocations postponed by the depth limit
//! - **pending transitions**: edges accumulating a batch of types
//! - **deferred**: reachability work (class initialisation, method bodies) that
//!   runs only once the first two queues are empty
//!
//! Deferred tasks run with the depth pinned at the limit, so everything they
//! trigger goes through the queues and reaches a fixed point before the next
//! round of deferred work.

use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{TransitionId, TypeIndex};
use crate::features::dependency::ports::{ConsumerId, DependencyConsumer};
use std::collections::VecDeque;
use tracing::{debug, info};

pub(crate) type DeferredTask = Box<dyn FnOnce(&mut DependencyAnalyzer)>;

pub(crate) struct ConsumerTask {
    consumer: ConsumerId,
    types: Vec<TypeIndex>,
}

#[derive(Default)]
pub(crate) struct Scheduler {
    pub(crate) tasks: VecDeque<ConsumerTask>,
    pub(crate) pending_transitions: VecDeque<TransitionId>,
    pub(crate) deferred: VecDeque<DeferredTask>,
    pub(crate) depth: usize,
}

impl Scheduler {
    pub(crate) fn is_idle(&self) -> bool {
        self.tasks.is_empty() && self.pending_transitions.is_empty() && self.deferred.is_empty()
    }
}

impl DependencyAnalyzer {
    /// Store a consumer in the arena; attach it to nodes with
    /// [`DependencyAnalyzer::add_consumer`]
    pub fn register_consumer(&mut self, consumer: impl DependencyConsumer + 'static) -> ConsumerId {
        let id = ConsumerId(self.consumers.len() as u32);
        self.consumers.push(Some(Box::new(consumer)));
        id
    }

    /// Queue reachability work to run once propagation settles
    pub fn defer(&mut self, task: impl FnOnce(&mut DependencyAnalyzer) + 'static) {
        self.scheduler.deferred.push_back(Box::new(task));
    }

    pub(crate) fn schedule_consumer(&mut self, consumer: ConsumerId, types: Vec<TypeIndex>) {
        if types.is_empty() {
            return;
        }
        if self.scheduler.depth < self.config.propagation_depth_limit {
            self.scheduler.depth += 1;
            self.run_consumer(consumer, types);
            self.scheduler.depth -= 1;
        } else {
            self.scheduler
                .tasks
                .push_back(ConsumerTask { consumer, types });
        }
    }

    pub(crate) fn schedule_transition(&mut self, transition: TransitionId, types: &[TypeIndex]) {
        if types.is_empty() {
            return;
        }
        let idle = self.transitions[transition.index()].pending_types.is_none();
        if idle && self.scheduler.depth < self.config.propagation_depth_limit {
            self.scheduler.depth += 1;
            self.consume_transition(transition, types);
            self.scheduler.depth -= 1;
            return;
        }

        let pending = &mut self.transitions[transition.index()].pending_types;
        match pending {
            Some(pending) => pending.extend(types.iter().copied()),
            None => {
                *pending = Some(types.iter().copied().collect());
                self.scheduler.pending_transitions.push_back(transition);
            }
        }
    }

    fn run_consumer(&mut self, id: ConsumerId, types: Vec<TypeIndex>) {
        let Some(slot) = self.consumers.get_mut(id.index()) else {
            return;
        };
        let Some(mut consumer) = slot.take() else {
            // Already running further up the stack
            self.scheduler.tasks.push_back(ConsumerTask {
                consumer: id,
                types,
            });
            return;
        };
        for ty in types {
            consumer.consume(self, ty);
        }
        if let Some(slot) = self.consumers.get_mut(id.index()) {
            *slot = Some(consumer);
        }
    }

    fn drain_transitions(&mut self) {
        while let Some(transition) = self.scheduler.pending_transitions.pop_front() {
            let Some(pending) = self
                .transitions
                .get_mut(transition.index())
                .and_then(|t| t.pending_types.take())
            else {
                continue;
            };
            let types: Vec<TypeIndex> = pending.into_iter().collect();
            self.consume_transition(transition, &types);
        }
    }

    /// Drain every queue to a fixed point, polling the interruptor every
    /// `interrupt_granularity` tasks
    pub(crate) fn process_queue(&mut self) {
        if self.interrupted {
            return;
        }
        let mut since_check = 0usize;
        while !self.scheduler.is_idle() {
            loop {
                self.drain_transitions();
                let Some(task) = self.scheduler.tasks.pop_front() else {
                    break;
                };
                self.stats.tasks += 1;
                self.run_consumer(task.consumer, task.types);
                if self.should_stop(&mut since_check) {
                    return;
                }
            }

            self.scheduler.depth = self.config.propagation_depth_limit;
            while let Some(task) = self.scheduler.deferred.pop_front() {
                self.stats.deferred_tasks += 1;
                task(self);
                if self.should_stop(&mut since_check) {
                    self.scheduler.depth = 0;
                    return;
                }
            }
            self.scheduler.depth = 0;
        }
        debug!(
            tasks = self.stats.tasks,
            deferred_tasks = self.stats.deferred_tasks,
            "Dependency queues drained"
        );
    }

    fn should_stop(&mut self, since_check: &mut usize) -> bool {
        *since_check += 1;
        if *since_check < self.config.interrupt_granularity {
            return false;
        }
        *since_check = 0;
        let stop = self
            .interruptor
            .as_ref()
            .is_some_and(|interruptor| !interruptor.should_continue());
        if stop {
            info!(
                pending_tasks = self.scheduler.tasks.len(),
                pending_deferred = self.scheduler.deferred.len(),
                "Interruptor requested stop"
            );
            self.interrupted = true;
        }
        stop
    }
}
