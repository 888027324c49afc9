//! Reachability events
//!
//! Listener callbacks may reach new code and fire further events. Events raised
//! while a dispatch is in progress are queued and delivered in order by the
//! outermost dispatch, so a listener never re-enters itself.

use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::ports::{DependencyListener, DependencyPlugin};
use crate::shared::models::{CallLocation, FieldReference, MethodReference};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Clone)]
pub(crate) enum Event {
    ClassReached {
        class_name: String,
        location: CallLocation,
    },
    MethodReached {
        method: MethodReference,
        location: CallLocation,
    },
    FieldReached {
        field: FieldReference,
        location: CallLocation,
    },
    Completing,
}

#[derive(Default)]
pub(crate) struct EventQueue {
    pub(crate) listeners: Vec<Box<dyn DependencyListener>>,
    pub(crate) plugins: FxHashMap<MethodReference, Box<dyn DependencyPlugin>>,
    queue: VecDeque<Event>,
    dispatching: bool,
}

impl DependencyAnalyzer {
    pub(crate) fn fire(&mut self, event: Event) {
        self.events.queue.push_back(event);
        if self.events.dispatching {
            return;
        }
        self.events.dispatching = true;
        while let Some(event) = self.events.queue.pop_front() {
            self.dispatch(event);
        }
        self.events.dispatching = false;
    }

    fn dispatch(&mut self, event: Event) {
        if self.config.log_dependencies {
            trace!(event = ?event, "Dispatching event");
        }

        let mut listeners = std::mem::take(&mut self.events.listeners);
        for listener in &mut listeners {
            match &event {
                Event::ClassReached {
                    class_name,
                    location,
                } => listener.class_reached(self, class_name, location),
                Event::MethodReached { method, location } => {
                    listener.method_reached(self, method, location)
                }
                Event::FieldReached { field, location } => {
                    listener.field_reached(self, field, location)
                }
                Event::Completing => listener.completing(self),
            }
        }
        // Listeners registered by a callback go after the existing ones
        listeners.append(&mut self.events.listeners);
        self.events.listeners = listeners;

        if let Event::MethodReached { method, location } = event {
            if let Some(mut plugin) = self.events.plugins.remove(&method) {
                plugin.method_reached(self, &method, &location);
                self.events.plugins.entry(method).or_insert(plugin);
            }
        }
    }
}
