//! Finite state machines for widget interaction states
//!
//! A machine is a flat transition table over `u32` states and `u32` events.
//! Events with no matching transition are ignored, which lets widgets send
//! every event they receive without pre-filtering.
//!
//! ```rust
//! use dropsync_core::fsm::StateMachine;
//!
//! const CLOSED: u32 = 0;
//! const OPEN: u32 = 1;
//! const TOGGLE: u32 = 1;
//!
//! let mut fsm = StateMachine::builder(CLOSED)
//!     .on(CLOSED, TOGGLE, OPEN)
//!     .on(OPEN, TOGGLE, CLOSED)
//!     .build();
//!
//! fsm.send(TOGGLE);
//! assert_eq!(fsm.current_state(), OPEN);
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::events::EventType;

/// State identifier
pub type StateId = u32;

new_key_type! {
    /// Handle to a machine owned by an [`FsmRuntime`]
    pub struct FsmId;
}

/// A single `from --event--> to` edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventType,
    pub to: StateId,
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine {
    current: StateId,
    previous: Option<StateId>,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachine {
    /// Start building a machine in `initial` state
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// Current state
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// State before the last fired transition
    pub fn previous_state(&self) -> Option<StateId> {
        self.previous
    }

    /// Whether `event` has a transition out of the current state
    pub fn can_handle(&self, event: EventType) -> bool {
        self.find(event).is_some()
    }

    /// Feed an event
    ///
    /// Returns true if a transition fired (self-loops included).
    pub fn send(&mut self, event: EventType) -> bool {
        match self.find(event) {
            Some(transition) => {
                tracing::trace!(
                    "fsm: {} --{}--> {}",
                    transition.from,
                    transition.event,
                    transition.to
                );
                self.previous = Some(self.current);
                self.current = transition.to;
                true
            }
            None => false,
        }
    }

    /// All transitions, in declaration order
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    fn find(&self, event: EventType) -> Option<Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == self.current && t.event == event)
            .copied()
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachineBuilder {
    /// Add a transition. The first matching edge wins on send.
    pub fn on(mut self, from: StateId, event: EventType, to: StateId) -> Self {
        self.transitions.push(Transition { from, event, to });
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current: self.initial,
            previous: None,
            transitions: self.transitions,
        }
    }
}

/// Owner of many machines, addressed by [`FsmId`]
#[derive(Default)]
pub struct FsmRuntime {
    machines: SlotMap<FsmId, StateMachine>,
}

impl FsmRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a machine
    pub fn create(&mut self, fsm: StateMachine) -> FsmId {
        self.machines.insert(fsm)
    }

    /// Drop a machine
    pub fn remove(&mut self, id: FsmId) -> Option<StateMachine> {
        self.machines.remove(id)
    }

    pub fn current_state(&self, id: FsmId) -> Option<StateId> {
        self.machines.get(id).map(StateMachine::current_state)
    }

    /// Feed an event to one machine; false if it is unknown or nothing fired
    pub fn send(&mut self, id: FsmId, event: EventType) -> bool {
        self.machines
            .get_mut(id)
            .map(|fsm| fsm.send(event))
            .unwrap_or(false)
    }

    pub fn get(&self, id: FsmId) -> Option<&StateMachine> {
        self.machines.get(id)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}
