//! dropsync core runtime
//!
//! Foundational pieces shared by the dropsync crates:
//!
//! - **Events**: page event values routed to widgets by target node
//! - **State Machines**: flat transition tables for widget interaction states
//! - **Storage**: the `localStorage`-style key-value contract
//!
//! # Example
//!
//! ```rust
//! use dropsync_core::events::{event_types, Event};
//! use dropsync_core::fsm::{FsmRuntime, StateMachine};
//!
//! const CLOSED: u32 = 0;
//! const OPEN: u32 = 1;
//!
//! let mut runtime = FsmRuntime::new();
//! let panel = runtime.create(
//!     StateMachine::builder(CLOSED)
//!         .on(CLOSED, event_types::CLICK, OPEN)
//!         .on(OPEN, event_types::CLICK, CLOSED)
//!         .build(),
//! );
//!
//! let click = Event::click(1);
//! runtime.send(panel, click.event_type);
//! assert_eq!(runtime.current_state(panel), Some(OPEN));
//! ```

pub mod events;
pub mod fsm;
pub mod store;

pub use events::{event_types, Event, EventData, EventType, KeyCode};
pub use fsm::{FsmId, FsmRuntime, StateId, StateMachine, StateMachineBuilder, Transition};
pub use store::{KVStore, Storage};
