//! Session state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the runtime feeds events in and executes the effects that come out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{
    steps_from_labels, Message, MessageStamp, Phase, Role, SessionSnapshot, SessionState, Step,
    StepStatus,
};
pub use transition::{
    transition, TransitionError, TransitionResult, REPLY_ERROR_MESSAGE, STEP_ADVANCE_MIN_HISTORY,
};
