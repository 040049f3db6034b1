//! Session runtime executor

use super::traits::StepProgression;
use super::SessionEvent;

use crate::attachment::ImageData;
use crate::state_machine::{
    transition, Effect, Event, MessageStamp, SessionSnapshot, SessionState, TransitionError,
};
use crate::tutor::TutorGateway;
use std::collections::VecDeque;
use tokio::sync::{broadcast, Mutex};

const BROADCAST_CAPACITY: usize = 128;

/// Generic session runtime that can work with any gateway and progression
pub struct SessionRuntime<G, P>
where
    G: TutorGateway,
    P: StepProgression,
{
    state: Mutex<SessionState>,
    gateway: G,
    progression: P,
    broadcast_tx: broadcast::Sender<SessionEvent>,
}

impl<G, P> SessionRuntime<G, P>
where
    G: TutorGateway,
    P: StepProgression,
{
    pub fn new(gateway: G, progression: P) -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            state: Mutex::new(SessionState::new()),
            gateway,
            progression,
            broadcast_tx,
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    /// Subscribe together with the state at the moment of subscription, so
    /// no event falls between the two
    pub async fn attach(&self) -> (SessionSnapshot, broadcast::Receiver<SessionEvent>) {
        let state = self.state.lock().await;
        (state.snapshot(), self.broadcast_tx.subscribe())
    }

    /// Full send cycle: accept the message, then plan and reply.
    ///
    /// Returns once the session is idle again. Tutor failures are absorbed
    /// into the transcript; only rejected sends surface as errors.
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        image: Option<ImageData>,
    ) -> Result<(), TransitionError> {
        let effects = self.submit_message(text, image).await?;
        self.drive(effects).await;
        Ok(())
    }

    /// Accept a user message without running the round trip.
    ///
    /// The returned effects must be handed to [`Self::drive`]; until then the
    /// session stays busy.
    pub async fn submit_message(
        &self,
        text: impl Into<String>,
        image: Option<ImageData>,
    ) -> Result<Vec<Effect>, TransitionError> {
        let event = Event::UserMessage {
            text: text.into(),
            image,
            stamp: MessageStamp::now(),
        };

        match self.apply(event).await {
            Ok(effects) => Ok(effects),
            Err(e) => {
                tracing::debug!(error = %e, "Rejected user message");
                Err(e)
            }
        }
    }

    /// Record the user's topic choice. Any label is accepted.
    pub async fn select_topic(&self, label: impl Into<String>) {
        let label = label.into();
        tracing::debug!(topic = %label, "Topic selected");
        match self.apply(Event::TopicSelected { label }).await {
            Ok(effects) => self.drive(effects).await,
            Err(e) => tracing::error!(error = %e, "Topic selection rejected"),
        }
    }

    /// Execute effects until none remain
    pub async fn drive(&self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            let Some(event) = self.execute_effect(effect).await else {
                continue;
            };
            match self.apply(event).await {
                Ok(more) => queue.extend(more),
                Err(e) => {
                    tracing::error!(error = %e, "Tutor outcome rejected by session");
                    self.notify(SessionEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }
    }

    /// Pure transition under the state lock; no I/O happens while it is held
    async fn apply(&self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let mut state = self.state.lock().await;
        let event_name = event.name();
        let result = transition(&state, event)?;
        tracing::debug!(
            event = event_name,
            from = state.phase.name(),
            to = result.new_state.phase.name(),
            messages = result.new_state.messages.len(),
            "Session transition"
        );
        *state = result.new_state;
        Ok(result.effects)
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::Notify(event) => {
                self.notify(event);
                None
            }

            Effect::PlanSteps { problem } => {
                let labels = self.gateway.plan_steps(&problem).await;
                tracing::info!(steps = labels.len(), "Learning journey planned");
                Some(Event::StepsPlanned { labels })
            }

            Effect::RequestReply { transcript, image } => {
                let outcome = self
                    .gateway
                    .continue_conversation(&transcript, image.as_ref())
                    .await;
                let stamp = MessageStamp::now();
                match outcome {
                    Ok(text) => Some(Event::TutorReplied {
                        text,
                        stamp,
                        advance_step: self.progression.should_advance(),
                    }),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            kind = ?e.kind,
                            transcript = transcript.len(),
                            "Tutor reply failed"
                        );
                        Some(Event::TutorFailed {
                            error: e.to_string(),
                            stamp,
                        })
                    }
                }
            }
        }
    }

    fn notify(&self, event: SessionEvent) {
        // No receivers is fine
        let _ = self.broadcast_tx.send(event);
    }
}
