//! Presentation view model
//!
//! A pure render of [`SessionState`] into what every frontend shows. The
//! HTTP API serves it as JSON and the terminal UI draws it.

use crate::catalog::{suggestion_text, INITIAL_SUGGESTIONS, TOPICS};
use crate::state_machine::{Message, Role, SessionState, Step};
use crate::tutor::TUTOR_NAME;
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt::Display;

pub const HEADER_TITLE: &str = "Tutoring Lab";
pub const WELCOME_HEADLINE: &str = "How can I help you think today?";
pub const WELCOME_BLURB: &str = "Ask a question, upload a problem, or explore a topic. I'll guide you step-by-step through the reasoning.";
pub const STEP_TRACKER_TITLE: &str = "Learning Journey";
pub const INPUT_PLACEHOLDER: &str = "Type your question or explain what you're working on...";
pub const INPUT_DISCLAIMER: &str = "Socratis helps you think. It will not solve the problem for you, but will guide you to the solution.";
const WORKSPACE_ENTRIES: [&str; 2] = ["Active Session", "Session History"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub sidebar: Sidebar,
    pub header: Header,
    pub body: Body,
    /// Absent until a plan exists
    pub step_tracker: Option<StepTracker>,
    pub input: InputBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sidebar {
    pub brand: String,
    pub workspace: Vec<NavEntry>,
    pub topics: Vec<NavEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavEntry {
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub title: String,
    /// LIVE badge
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Body {
    Welcome {
        headline: String,
        blurb: String,
        suggestions: Vec<Suggestion>,
    },
    Thread {
        messages: Vec<MessageView>,
        /// "thinking" indicator, present exactly while loading
        thinking: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// As displayed
    pub label: String,
    /// As sent
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// `HH:MM`
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTracker {
    pub title: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputBar {
    /// Send action available
    pub enabled: bool,
    pub placeholder: String,
    pub disclaimer: String,
}

/// Render with message times in the local timezone
pub fn render(state: &SessionState) -> SessionView {
    render_in(state, &Local)
}

pub fn render_in<Tz>(state: &SessionState, tz: &Tz) -> SessionView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let topics = TOPICS
        .iter()
        .map(|t| NavEntry {
            label: (*t).to_string(),
            active: state.current_topic.as_deref() == Some(*t),
        })
        .collect();

    let body = if state.messages.is_empty() {
        Body::Welcome {
            headline: WELCOME_HEADLINE.to_string(),
            blurb: WELCOME_BLURB.to_string(),
            suggestions: INITIAL_SUGGESTIONS
                .iter()
                .map(|s| Suggestion {
                    label: (*s).to_string(),
                    text: suggestion_text(s),
                })
                .collect(),
        }
    } else {
        Body::Thread {
            messages: state.messages.iter().map(|m| message_view(m, tz)).collect(),
            thinking: state
                .is_loading()
                .then(|| format!("{TUTOR_NAME} is thinking...")),
        }
    };

    SessionView {
        sidebar: Sidebar {
            brand: TUTOR_NAME.to_string(),
            workspace: WORKSPACE_ENTRIES
                .iter()
                .enumerate()
                .map(|(i, label)| NavEntry {
                    label: (*label).to_string(),
                    active: i == 0,
                })
                .collect(),
            topics,
        },
        header: Header {
            title: HEADER_TITLE.to_string(),
            live: !state.messages.is_empty(),
        },
        body,
        step_tracker: (!state.steps.is_empty()).then(|| StepTracker {
            title: STEP_TRACKER_TITLE.to_string(),
            steps: state.steps.clone(),
        }),
        input: InputBar {
            enabled: !state.is_loading(),
            placeholder: INPUT_PLACEHOLDER.to_string(),
            disclaimer: INPUT_DISCLAIMER.to_string(),
        },
    }
}

fn message_view<Tz>(message: &Message, tz: &Tz) -> MessageView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    MessageView {
        id: message.id.clone(),
        role: message.role,
        content: message.content.clone(),
        time: clock_time(&message.timestamp, tz),
        image_url: message.image_url.clone(),
    }
}

pub fn clock_time<Tz>(timestamp: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.with_timezone(tz).format("%H:%M").to_string()
}
