//! Live answer sessions for interactive front-ends
//!
//! A live session runs [`ChatBot::get_answer`] on a worker task so that the
//! front-end keeps rendering while the model thinks. Two tasks feed one
//! unbounded, ordered event queue:
//!
//! - the answer worker, which forwards narration as [`StatusEvent::Status`],
//!   drops the final answer into a one-slot channel and then pushes exactly one
//!   [`StatusEvent::Outcome`]
//! - the heartbeat, which pushes [`StatusEvent::Tick`] at a fixed interval until
//!   it is told to stop
//!
//! The consumer ([`LiveSession::drain`]) renders events until it sees the
//! outcome, then stops the heartbeat and collects the answer.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = LiveSession::start(chatbot, "What is the capital of France?", options);
//! let answer = session.drain(&mut renderer).await;
//! println!("{}", answer.answer);
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::chatbot::ChatBot;
use crate::config::EvalConfig;
use crate::context::ChatContext;

/// Terminal state of one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    Complete,
    Error,
}

/// Event flowing from a running answer to its renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatusEvent {
    /// Free-text narration
    Status { text: String },
    /// Heartbeat for elapsed-time refresh
    Tick,
    /// The answer is done; always the last event of a session
    Outcome { state: OutcomeState },
}

impl StatusEvent {
    /// Narration event
    pub fn status(text: impl Into<String>) -> Self {
        StatusEvent::Status { text: text.into() }
    }
}

/// Label shown next to a running or finished answer
pub fn status_label(state: Option<OutcomeState>, elapsed: Duration) -> String {
    let label = match state {
        None => "Generating...",
        Some(OutcomeState::Complete) => "Done",
        Some(OutcomeState::Error) => "Error",
    };
    format!("{} `{:.1} s`", label, elapsed.as_secs_f64())
}

/// Consumer of live session events
pub trait LiveRenderer {
    /// Narration arrived
    fn on_status(&mut self, text: &str);

    /// Heartbeat; `elapsed` is measured from session start
    fn on_tick(&mut self, _elapsed: Duration) {}

    /// The answer finished
    fn on_outcome(&mut self, _state: OutcomeState, _elapsed: Duration) {}
}

/// Options for a live session
#[derive(Debug, Clone)]
pub struct LiveOptions {
    /// Interval between heartbeat ticks
    pub heartbeat_interval: Duration,

    /// Narrate full model transcripts
    pub verbose: bool,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_millis(100),
            verbose: false,
        }
    }
}

impl LiveOptions {
    /// Options derived from the evaluation config
    pub fn from_config(config: &EvalConfig, verbose: bool) -> Self {
        Self {
            heartbeat_interval: config.heartbeat_interval,
            verbose,
        }
    }
}

/// Result of a drained live session
#[derive(Debug, Clone)]
pub struct LiveAnswer {
    /// The answer, or the error description when the chatbot failed
    pub answer: String,

    /// How the session ended
    pub state: OutcomeState,

    /// Time from session start to the outcome event
    pub elapsed: Duration,

    /// Narration received, in order
    pub narration: Vec<String>,
}

impl LiveAnswer {
    /// Whether the chatbot produced an answer
    pub fn is_complete(&self) -> bool {
        self.state == OutcomeState::Complete
    }
}

/// One question being answered in the background
pub struct LiveSession {
    events: mpsc::UnboundedReceiver<StatusEvent>,
    answer: oneshot::Receiver<String>,
    stop_heartbeat: CancellationToken,
    heartbeat: JoinHandle<()>,
    started: Instant,
}

impl LiveSession {
    /// Spawn the answer worker and the heartbeat.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(chatbot: Arc<dyn ChatBot>, question: impl Into<String>, options: LiveOptions) -> Self {
        let question = question.into();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (answer_tx, answer_rx) = oneshot::channel();
        let stop_heartbeat = CancellationToken::new();
        let started = Instant::now();

        let ctx = ChatContext::from_sender(events_tx.clone()).with_verbose(options.verbose);
        let worker_events = events_tx.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(chatbot.get_answer(&question, &ctx))
                .catch_unwind()
                .await;

            let (answer, state) = match result {
                Ok(Ok(answer)) => (answer, OutcomeState::Complete),
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "Chatbot failed to answer");
                    (e.to_string(), OutcomeState::Error)
                }
                Err(_) => (
                    "Chatbot panicked while answering".to_string(),
                    OutcomeState::Error,
                ),
            };

            // answer first, so it is available once the outcome is observed
            let _ = answer_tx.send(answer);
            let _ = worker_events.send(StatusEvent::Outcome { state });
        });

        let heartbeat = tokio::spawn(heartbeat(
            events_tx,
            options.heartbeat_interval,
            stop_heartbeat.clone(),
        ));

        Self {
            events: events_rx,
            answer: answer_rx,
            stop_heartbeat,
            heartbeat,
            started,
        }
    }

    /// Render events until the outcome arrives, then return the answer.
    pub async fn drain(mut self, renderer: &mut dyn LiveRenderer) -> LiveAnswer {
        let mut narration = Vec::new();
        let mut outcome = None;

        while let Some(event) = self.events.recv().await {
            match event {
                StatusEvent::Tick => renderer.on_tick(self.started.elapsed()),
                StatusEvent::Status { text } => {
                    renderer.on_status(&text);
                    narration.push(text);
                }
                StatusEvent::Outcome { state } => {
                    let elapsed = self.started.elapsed();
                    self.stop_heartbeat.cancel();
                    renderer.on_outcome(state, elapsed);
                    outcome = Some((state, elapsed));
                    break;
                }
            }
        }

        // the worker always reports an outcome; this guards a runtime shutdown
        let (state, elapsed) = outcome.unwrap_or((OutcomeState::Error, self.started.elapsed()));
        self.stop_heartbeat.cancel();
        let _ = self.heartbeat.await;

        let answer = self
            .answer
            .await
            .unwrap_or_else(|_| "Answer worker stopped without a reply".to_string());

        LiveAnswer {
            answer,
            state,
            elapsed,
            narration,
        }
    }
}

async fn heartbeat(
    events: mpsc::UnboundedSender<StatusEvent>,
    interval: Duration,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                if events.send(StatusEvent::Tick).is_err() {
                    break;
                }
            }
        }
    }
}
