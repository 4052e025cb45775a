//! Engine <-> UI protocol
//!
//! The engines never print or read input themselves. Everything goes through a
//! [`Reporter`]:
//! - outbound: [`EngineEvent`] (command output lines, status messages, prompts)
//! - inbound: [`Answer`] to a pending [`EngineEvent::Confirm`]
//!
//! A console reporter has no channel and falls back to the `ui` module and
//! inherited stdio, which is what the CLI uses.

use crate::core::types::ManagerKind;
use crate::ui;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// One line of output from an external package manager process
    Output { manager: ManagerKind, line: String },
    Info(String),
    Success(String),
    Warning(String),
    /// The engine is blocked until an [`Answer`] arrives
    Confirm { question: String, allow_quit: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Quit,
}

pub type EventReceiver = Receiver<EngineEvent>;
pub type AnswerSender = Sender<Answer>;

pub struct Reporter {
    events: Option<Sender<EngineEvent>>,
    answers: Option<Mutex<Receiver<Answer>>>,
}

impl Reporter {
    /// Direct console/stdio behaviour
    pub fn console() -> Self {
        Self {
            events: None,
            answers: None,
        }
    }

    /// Create a reporter wired to a channel pair
    pub fn channel() -> (Reporter, EventReceiver, AnswerSender) {
        let (event_tx, event_rx) = mpsc::channel();
        let (answer_tx, answer_rx) = mpsc::channel();
        let reporter = Self {
            events: Some(event_tx),
            answers: Some(Mutex::new(answer_rx)),
        };
        (reporter, event_rx, answer_tx)
    }

    /// Whether process output should be captured and forwarded as events
    pub fn is_streaming(&self) -> bool {
        self.events.is_some()
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sender) = &self.events {
            // Receiver gone means nobody is rendering; keep going
            let _ = sender.send(event);
        }
    }

    pub fn output(&self, manager: ManagerKind, line: &str) {
        match &self.events {
            Some(_) => self.emit(EngineEvent::Output {
                manager,
                line: line.to_string(),
            }),
            None => println!("{}", line),
        }
    }

    pub fn info(&self, msg: &str) {
        match &self.events {
            Some(_) => self.emit(EngineEvent::Info(msg.to_string())),
            None => ui::info(msg),
        }
    }

    pub fn success(&self, msg: &str) {
        match &self.events {
            Some(_) => self.emit(EngineEvent::Success(msg.to_string())),
            None => ui::success(msg),
        }
    }

    pub fn warning(&self, msg: &str) {
        match &self.events {
            Some(_) => self.emit(EngineEvent::Warning(msg.to_string())),
            None => ui::warning(msg),
        }
    }

    /// Ask the consumer to confirm an action.
    ///
    /// A closed answer channel is treated as `Quit`.
    pub fn confirm(&self, question: &str, allow_quit: bool) -> Answer {
        let Some(answers) = &self.answers else {
            return match ui::prompt_choice(question, allow_quit) {
                ui::Choice::Yes => Answer::Yes,
                ui::Choice::No => Answer::No,
                ui::Choice::Quit => Answer::Quit,
            };
        };

        self.emit(EngineEvent::Confirm {
            question: question.to_string(),
            allow_quit,
        });

        let answer = match answers.lock() {
            Ok(rx) => rx.recv().unwrap_or(Answer::Quit),
            Err(_) => Answer::Quit,
        };

        match answer {
            Answer::Quit if !allow_quit => Answer::No,
            other => other,
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::console()
    }
}
