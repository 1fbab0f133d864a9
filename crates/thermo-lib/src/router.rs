use crate::command::{dispatch, Command, Effect, Notice};
use crate::config::AppConfig;
use crate::state::AppState;
use crate::Error;
use std::collections::VecDeque;

/// What the window has to do after a command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Notice(Notice),
    Exit,
}

/// Owns the app state and runs commands to completion on the UI thread,
/// performing any IO they request and turning failures into notices.
pub struct Router {
    state: AppState,
}

impl Router {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Widgets bind straight to bound controls, the threshold text and similar.
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn submit(&mut self, command: Command) -> Vec<Outcome> {
        let mut queue = VecDeque::from([command]);
        let mut outcomes = Vec::new();
        while let Some(command) = queue.pop_front() {
            let effects = match dispatch(&mut self.state, command) {
                Ok(effects) => effects,
                Err(err) => {
                    outcomes.push(Outcome::Notice(self.report(err)));
                    continue;
                }
            };
            for effect in effects {
                match effect {
                    Effect::Io(request) => match request.perform() {
                        Ok(next) => queue.push_back(next),
                        Err(err) => outcomes.push(Outcome::Notice(self.report(Error::Io(err)))),
                    },
                    Effect::Notify(notice) => outcomes.push(Outcome::Notice(notice)),
                    Effect::Exit => outcomes.push(Outcome::Exit),
                }
            }
        }
        outcomes
    }

    fn report(&mut self, err: Error) -> Notice {
        let message = match &err {
            Error::Io(inner) => format!("{inner:#}"),
            other => other.to_string(),
        };
        if err.is_user_error() {
            log::warn!("{message}");
        } else {
            log::error!("{message}");
        }
        self.state.status = message.clone();
        Notice::error(message)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
