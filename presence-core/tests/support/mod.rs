#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use presence_core::{CancellationToken, PresenceProbe, ProbeError, Reaction, SharedReaction};

/// Scripted answer for one identifier.
#[derive(Debug, Clone)]
pub enum Answer {
    Present,
    Absent,
    Fail,
}

#[derive(Debug, Clone)]
struct Script {
    answer: Answer,
    delay: Option<Duration>,
}

/// Probe returning preconfigured answers, optionally after a delay. Unknown
/// identifiers are absent. Every call is recorded.
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, identifier: &str, answer: Answer) -> Self {
        self.scripts.insert(
            identifier.to_string(),
            Script {
                answer,
                delay: None,
            },
        );
        self
    }

    pub fn delayed(mut self, identifier: &str, answer: Answer, delay: Duration) -> Self {
        self.scripts.insert(
            identifier.to_string(),
            Script {
                answer,
                delay: Some(delay),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, identifier: &str) -> usize {
        self.calls.lock().iter().filter(|id| *id == identifier).count()
    }
}

#[async_trait]
impl PresenceProbe for ScriptedProbe {
    async fn is_present(
        &self,
        cancel: &CancellationToken,
        identifier: &str,
    ) -> Result<bool, ProbeError> {
        self.calls.lock().push(identifier.to_string());
        let script = self.scripts.get(identifier).cloned().unwrap_or(Script {
            answer: Answer::Absent,
            delay: None,
        });

        if let Some(delay) = script.delay {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ProbeError::Cancelled { identifier: identifier.to_string() });
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        match script.answer {
            Answer::Present => Ok(true),
            Answer::Absent => Ok(false),
            Answer::Fail => Err(ProbeError::Backend(format!("scripted failure for {identifier}"))),
        }
    }
}

/// Reaction that records every invocation under a name.
#[derive(Debug, Clone)]
pub struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<Call>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Call {
    pub reaction: &'static str,
    pub identifier: String,
    pub present: bool,
}

/// Shared invocation log for several recorders.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorder(&self, name: &'static str) -> SharedReaction {
        Arc::new(Recorder {
            name,
            log: Arc::clone(&self.0),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn sorted(&self) -> Vec<Call> {
        let mut calls = self.calls();
        calls.sort();
        calls
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().iter().filter(|c| c.reaction == name).count()
    }
}

impl Reaction for Recorder {
    fn status(&self, identifier: &str, present: bool) {
        self.log.lock().push(Call {
            reaction: self.name,
            identifier: identifier.to_string(),
            present,
        });
    }
}

pub fn call(reaction: &'static str, identifier: &str, present: bool) -> Call {
    Call {
        reaction,
        identifier: identifier.to_string(),
        present,
    }
}
