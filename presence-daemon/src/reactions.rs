use std::process::Stdio;

use presence_core::Reaction;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

pub const ENV_IDENTIFIER: &str = "PRESENCE_IDENTIFIER";
pub const ENV_STATE: &str = "PRESENCE_STATE";
pub const ENV_LABEL: &str = "PRESENCE_LABEL";

/// Which scan result fires a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Present,
    Absent,
}

impl Trigger {
    fn matches(self, present: bool) -> bool {
        match self {
            Trigger::Present => present,
            Trigger::Absent => !present,
        }
    }
}

pub fn state_name(present: bool) -> &'static str {
    if present { "present" } else { "absent" }
}

/// Runs an external command when the scan result matches its trigger.
///
/// The child is not awaited; the tokio runtime reaps it once it exits.
#[derive(Debug, Clone)]
pub struct CommandReaction {
    program: String,
    args: Vec<String>,
    trigger: Trigger,
    label: Option<String>,
}

impl CommandReaction {
    /// Build from an argv list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String], trigger: Trigger, label: Option<String>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            trigger,
            label,
        })
    }

    pub(crate) fn spawn(&self, identifier: &str, present: bool) -> std::io::Result<Child> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .env(ENV_IDENTIFIER, identifier)
            .env(ENV_STATE, state_name(present))
            .stdin(Stdio::null());
        if let Some(label) = &self.label {
            cmd.env(ENV_LABEL, label);
        }
        cmd.spawn()
    }
}

impl Reaction for CommandReaction {
    fn status(&self, identifier: &str, present: bool) {
        if !self.trigger.matches(present) {
            return;
        }

        match self.spawn(identifier, present) {
            Ok(child) => debug!(
                identifier,
                program = %self.program,
                pid = child.id(),
                "presence hook started"
            ),
            Err(err) => warn!(
                identifier,
                program = %self.program,
                error = %err,
                "failed to start presence hook"
            ),
        }
    }
}
