use std::sync::Arc;

use presence_core::{
    CancellationToken, HciTool, LogReaction, Presence, PresenceProbe, SharedReaction,
};
use tracing::{info, warn};

use crate::config::{Config, DeviceConfig};
use crate::reactions::{CommandReaction, Trigger};

/// Resolve the probe backend named by the configuration.
pub fn build_probe(config: &Config) -> presence_core::Result<HciTool> {
    match &config.hcitool {
        Some(path) => HciTool::with_path(path),
        None => HciTool::new(),
    }
}

/// Engine with every configured device registered.
pub fn build_engine(config: &Config, probe: Arc<dyn PresenceProbe>) -> Presence {
    let presence = Presence::new(probe);
    for device in &config.devices {
        presence.register(device.identifier.clone(), device_reactions(device));
    }
    presence
}

/// Reactions for one device, in the order they should run.
pub fn device_reactions(device: &DeviceConfig) -> Vec<SharedReaction> {
    let mut reactions: Vec<SharedReaction> = Vec::new();

    if device.log {
        let log = match &device.label {
            Some(label) => LogReaction::with_label(label.clone()),
            None => LogReaction::new(),
        };
        reactions.push(Arc::new(log));
    }

    let hooks = [
        (device.on_present.as_deref(), Trigger::Present),
        (device.on_absent.as_deref(), Trigger::Absent),
    ];
    for (argv, trigger) in hooks {
        if let Some(reaction) =
            argv.and_then(|argv| CommandReaction::from_argv(argv, trigger, device.label.clone()))
        {
            reactions.push(Arc::new(reaction));
        }
    }

    reactions
}

/// Token cancelled on Ctrl-C.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown requested");
                shutdown.cancel();
            }
            Err(err) => warn!("failed to listen for Ctrl-C: {err}"),
        }
    });
    token
}
