//! Module Exports
//!
//! - `agent`: the drive-loop controller.
//! - `drivers`: actuator and range-sensor traits implemented by board code.
//!
//! Commands reach the controller through `AGENT_CHANNEL`; `pace` feeds it
//! periodic drive ticks.

pub mod agent;
pub mod drivers;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Duration, Ticker};
use serde::{Deserialize, Serialize};

/// Channel used to receive agent commands (`AgentCommand` messages).
pub static AGENT_CHANNEL: embassy_sync::channel::Channel<CriticalSectionRawMutex, AgentCommand, 16> =
    embassy_sync::channel::Channel::new();

/// Agent command variants.
///
/// Serialized as JSON with tag `"ac"`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "ac", rename_all = "snake_case")] // ac = agent command
pub enum AgentCommand {
    /// Run one tick of the decision loop.
    Drive,
    /// Halt the actuator.
    Stop,
}

/// Send a `Drive` command every `period`.
///
/// With `ticks` set, sends that many drives followed by a single `Stop` and
/// returns; otherwise runs forever.
pub async fn pace(
    period: Duration,
    ticks: Option<u32>,
) {
    let mut ticker = Ticker::every(period);
    let mut sent: u32 = 0;
    while ticks.is_none_or(|limit| sent < limit) {
        ticker.next().await;
        AGENT_CHANNEL.send(AgentCommand::Drive).await;
        sent += 1;
    }
    tracing::info!(ticks = sent, "Pacer finished, stopping agent");
    AGENT_CHANNEL.send(AgentCommand::Stop).await;
}
