//! Inbound command decoding and dispatch

use tracing::debug;

use super::simulation::Simulation;
use super::{Direction, PlayerId};
use crate::ws::protocol::ClientMsg;

/// A decoded player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Direction(Direction),
    Shoot,
}

/// Turns raw client payloads into simulation calls
pub struct CommandRouter;

impl CommandRouter {
    /// Decode a text frame. Malformed payloads, unknown message types and
    /// unknown direction names all yield `None`.
    pub fn decode(raw: &str) -> Option<Command> {
        let msg: ClientMsg = match serde_json::from_str(raw) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(error = %e, "Discarding undecodable message");
                return None;
            }
        };

        match msg {
            ClientMsg::Direction { value } => match value.parse::<Direction>() {
                Ok(direction) => Some(Command::Direction(direction)),
                Err(e) => {
                    debug!(error = %e, "Discarding direction");
                    None
                }
            },
            ClientMsg::Shoot {} => Some(Command::Shoot),
        }
    }

    pub fn apply(sim: &mut Simulation, id: &PlayerId, command: Command, now_ms: u64) {
        match command {
            Command::Direction(direction) => sim.set_direction(id, direction),
            Command::Shoot => {
                sim.shoot(id, now_ms);
            }
        }
    }
}
