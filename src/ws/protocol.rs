//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

use crate::game::simulation::GameEvent;
use crate::game::{GameStateView, PlayerId};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Change movement direction; `value` is a direction name
    Direction { value: String },

    /// Fire along the current aim heading
    Shoot {},
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent to a client right after it connects
    Welcome { id: PlayerId },

    /// Another client connected
    NewClient { id: PlayerId },

    /// Full arena state, once per tick
    Update {
        #[serde(rename = "gameState")]
        game_state: GameStateView,
    },

    /// The receiving player was hit
    Eliminated { message: String },

    /// Someone else was hit
    #[serde(rename = "player_destroyed")]
    PlayerDestroyed { id: PlayerId },

    /// A client's connection closed
    Disconnected { from: PlayerId },

    Error { message: String },
}

impl From<GameEvent> for ServerMsg {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Eliminated { message } => ServerMsg::Eliminated { message },
            GameEvent::PlayerDestroyed { id } => ServerMsg::PlayerDestroyed { id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lifecycle_messages() {
        let id = PlayerId::new("C0A1B2");
        assert_eq!(
            serde_json::to_value(ServerMsg::Welcome { id: id.clone() }).unwrap(),
            json!({ "type": "welcome", "id": "C0A1B2" })
        );
        assert_eq!(
            serde_json::to_value(ServerMsg::NewClient { id: id.clone() }).unwrap(),
            json!({ "type": "newClient", "id": "C0A1B2" })
        );
        assert_eq!(
            serde_json::to_value(ServerMsg::Disconnected { from: id }).unwrap(),
            json!({ "type": "disconnected", "from": "C0A1B2" })
        );
    }

    #[test]
    fn test_game_events_on_the_wire() {
        let destroyed = ServerMsg::from(GameEvent::PlayerDestroyed { id: PlayerId::new("B") });
        assert_eq!(
            serde_json::to_value(destroyed).unwrap(),
            json!({ "type": "player_destroyed", "id": "B" })
        );

        let eliminated = ServerMsg::from(GameEvent::Eliminated {
            message: "out".to_string(),
        });
        assert_eq!(
            serde_json::to_value(eliminated).unwrap(),
            json!({ "type": "eliminated", "message": "out" })
        );
    }

    #[test]
    fn test_update_carries_game_state() {
        use crate::game::{GameConfig, Level, Simulation};

        let sim = Simulation::new(GameConfig::default(), Level::empty(), 1);
        let msg = ServerMsg::Update {
            game_state: sim.snapshot(),
        };
        let json = serde_json::to_value(msg).unwrap();

        assert_eq!(json["type"], "update");
        assert!(json["gameState"]["players"].as_array().unwrap().is_empty());
        assert!(json["gameState"]["projectiles"].as_array().unwrap().is_empty());
    }
}
