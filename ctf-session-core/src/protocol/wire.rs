use crate::domain::{GameSnapshot, MatchRules, PeerIdentity, PlayerFields, Position, Team, Weapon};
use serde::{Deserialize, Serialize};

/// Errors raised while decoding or validating an inbound message
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum WireError {
    #[error("Malformed message: {0}")]
    Decode(String),

    #[error("Invalid '{field}' in {tag} message: {reason}")]
    InvalidField {
        tag: &'static str,
        field: &'static str,
        reason: &'static str,
    },

    #[error("Failed to encode {tag} message: {reason}")]
    Encode { tag: &'static str, reason: String },
}

/// Gameplay messages exchanged between peers.
///
/// Serialized as `{"type": "<tag>", "data": {..}}` with camelCase field
/// names. Receivers ignore unknown fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum WireMessage {
    Join(JoinPayload),
    State(StatePayload),
    Shoot(ShootPayload),
    BulletHit(HitPayload),
    RocketHit(HitPayload),
    Damage(DamagePayload),
    FlagPickup(FlagPayload),
    FlagCapture(CapturePayload),
    FlagReturn(FlagPayload),
    PlayerDeath(DeathPayload),
    PlayerRespawn(RespawnPayload),
    PowerupCollect(PowerupCollectPayload),
    PowerupRespawn(PowerupRespawnPayload),
    GameStateSnapshot(GameSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub id: PeerIdentity,
    /// Requested team; the host assigns the complement of its own regardless
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub display_name: String,
}

/// Per-field delta for the sender's own player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    pub id: PeerIdentity,
    #[serde(flatten)]
    pub fields: PlayerFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootPayload {
    pub id: PeerIdentity,
    pub weapon: Weapon,
    /// Muzzle position
    pub position: Position,
    /// Radians
    pub angle: f32,
    /// Pixels per second
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPayload {
    pub id: PeerIdentity,
    pub position: Position,
    #[serde(default)]
    pub target_id: Option<PeerIdentity>,
    /// Damage the shooter computed; forwarded to the damage handler
    #[serde(default)]
    pub damage: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamagePayload {
    pub id: PeerIdentity,
    pub target_id: PeerIdentity,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagPayload {
    pub id: PeerIdentity,
    pub flag: Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturePayload {
    pub id: PeerIdentity,
    /// Capturing team
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathPayload {
    pub id: PeerIdentity,
    /// Team of the player who died
    pub team: Team,
    pub position: Position,
    #[serde(default)]
    pub dropped_flag: Option<Team>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnPayload {
    pub id: PeerIdentity,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupCollectPayload {
    pub id: PeerIdentity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupRespawnPayload {
    pub id: PeerIdentity,
    pub position: Position,
}

impl WireMessage {
    /// Wire tag, for logging
    pub fn tag(&self) -> &'static str {
        match self {
            WireMessage::Join(_) => "join",
            WireMessage::State(_) => "state",
            WireMessage::Shoot(_) => "shoot",
            WireMessage::BulletHit(_) => "bulletHit",
            WireMessage::RocketHit(_) => "rocketHit",
            WireMessage::Damage(_) => "damage",
            WireMessage::FlagPickup(_) => "flagPickup",
            WireMessage::FlagCapture(_) => "flagCapture",
            WireMessage::FlagReturn(_) => "flagReturn",
            WireMessage::PlayerDeath(_) => "playerDeath",
            WireMessage::PlayerRespawn(_) => "playerRespawn",
            WireMessage::PowerupCollect(_) => "powerupCollect",
            WireMessage::PowerupRespawn(_) => "powerupRespawn",
            WireMessage::GameStateSnapshot(_) => "gameStateSnapshot",
        }
    }

    /// Identity of the peer that performed the action, if any
    pub fn actor(&self) -> Option<&PeerIdentity> {
        match self {
            WireMessage::Join(p) => Some(&p.id),
            WireMessage::State(p) => Some(&p.id),
            WireMessage::Shoot(p) => Some(&p.id),
            WireMessage::BulletHit(p) | WireMessage::RocketHit(p) => Some(&p.id),
            WireMessage::Damage(p) => Some(&p.id),
            WireMessage::FlagPickup(p) | WireMessage::FlagReturn(p) => Some(&p.id),
            WireMessage::FlagCapture(p) => Some(&p.id),
            WireMessage::PlayerDeath(p) => Some(&p.id),
            WireMessage::PlayerRespawn(p) => Some(&p.id),
            WireMessage::PowerupCollect(p) => Some(&p.id),
            WireMessage::PowerupRespawn(p) => Some(&p.id),
            WireMessage::GameStateSnapshot(_) => None,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(|e| WireError::Encode {
            tag: self.tag(),
            reason: e.to_string(),
        })
    }

    /// Decode without validation; see [`WireMessage::validate`]
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(|e| WireError::Decode(e.to_string()))
    }

    /// Shape and coarse plausibility checks.
    ///
    /// Positions must be finite and inside the arena (plus margin), angles
    /// and speeds finite, and damage amounts non-negative. Out-of-range
    /// health is clamped later rather than rejected here.
    pub fn validate(&self, rules: &MatchRules) -> Result<(), WireError> {
        let tag = self.tag();
        let position = |p: &Position| check(rules.contains(*p), tag, "position", "outside arena");

        match self {
            WireMessage::Join(p) => p.position.as_ref().map_or(Ok(()), position),
            WireMessage::State(p) => {
                p.fields.position.as_ref().map_or(Ok(()), position)?;
                let rotation_ok = p.fields.rotation.map_or(true, f32::is_finite);
                check(rotation_ok, tag, "rotation", "not finite")
            }
            WireMessage::Shoot(p) => {
                position(&p.position)?;
                check(p.angle.is_finite(), tag, "angle", "not finite")?;
                check(
                    p.speed.is_finite() && p.speed >= 0.0,
                    tag,
                    "speed",
                    "must be finite and non-negative",
                )
            }
            WireMessage::BulletHit(p) | WireMessage::RocketHit(p) => {
                position(&p.position)?;
                check(p.damage.map_or(true, |d| d >= 0), tag, "damage", "negative")
            }
            WireMessage::Damage(p) => check(p.amount >= 0, tag, "amount", "negative"),
            WireMessage::PlayerDeath(p) => position(&p.position),
            WireMessage::PlayerRespawn(p) => position(&p.position),
            WireMessage::PowerupRespawn(p) => position(&p.position),
            WireMessage::GameStateSnapshot(s) => {
                for player in &s.players {
                    position(&player.position)?;
                    check(player.rotation.is_finite(), tag, "rotation", "not finite")?;
                }
                position(&s.flags.red.position)?;
                position(&s.flags.blue.position)?;
                position(&s.power_up.position)
            }
            WireMessage::FlagPickup(_)
            | WireMessage::FlagCapture(_)
            | WireMessage::FlagReturn(_)
            | WireMessage::PowerupCollect(_) => Ok(()),
        }
    }
}

fn check(
    ok: bool,
    tag: &'static str,
    field: &'static str,
    reason: &'static str,
) -> Result<(), WireError> {
    if ok {
        Ok(())
    } else {
        Err(WireError::InvalidField { tag, field, reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GameStateMirror;
    use serde_json::json;

    fn id(s: &str) -> PeerIdentity {
        PeerIdentity::parse(s).unwrap()
    }

    #[test]
    fn test_wire_shape() {
        let msg = WireMessage::Damage(DamagePayload {
            id: id("2-client"),
            target_id: id("1-host"),
            amount: 30,
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "damage", "data": {"id": "2-client", "targetId": "1-host", "amount": 30}})
        );
    }

    #[test]
    fn test_state_fields_are_flattened() {
        let msg = WireMessage::State(StatePayload {
            id: id("2-client"),
            fields: PlayerFields::default()
                .position(Position::new(10.0, 20.0))
                .health(80),
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "state");
        assert_eq!(value["data"]["position"]["x"], 10.0);
        assert_eq!(value["data"]["health"], 80);
        assert!(value["data"].get("rotation").is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = json!({
            "type": "flagCapture",
            "data": {"id": "2-client", "team": "red", "emote": "wave"},
            "extra": true
        });

        let msg = WireMessage::decode(raw.to_string().as_bytes()).unwrap();
        assert_eq!(
            msg,
            WireMessage::FlagCapture(CapturePayload {
                id: id("2-client"),
                team: Team::Red
            })
        );
    }

    #[test]
    fn test_decode_rejects_missing_tag_and_fields() {
        let cases = [
            json!({"data": {"id": "2-client"}}),
            json!({"type": "teleport", "data": {}}),
            json!({"type": "damage", "data": {"id": "2-client", "amount": 5}}),
            json!({"type": "join", "data": {"id": "not-an-id!"}}),
        ];

        for raw in cases {
            let result = WireMessage::decode(raw.to_string().as_bytes());
            assert!(matches!(result, Err(WireError::Decode(_))), "{raw} should fail");
        }
    }

    #[test]
    fn test_validate_bounds() {
        let rules = MatchRules::default();
        let shoot = |x: f32, speed: f32| {
            WireMessage::Shoot(ShootPayload {
                id: id("2-client"),
                weapon: Weapon::Rifle,
                position: Position::new(x, 100.0),
                angle: 0.5,
                speed,
            })
        };

        assert!(shoot(200.0, 600.0).validate(&rules).is_ok());
        assert!(shoot(9000.0, 600.0).validate(&rules).is_err());
        assert_eq!(
            shoot(200.0, f32::INFINITY).validate(&rules),
            Err(WireError::InvalidField {
                tag: "shoot",
                field: "speed",
                reason: "must be finite and non-negative"
            })
        );
    }

    #[test]
    fn test_validate_negative_damage() {
        let rules = MatchRules::default();
        let msg = WireMessage::Damage(DamagePayload {
            id: id("2-client"),
            target_id: id("1-host"),
            amount: -10,
        });
        assert!(msg.validate(&rules).is_err());
    }

    #[test]
    fn test_snapshot_message_validates() {
        let rules = MatchRules::default();
        let mirror = GameStateMirror::new(id("1-host"), Team::Red, "Host", rules.clone());
        let msg = WireMessage::GameStateSnapshot(mirror.snapshot());

        assert!(msg.validate(&rules).is_ok());
        assert!(msg.actor().is_none());
        assert_eq!(msg.tag(), "gameStateSnapshot");

        let bytes = msg.encode().unwrap();
        assert_eq!(WireMessage::decode(&bytes).unwrap(), msg);
    }
}
