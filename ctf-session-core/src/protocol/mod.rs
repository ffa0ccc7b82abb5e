mod wire;

pub use wire::{
    CapturePayload, DamagePayload, DeathPayload, FlagPayload, HitPayload, JoinPayload,
    PowerupCollectPayload, PowerupRespawnPayload, RespawnPayload, ShootPayload, StatePayload,
    WireError, WireMessage,
};
