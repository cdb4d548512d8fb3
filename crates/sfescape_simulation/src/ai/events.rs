//! AI Events — связь enemy FSM с остальной симуляцией
//!
//! Power cycle → brain только через события (observer pattern):
//! PowerStateChanged / TargetPositionBroadcast.

use bevy::prelude::*;

use super::components::EnemyState;

/// Enemy сменил состояние FSM
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateChanged {
    pub entity: Entity,
    pub from: EnemyState,
    pub to: EnemyState,
}

/// Edge усиления (On/Off)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerStateChanged {
    pub entity: Entity,
    pub powered: bool,
}

/// Периодическая рассылка позиции цели в powered режиме
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TargetPositionBroadcast {
    pub entity: Entity,
    pub position: Vec3,
}

/// Шум в мире (шаги, брошенный предмет)
///
/// Enemies в `hearing_range` идут проверять источник (SoundChase).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NoiseEmitted {
    pub position: Vec3,
    /// Кто шумел (None = окружение)
    pub source: Option<Entity>,
}

/// Атака enemy достала цель
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAttackLanded {
    pub enemy: Entity,
    pub target: Entity,
}
