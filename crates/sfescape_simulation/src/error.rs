//! Ошибки симуляции
//!
//! Два класса:
//! - caller-contract нарушения (InvalidTransition, InvalidChange) — баг интеграции,
//!   core возвращает Err и состояние НЕ меняется
//! - soft ошибки (NavigationError) — логируются, тик прерывается, машина живёт дальше

use crate::health::PlayerCondition;
use crate::interaction::InteractableState;
use crate::inventory::ItemId;

/// Нарушение контракта interactable объекта
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InteractionError {
    #[error("{object}: invalid interaction in state {state:?}")]
    InvalidTransition {
        object: &'static str,
        state: InteractableState,
    },

    #[error("{object}: hold interaction requires a hold-capable object")]
    HoldNotSupported { object: &'static str },
}

/// Нелегальная смена PlayerCondition
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionError {
    #[error("invalid condition change: {from:?} -> {to:?}")]
    InvalidChange {
        from: PlayerCondition,
        to: PlayerCondition,
    },
}

/// Mover не удалось поставить на navigable terrain
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum NavigationError {
    #[error("no navigable point within {radius} units of ({x:.2}, {y:.2}, {z:.2})")]
    Unavailable { x: f32, y: f32, z: f32, radius: f32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemDatabaseError {
    #[error("item {0:?} is already registered in the database")]
    Duplicate(ItemId),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("requested {requested} sub-computers but only {available} sites exist")]
    NotEnoughSites { requested: usize, available: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Items(#[from] ItemDatabaseError),

    #[error(transparent)]
    Stage(#[from] StageError),
}
