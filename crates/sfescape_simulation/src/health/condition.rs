//! Player condition — 4 состояния + infection timer
//!
//! Легальные переходы (всё остальное — ConditionError::InvalidChange):
//! - Infected → Normal: лечение, danger cues off, decay таймера
//! - CriticalNormal → Normal: подняться
//! - CriticalInfected → Normal: подняться + decay таймера
//! - Normal → Infected: заражение, danger cues on, рост таймера
//! - Normal → CriticalNormal, Infected → CriticalInfected: game over, incapacitated
//!
//! Рост и decay взаимоисключающие: старт одного отменяет другой.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::BitOr;

use crate::error::ConditionError;

/// Состояние игрока (flag-shaped: битовое сравнение с ConditionMask)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum PlayerCondition {
    #[default]
    Normal = 1 << 0,
    Infected = 1 << 1,
    /// Ранен без заражения (ползком)
    CriticalNormal = 1 << 2,
    /// Ранен заражённым (ползком)
    CriticalInfected = 1 << 3,
}

impl PlayerCondition {
    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn is_critical(self) -> bool {
        matches!(self, PlayerCondition::CriticalNormal | PlayerCondition::CriticalInfected)
    }
}

/// Набор допустимых состояний (для interactable gating)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct ConditionMask(u8);

impl ConditionMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);
    /// Стоит на ногах (Normal | Infected)
    pub const UPRIGHT: Self = Self(PlayerCondition::Normal as u8 | PlayerCondition::Infected as u8);

    pub const fn of(condition: PlayerCondition) -> Self {
        Self(condition as u8)
    }

    pub const fn with(self, condition: PlayerCondition) -> Self {
        Self(self.0 | condition as u8)
    }

    /// Пересечение с текущим состоянием не пусто
    pub fn matches(self, condition: PlayerCondition) -> bool {
        self.0 & condition.bits() != 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl From<PlayerCondition> for ConditionMask {
    fn from(condition: PlayerCondition) -> Self {
        Self::of(condition)
    }
}

impl BitOr for PlayerCondition {
    type Output = ConditionMask;

    fn bitor(self, rhs: Self) -> ConditionMask {
        ConditionMask::of(self).with(rhs)
    }
}

impl BitOr<PlayerCondition> for ConditionMask {
    type Output = ConditionMask;

    fn bitor(self, rhs: PlayerCondition) -> ConditionMask {
        self.with(rhs)
    }
}

/// Параметры infection таймера
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct HealthConfig {
    /// Секунд на полный сброс таймера после лечения
    pub time_until_infection_reset: f32,
    /// Секунд заражения до critical
    pub time_until_critical: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            time_until_infection_reset: 2.0,
            time_until_critical: 10.0,
        }
    }
}

/// Поза игрока
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum Posture {
    Upright,
    /// Ползком (critical)
    Incapacitated,
}

/// Side effects смены состояния (публикуются системой как события)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionEffect {
    /// Виньетка + звук опасности
    DangerCues(bool),
    Posture(Posture),
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Reflect)]
enum InfectionProcess {
    #[default]
    Stopped,
    Growing,
    Decaying,
}

/// Component: состояние здоровья игрока
///
/// Пишет только health система (запросы через ConditionChangeRequested).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct HealthCondition {
    condition: PlayerCondition,
    infection_elapsed: f32,
    process: InfectionProcess,
}

impl HealthCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn condition(&self) -> PlayerCondition {
        self.condition
    }

    pub fn infection_elapsed(&self) -> f32 {
        self.infection_elapsed
    }

    pub fn is_infection_growing(&self) -> bool {
        self.process == InfectionProcess::Growing
    }

    pub fn is_infection_decaying(&self) -> bool {
        self.process == InfectionProcess::Decaying
    }

    /// Прогресс заражения 0..1 (вход для виньетки)
    pub fn infection_rate(&self, config: &HealthConfig) -> f32 {
        if config.time_until_critical <= 0.0 {
            return 0.0;
        }
        (self.infection_elapsed / config.time_until_critical).clamp(0.0, 1.0)
    }

    /// Смена состояния. Err = нелегальный переход, состояние не меняется
    pub fn change_condition(&mut self, to: PlayerCondition) -> Result<Vec<ConditionEffect>, ConditionError> {
        use PlayerCondition::*;

        let from = self.condition;
        if from == to {
            return Ok(Vec::new());
        }

        let effects = match (from, to) {
            (Infected, Normal) => {
                self.process = InfectionProcess::Decaying;
                vec![ConditionEffect::DangerCues(false)]
            }
            (CriticalNormal, Normal) => vec![ConditionEffect::Posture(Posture::Upright)],
            (CriticalInfected, Normal) => {
                self.process = InfectionProcess::Decaying;
                vec![
                    ConditionEffect::Posture(Posture::Upright),
                    ConditionEffect::DangerCues(false),
                ]
            }
            (Normal, Infected) => {
                self.process = InfectionProcess::Growing;
                vec![ConditionEffect::DangerCues(true)]
            }
            (Normal, CriticalNormal) | (Infected, CriticalInfected) => vec![
                ConditionEffect::GameOver,
                ConditionEffect::Posture(Posture::Incapacitated),
            ],
            _ => return Err(ConditionError::InvalidChange { from, to }),
        };

        self.condition = to;
        Ok(effects)
    }

    /// Тик infection процесса. Рост до critical → Infected → CriticalInfected
    pub fn tick(&mut self, config: &HealthConfig, dt: f32) -> Vec<ConditionEffect> {
        match self.process {
            InfectionProcess::Stopped => Vec::new(),

            InfectionProcess::Growing => {
                self.infection_elapsed = (self.infection_elapsed + dt).min(config.time_until_critical);
                if self.infection_elapsed < config.time_until_critical {
                    return Vec::new();
                }

                self.process = InfectionProcess::Stopped;
                match self.change_condition(PlayerCondition::CriticalInfected) {
                    Ok(effects) => effects,
                    Err(err) => {
                        crate::logger::log_error(&format!("Infection timer: {}", err));
                        Vec::new()
                    }
                }
            }

            InfectionProcess::Decaying => {
                let reset = config.time_until_infection_reset.max(f32::EPSILON);
                self.infection_elapsed -= dt * config.time_until_critical / reset;
                if self.infection_elapsed <= 0.0 {
                    self.infection_elapsed = 0.0;
                    self.process = InfectionProcess::Stopped;
                }
                Vec::new()
            }
        }
    }
}
