//! Enemy FSM components (state enum, config, target binding).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Состояния enemy FSM
///
/// Ровно одно активно. Payload (таймеры, флаги) живёт в `EnemyBrain`,
/// enum — только "где мы сейчас" для событий/UI/звука.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum EnemyState {
    /// Стоит на месте, ждёт idle_dwell секунд
    #[default]
    Idle,
    /// Идёт к текущей patrol точке
    Patrol,
    /// Видит игрока, преследует напрямую
    PlayerChase,
    /// Идёт на источник шума (last known position)
    SoundChase,
    /// Powered режим: идёт на broadcast позицию игрока
    PoweredChase,
    /// Атака (стоит, анимация, attack_duration секунд)
    Attack,
}

impl EnemyState {
    /// Состояния в которых enemy двигается (IsMoving = true)
    pub fn is_moving(&self) -> bool {
        !matches!(self, EnemyState::Idle | EnemyState::Attack)
    }
}

/// Параметры enemy AI
///
/// Дефолты — значения из баланса прототипа (10м detection, 35° FOV, 10с цикл усиления).
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct EnemyConfig {
    /// Максимальная дистанция обнаружения (метры)
    pub detection_range: f32,
    /// Полный угол конуса зрения (градусы)
    pub detection_angle: f32,
    /// Дальше этой дистанции игрок считается потерянным
    pub miss_player_range: f32,
    /// Слои препятствий блокирующие взгляд
    pub obstacle_mask: u32,
    /// Секунд до первого усиления (и пауза между усилениями)
    pub power_up_time: f32,
    /// Длительность усиления (секунды)
    pub power_up_duration: f32,
    /// Период broadcast позиции игрока в powered режиме (секунды)
    pub notification_interval: f32,
    /// Скорость в обычном режиме (m/s)
    pub normal_speed: f32,
    /// Множитель скорости в powered режиме
    pub powered_speed_multiplier: f32,
    /// Ожидание в Idle перед Patrol (секунды)
    pub idle_dwell: f32,
    /// Длительность атаки (секунды)
    pub attack_duration: f32,
    /// Порог "дошли до точки" для remaining distance
    pub arrival_threshold: f32,
    /// Радиус поиска navigable точки при snap
    pub navmesh_snap_radius: f32,
    /// Радиус слышимости шума
    pub hearing_range: f32,
    /// Контакт атаки (дистанция до цели)
    pub attack_range: f32,
    /// Радиус infection aura в powered режиме
    pub aura_radius: f32,
    /// Pitch крика при начале / конце усиления
    pub cry_pitch_power_on: f32,
    pub cry_pitch_power_off: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            detection_range: 10.0,
            detection_angle: 35.0,
            miss_player_range: 10.0,
            obstacle_mask: crate::perception::DEFAULT_SIGHT_MASK,
            power_up_time: 10.0,
            power_up_duration: 10.0,
            notification_interval: 5.0,
            normal_speed: 3.0,
            powered_speed_multiplier: 1.2,
            idle_dwell: 3.0,
            attack_duration: 1.0,
            arrival_threshold: 0.5,
            navmesh_snap_radius: 1.0,
            hearing_range: 15.0,
            attack_range: 1.2,
            aura_radius: 2.5,
            cry_pitch_power_on: 0.8,
            cry_pitch_power_off: 1.2,
        }
    }
}

impl EnemyConfig {
    pub fn half_fov(&self) -> f32 {
        self.detection_angle * 0.5
    }

    pub fn powered_speed(&self) -> f32 {
        self.normal_speed * self.powered_speed_multiplier
    }
}

/// Маркер enemy entity
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Enemy;

/// Кого enemy преследует (tracked target)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct EnemyTarget(pub Entity);

/// Patrol точки (world coordinates, обход по кругу)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub points: Vec<Vec3>,
}

impl PatrolRoute {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }
}

/// Edge-trigger контакты с целью (аура / атака) — как trigger enter в физике
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct HazardContacts {
    pub in_aura: bool,
    pub in_attack_range: bool,
}
