//! Quest module — счётчик пройденных sub-computers и открытие портала
//!
//! `QuestProgress` — injected resource (не глобальный singleton).
//! Единственный writer: `record_station_clears`. Портал только читает.

use bevy::prelude::*;

pub mod stage;

pub use stage::{choose_sites, setup_stage, StageEntities, StageItem, StageLayout};

use crate::interaction::{InteractableObject, StationCleared};
use crate::presentation::{AudioCue, AudioEvents};

/// Resource: прогресс стадии
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct QuestProgress {
    cleared: u32,
    max: u32,
}

impl QuestProgress {
    pub fn new(max: u32) -> Self {
        Self { cleared: 0, max }
    }

    /// Новая стадия: сброс счётчика
    pub fn initialize(&mut self, max: u32) {
        self.cleared = 0;
        self.max = max;
    }

    /// +1 пройденная станция. true — квест выполнен
    pub fn record_clear(&mut self) -> bool {
        self.cleared = self.cleared.saturating_add(1);
        self.is_cleared()
    }

    /// max == 0 — квест не настроен (стадия ещё не собрана)
    pub fn is_cleared(&self) -> bool {
        self.max > 0 && self.cleared >= self.max
    }

    pub fn cleared(&self) -> u32 {
        self.cleared
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Событие для UI (счётчик на HUD)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestProgressChanged {
    pub cleared: u32,
    pub max: u32,
}

/// System: StationCleared → счётчик
pub fn record_station_clears(
    mut clears: EventReader<StationCleared>,
    mut progress: ResMut<QuestProgress>,
    mut changes: EventWriter<QuestProgressChanged>,
) {
    for clear in clears.read() {
        let completed = progress.record_clear();
        crate::logger::log_info(&format!(
            "📋 Quest: {:?} cleared by {:?} ({}/{})",
            clear.station,
            clear.actor,
            progress.cleared(),
            progress.max()
        ));
        changes.write(QuestProgressChanged {
            cleared: progress.cleared(),
            max: progress.max(),
        });
        if completed {
            crate::logger::log_info("📋 Quest: all sub-computers cleared");
        }
    }
}

/// System: квест выполнен → открыть порталы (один раз, без отката)
pub fn unlock_portals(
    progress: Res<QuestProgress>,
    mut objects: Query<(Entity, &mut InteractableObject)>,
    mut cues: EventWriter<AudioCue>,
) {
    if !progress.is_changed() || !progress.is_cleared() {
        return;
    }

    for (entity, mut object) in objects.iter_mut() {
        let InteractableObject::Portal(portal) = &mut *object else {
            continue;
        };
        let mut audio = AudioEvents {
            source: entity,
            writer: &mut cues,
        };
        if portal.unlock(&mut audio) {
            crate::logger::log_info(&format!("🌀 Portal {:?} unlocked", entity));
        }
    }
}

/// Quest Plugin (SimulationSet::Quest)
pub struct QuestPlugin;

impl Plugin for QuestPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<QuestProgress>()
            .add_event::<QuestProgressChanged>();

        app.add_systems(
            FixedUpdate,
            (record_station_clears, unlock_portals)
                .chain()
                .in_set(crate::SimulationSet::Quest),
        );
    }
}
