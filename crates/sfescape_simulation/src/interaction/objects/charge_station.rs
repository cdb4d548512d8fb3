//! Charge station — зарядка батареи удержанием кнопки
//!
//! ```text
//! Accessible ──interact──▶ HoldRequiring ──progress >= required──▶ ItemSuppliable
//!     ▲                     (holders × base_rate)                        │
//!     └──────────────────────────── interact (батарею забрали) ──────────┘
//! ```
//!
//! Накопление идёт в child scope от root scope станции (accumulation handle).
//! Последний holder отпустил кнопку → handle отменён, progress сохраняется.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::InteractionError;
use crate::interaction::{
    invalid_transition, HoldInteractable, InteractCtx, Interactable, InteractableObject, InteractableState,
};
use crate::inventory::ItemId;
use crate::presentation::{AudioCue, AudioEvents, AudioSink, SoundClip};
use crate::scope::{CancelScopes, ScopeId};

/// Параметры станции
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeStationConfig {
    /// Сколько секунд держать одному holder'у
    pub required_hold_time: f32,
    /// Прирост progress в секунду на одного holder'а
    pub base_rate: f32,
}

impl Default for ChargeStationConfig {
    fn default() -> Self {
        Self {
            required_hold_time: 3.0,
            base_rate: 1.0,
        }
    }
}

/// Что показывает станция (батарея / эффекты зарядки)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ChargeDisplay {
    #[default]
    Empty,
    InjectedBattery,
    Charging,
    ChargeCompleted,
}

#[derive(Debug)]
pub struct ChargeStation {
    state: InteractableState,
    display: ChargeDisplay,
    hold_progress: f32,
    config: ChargeStationConfig,
    holders: u32,
    root_scope: ScopeId,
    accumulation: Option<ScopeId>,
    required: ItemId,
    supply: ItemId,
}

impl ChargeStation {
    /// `root_scope` — scope, принадлежащий entity станции
    pub fn new(config: ChargeStationConfig, root_scope: ScopeId) -> Self {
        Self {
            state: InteractableState::Accessible,
            display: ChargeDisplay::Empty,
            hold_progress: 0.0,
            config,
            holders: 0,
            root_scope,
            accumulation: None,
            required: ItemId::empty_battery(),
            supply: ItemId::charged_battery(),
        }
    }

    pub fn display(&self) -> ChargeDisplay {
        self.display
    }

    pub fn holders(&self) -> u32 {
        self.holders
    }

    pub fn accumulation_scope(&self) -> Option<ScopeId> {
        self.accumulation
    }

    pub fn is_accumulating(&self, scopes: &CancelScopes) -> bool {
        self.accumulation.is_some_and(|handle| scopes.is_live(handle))
    }

    /// Тик накопления. true — зарядка завершилась на этом тике
    pub fn tick(&mut self, scopes: &mut CancelScopes, audio: &mut dyn AudioSink, dt: f32) -> bool {
        let Some(handle) = self.accumulation else {
            return false;
        };
        if !scopes.is_live(handle) {
            self.accumulation = None;
            return false;
        }

        let rate = self.config.base_rate * self.holders as f32;
        self.hold_progress = (self.hold_progress + dt * rate).min(self.config.required_hold_time);

        if self.hold_progress >= self.config.required_hold_time {
            self.complete(scopes, audio);
            return true;
        }
        false
    }

    fn start_charge(&mut self, scopes: &mut CancelScopes) {
        // Живой handle от прошлого старта → отменяем, иначе два потока progress
        self.cancel_accumulation(scopes);
        self.accumulation = Some(scopes.open_child(self.root_scope));
    }

    fn cancel_accumulation(&mut self, scopes: &mut CancelScopes) {
        if let Some(handle) = self.accumulation.take() {
            scopes.cancel(handle);
        }
    }

    fn complete(&mut self, scopes: &mut CancelScopes, audio: &mut dyn AudioSink) {
        self.state = InteractableState::ItemSuppliable;
        self.holders = 0;
        self.cancel_accumulation(scopes);
        self.display = ChargeDisplay::ChargeCompleted;
        audio.stop_loop();
        audio.play_one_shot(SoundClip::ChargeComplete, 1.0);
        crate::logger::log("🔋 Charge station: battery charged");
    }
}

impl Interactable for ChargeStation {
    fn name(&self) -> &'static str {
        "ChargeStation"
    }

    fn state(&self) -> InteractableState {
        self.state
    }

    fn interact(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        match self.state {
            InteractableState::Accessible => {
                self.hold_progress = 0.0;
                self.state = InteractableState::HoldRequiring;
                self.display = ChargeDisplay::InjectedBattery;
                ctx.audio.play_one_shot(SoundClip::BatterySet, 1.0);
                // Вставка батареи сразу считается первым удержанием
                self.interact(ctx)
            }
            InteractableState::HoldRequiring => {
                if self.holders == 0 {
                    self.start_charge(ctx.scopes);
                    self.display = ChargeDisplay::Charging;
                    ctx.audio.start_loop(SoundClip::Charging);
                }
                self.holders += 1;
                Ok(())
            }
            InteractableState::ItemSuppliable => {
                self.state = InteractableState::Accessible;
                self.display = ChargeDisplay::Empty;
                Ok(())
            }
            state => Err(invalid_transition(self.name(), state)),
        }
    }

    fn required_item(&self) -> Option<&ItemId> {
        Some(&self.required)
    }

    fn supply_item(&self) -> Option<&ItemId> {
        Some(&self.supply)
    }

    fn display_text(&self, state: InteractableState) -> &'static str {
        match state {
            InteractableState::Accessible => "Insert battery",
            InteractableState::HoldRequiring => "Charge",
            InteractableState::ItemSuppliable => "Take out battery",
            _ => "",
        }
    }

    fn as_hold(&self) -> Option<&dyn HoldInteractable> {
        Some(self)
    }

    fn as_hold_mut(&mut self) -> Option<&mut dyn HoldInteractable> {
        Some(self)
    }
}

impl HoldInteractable for ChargeStation {
    fn hold_progress(&self) -> f32 {
        self.hold_progress
    }

    fn required_hold_time(&self) -> f32 {
        self.config.required_hold_time
    }

    fn stop_interact(&mut self, ctx: &mut InteractCtx) {
        if self.holders == 0 || self.state != InteractableState::HoldRequiring {
            return;
        }

        self.holders -= 1;
        if self.holders == 0 {
            self.cancel_accumulation(ctx.scopes);
            self.display = ChargeDisplay::InjectedBattery;
            ctx.audio.stop_loop();
        }
    }
}

/// System: накопление hold progress всех станций
pub fn tick_charge_stations(
    time: Res<Time<Fixed>>,
    mut stations: Query<(Entity, &mut InteractableObject)>,
    mut scopes: ResMut<CancelScopes>,
    mut cues: EventWriter<AudioCue>,
) {
    let dt = time.delta_secs();

    for (entity, mut object) in stations.iter_mut() {
        let InteractableObject::ChargeStation(station) = &mut *object else {
            continue;
        };

        let mut audio = AudioEvents {
            source: entity,
            writer: &mut cues,
        };
        station.tick(&mut scopes, &mut audio, dt);
    }
}
