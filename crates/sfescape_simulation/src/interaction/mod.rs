//! Interaction module — объекты, с которыми взаимодействует игрок
//!
//! # Архитектура
//!
//! **Interactable** — общий контракт (state, interact, required/supply item,
//! condition mask, display text). Каждый вариант задаёт свой легальный
//! поднабор переходов `InteractableState`; всё остальное → `InteractionError`.
//!
//! **HoldInteractable** — long-press объекты (hold progress, stop_interact).
//!
//! **InteractableObject** — component-обёртка над вариантами (enum dispatch).
//!
//! Side effects на других entities (condition актора, quest clear, смена сцены)
//! объекты не применяют сами: они складываются в `InteractCtx` и публикуются
//! системой как события.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::InteractionError;
use crate::health::{ConditionMask, PlayerCondition};
use crate::inventory::ItemId;
use crate::presentation::{AudioSink, SceneTarget};
use crate::scope::CancelScopes;

pub mod objects;
pub mod scan;

pub use objects::{
    ChargeDisplay, ChargeStation, ChargeStationConfig, ItemPickup, MedicalStation, Portal,
    SubComputer,
};
pub use scan::{
    judge_interaction, FocusChanged, InteractPressed, InteractPrompt, InteractPromptChanged,
    InteractReleased, InteractionFocus, StationCleared,
};

/// Состояние interactable объекта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum InteractableState {
    /// Взаимодействие недоступно
    Unavailable,
    /// Ждёт взаимодействия
    Accessible,
    /// Ждёт повторного взаимодействия
    ReAccessible,
    /// Пройден
    Cleared,
    /// Ждёт удержания кнопки
    HoldRequiring,
    /// Можно забрать предмет
    ItemSuppliable,
}

/// Side effect взаимодействия (применяется системой после `interact`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEffect {
    /// Сменить condition актора
    RequestCondition(PlayerCondition),
    /// Станция пройдена (quest counter +1)
    QuestClear,
    /// Запрос смены сцены
    Scene(SceneTarget),
}

/// Контекст одного вызова interact / stop_interact
pub struct InteractCtx<'a> {
    pub actor: Entity,
    pub scopes: &'a mut CancelScopes,
    /// Звук объекта (source = сам объект)
    pub audio: &'a mut dyn AudioSink,
    effects: Vec<InteractionEffect>,
}

impl<'a> InteractCtx<'a> {
    pub fn new(actor: Entity, scopes: &'a mut CancelScopes, audio: &'a mut dyn AudioSink) -> Self {
        Self {
            actor,
            scopes,
            audio,
            effects: Vec::new(),
        }
    }

    pub fn emit(&mut self, effect: InteractionEffect) {
        self.effects.push(effect);
    }

    pub fn effects(&self) -> &[InteractionEffect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<InteractionEffect> {
        self.effects
    }
}

/// Контракт interactable объекта
pub trait Interactable: Send + Sync {
    /// Имя для логов и ошибок
    fn name(&self) -> &'static str;

    fn state(&self) -> InteractableState;

    fn interact(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError>;

    /// Предмет, который нужен в Accessible (None = не нужен)
    fn required_item(&self) -> Option<&ItemId> {
        None
    }

    /// Предмет, который объект отдаёт в ItemSuppliable
    fn supply_item(&self) -> Option<&ItemId> {
        None
    }

    /// Conditions актора, при которых взаимодействие разрешено
    fn allowed_conditions(&self) -> ConditionMask {
        ConditionMask::UPRIGHT
    }

    /// Уничтожается ли объект, когда предмет забрали
    fn is_destroyable(&self) -> bool {
        false
    }

    /// Текст подсказки для состояния ("" = без текста)
    fn display_text(&self, state: InteractableState) -> &'static str;

    fn as_hold(&self) -> Option<&dyn HoldInteractable> {
        None
    }

    fn as_hold_mut(&mut self) -> Option<&mut dyn HoldInteractable> {
        None
    }
}

/// Объект, требующий удержания кнопки
pub trait HoldInteractable: Interactable {
    fn hold_progress(&self) -> f32;

    fn required_hold_time(&self) -> f32;

    /// Один holder отпустил кнопку
    fn stop_interact(&mut self, ctx: &mut InteractCtx);
}

pub(crate) fn invalid_transition(object: &'static str, state: InteractableState) -> InteractionError {
    InteractionError::InvalidTransition { object, state }
}

/// Component: interactable объект в мире
#[derive(Component, Debug)]
pub enum InteractableObject {
    Pickup(ItemPickup),
    SubComputer(SubComputer),
    Medical(MedicalStation),
    Portal(Portal),
    ChargeStation(ChargeStation),
}

impl InteractableObject {
    pub fn as_interactable(&self) -> &dyn Interactable {
        match self {
            Self::Pickup(object) => object,
            Self::SubComputer(object) => object,
            Self::Medical(object) => object,
            Self::Portal(object) => object,
            Self::ChargeStation(object) => object,
        }
    }

    pub fn as_interactable_mut(&mut self) -> &mut dyn Interactable {
        match self {
            Self::Pickup(object) => object,
            Self::SubComputer(object) => object,
            Self::Medical(object) => object,
            Self::Portal(object) => object,
            Self::ChargeStation(object) => object,
        }
    }

    pub fn state(&self) -> InteractableState {
        self.as_interactable().state()
    }

    /// Отпустить удержание, если объект сейчас в HoldRequiring
    pub fn stop_hold(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        if self.state() != InteractableState::HoldRequiring {
            return Ok(());
        }

        let object = self.as_interactable_mut();
        let name = object.name();
        match object.as_hold_mut() {
            Some(hold) => {
                hold.stop_interact(ctx);
                Ok(())
            }
            None => Err(InteractionError::HoldNotSupported { object: name }),
        }
    }
}

/// Spawn предмета в мире (drop, стартовые предметы стадии)
pub fn spawn_item_pickup(commands: &mut Commands, item: ItemId, position: Vec3) -> Entity {
    commands
        .spawn((
            InteractableObject::Pickup(ItemPickup::new(item)),
            Transform::from_translation(position),
        ))
        .id()
}

/// Interaction Plugin
///
/// Порядок (SimulationSet::Interaction):
/// 1. handle_focus_changes — смена фокуса отпускает удержание
/// 2. handle_interact_presses — dispatch по состоянию объекта
/// 3. handle_interact_releases — stop_interact
/// 4. handle_drop_requests — выброс предмета
/// 5. tick_charge_stations — накопление hold progress
/// 6. quest систем (clear → portal unlock) — см. `QuestPlugin`
/// 7. refresh_interaction_judgement — can_interact + подсказка UI
pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<FocusChanged>()
            .add_event::<InteractPressed>()
            .add_event::<InteractReleased>()
            .add_event::<InteractPromptChanged>()
            .add_event::<StationCleared>()
            .add_event::<crate::inventory::ItemPickedUp>()
            .add_event::<crate::inventory::ItemDropped>()
            .add_event::<crate::inventory::DropRequested>();

        app.add_systems(
            FixedUpdate,
            (
                scan::handle_focus_changes,
                scan::handle_interact_presses,
                scan::handle_interact_releases,
                crate::inventory::handle_drop_requests,
                objects::tick_charge_stations,
                scan::clear_finished_holds,
            )
                .chain()
                .in_set(crate::SimulationSet::Interaction),
        );

        app.add_systems(
            FixedUpdate,
            scan::refresh_interaction_judgement.in_set(crate::SimulationSet::Judgement),
        );
    }
}
