//! Interaction scan — фокус актора, judgement и dispatch нажатий
//!
//! Сам поиск объекта перед камерой (sphere cast) делает host: он шлёт
//! `FocusChanged` только когда цель сменилась. Дальше всё здесь:
//!
//! - `InteractPressed` → dispatch по состоянию объекта
//!   (ItemSuppliable → interact + pick up, Accessible → interact + use item,
//!   HoldRequiring → interact = ещё один holder)
//! - `InteractReleased` / смена фокуса → stop_interact, если актор держал кнопку
//! - зарядка завершилась сама → флаг holding актора снимается
//! - каждый тик: `can_interact` + подсказка UI (`InteractPromptChanged` при изменении)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::{InteractCtx, Interactable, InteractableObject, InteractableState, InteractionEffect};
use crate::error::InteractionError;
use crate::health::{ConditionChangeRequested, HealthCondition, PlayerCondition};
use crate::inventory::{apply_inventory_effects, Inventory, ItemDropped, ItemId, ItemPickedUp};
use crate::presentation::{AudioCue, AudioEvents, SceneTransitionRequested};
use crate::scope::CancelScopes;

// ============================================================================
// Components / Events
// ============================================================================

/// Подсказка UI для объекта в фокусе
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractPrompt {
    #[default]
    Hidden,
    /// Объект есть, но взаимодействие запрещено (красная иконка)
    Banned { text: &'static str },
    /// "Press E"
    Press { text: &'static str },
    /// "Hold E" + шкала прогресса
    Hold {
        text: &'static str,
        progress: f32,
        required: f32,
    },
}

/// Component: на что смотрит актор и можно ли с этим взаимодействовать
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct InteractionFocus {
    target: Option<Entity>,
    can_interact: bool,
    /// Актор сейчас один из holders объекта в фокусе
    holding: bool,
    prompt: InteractPrompt,
}

impl InteractionFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn can_interact(&self) -> bool {
        self.can_interact
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn prompt(&self) -> &InteractPrompt {
        &self.prompt
    }
}

/// Host: объект перед камерой актора сменился
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChanged {
    pub actor: Entity,
    pub target: Option<Entity>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractPressed {
    pub actor: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractReleased {
    pub actor: Entity,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct InteractPromptChanged {
    pub actor: Entity,
    pub prompt: InteractPrompt,
}

/// Станция пройдена (читает quest система — единственный writer QuestProgress)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationCleared {
    pub station: Entity,
    pub actor: Entity,
}

// ============================================================================
// Judgement
// ============================================================================

/// Может ли актор с `condition` и `held` взаимодействовать с объектом
///
/// Unavailable / Cleared / ReAccessible — никогда. Иначе condition должен
/// попадать в маску объекта, а в Accessible с required item — предмет в руках
/// должен совпадать.
pub fn judge_interaction(object: &dyn Interactable, condition: PlayerCondition, held: Option<&ItemId>) -> bool {
    let state = object.state();
    if matches!(
        state,
        InteractableState::Unavailable | InteractableState::Cleared | InteractableState::ReAccessible
    ) {
        return false;
    }

    let condition_allowed = object.allowed_conditions().matches(condition);
    let item_required = state == InteractableState::Accessible && object.required_item().is_some();
    let item_valid = object.required_item() == held;

    condition_allowed && (!item_required || item_valid)
}

/// Подсказка для объекта в фокусе
pub fn build_prompt(object: &dyn Interactable, can_interact: bool) -> InteractPrompt {
    let state = object.state();
    let text = object.display_text(state);

    if state == InteractableState::Cleared {
        return InteractPrompt::Hidden;
    }
    if !can_interact {
        return InteractPrompt::Banned { text };
    }

    match (state, object.as_hold()) {
        (InteractableState::HoldRequiring, Some(hold)) => InteractPrompt::Hold {
            text,
            progress: hold.hold_progress(),
            required: hold.required_hold_time(),
        },
        _ => InteractPrompt::Press { text },
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Writers для side effects взаимодействия
#[derive(SystemParam)]
pub struct InteractionOutbox<'w> {
    pub audio: EventWriter<'w, AudioCue>,
    pub picked_up: EventWriter<'w, ItemPickedUp>,
    pub dropped: EventWriter<'w, ItemDropped>,
    pub conditions: EventWriter<'w, ConditionChangeRequested>,
    pub cleared: EventWriter<'w, StationCleared>,
    pub scenes: EventWriter<'w, SceneTransitionRequested>,
}

impl InteractionOutbox<'_> {
    fn publish(&mut self, actor: Entity, source: Entity, effects: Vec<InteractionEffect>) {
        for effect in effects {
            match effect {
                InteractionEffect::RequestCondition(to) => {
                    self.conditions.write(ConditionChangeRequested { actor, to });
                }
                InteractionEffect::QuestClear => {
                    self.cleared.write(StationCleared { station: source, actor });
                }
                InteractionEffect::Scene(target) => {
                    self.scenes.write(SceneTransitionRequested { target });
                }
            }
        }
    }

    /// interact + публикация effects
    fn interact(
        &mut self,
        object: &mut InteractableObject,
        actor: Entity,
        source: Entity,
        scopes: &mut CancelScopes,
    ) -> Result<(), InteractionError> {
        let mut audio = AudioEvents {
            source,
            writer: &mut self.audio,
        };
        let mut ctx = InteractCtx::new(actor, scopes, &mut audio);
        let result = object.as_interactable_mut().interact(&mut ctx);
        let effects = ctx.into_effects();

        self.publish(actor, source, effects);
        result
    }
}

fn release_hold(
    object: &mut InteractableObject,
    actor: Entity,
    source: Entity,
    scopes: &mut CancelScopes,
    cues: &mut EventWriter<AudioCue>,
) -> Result<(), InteractionError> {
    let mut audio = AudioEvents { source, writer: cues };
    let mut ctx = InteractCtx::new(actor, scopes, &mut audio);
    object.stop_hold(&mut ctx)
}

/// System: смена фокуса отпускает удержание на старой цели
pub fn handle_focus_changes(
    mut changes: EventReader<FocusChanged>,
    mut actors: Query<&mut InteractionFocus>,
    mut objects: Query<&mut InteractableObject>,
    mut scopes: ResMut<CancelScopes>,
    mut cues: EventWriter<AudioCue>,
) {
    for change in changes.read() {
        let Ok(mut focus) = actors.get_mut(change.actor) else {
            continue;
        };
        if focus.target == change.target {
            continue;
        }

        if let Some(previous) = focus.target {
            if focus.holding {
                if let Ok(mut object) = objects.get_mut(previous) {
                    if let Err(error) = release_hold(&mut object, change.actor, previous, &mut scopes, &mut cues) {
                        crate::logger::log_error(&format!("Interaction: {}", error));
                    }
                }
            }
        }

        focus.target = change.target;
        focus.holding = false;
        focus.can_interact = false;
    }
}

/// System: нажатие кнопки взаимодействия
pub fn handle_interact_presses(
    mut commands: Commands,
    mut presses: EventReader<InteractPressed>,
    mut actors: Query<(&mut InteractionFocus, &mut Inventory, &HealthCondition, &Transform)>,
    mut objects: Query<&mut InteractableObject>,
    mut scopes: ResMut<CancelScopes>,
    mut outbox: InteractionOutbox,
) {
    // Pickups, уничтоженные в этом тике (commands ещё не применены)
    let mut consumed: Vec<Entity> = Vec::new();

    for press in presses.read() {
        let actor = press.actor;
        let Ok((mut focus, mut inventory, health, transform)) = actors.get_mut(actor) else {
            continue;
        };
        // Повторное нажатие без release — тот же holder
        if focus.holding {
            continue;
        }
        let Some(target) = focus.target else {
            continue;
        };
        if consumed.contains(&target) {
            continue;
        }
        let Ok(mut object) = objects.get_mut(target) else {
            crate::logger::log_warning(&format!("Interaction: focused {:?} is not interactable", target));
            continue;
        };

        if !judge_interaction(object.as_interactable(), health.condition(), inventory.held()) {
            continue;
        }

        let state = object.state();
        let interactable = object.as_interactable();
        let name = interactable.name();
        let required = interactable.required_item().cloned();
        let supply = interactable.supply_item().cloned();
        let destroyable = interactable.is_destroyable();

        if let Err(error) = outbox.interact(&mut object, actor, target, &mut scopes) {
            crate::logger::log_error(&format!("Interaction: {}", error));
            continue;
        }

        match state {
            InteractableState::ItemSuppliable => {
                let effects = inventory.pick_up(supply);
                apply_inventory_effects(
                    &mut commands,
                    actor,
                    transform.translation,
                    effects,
                    &mut outbox.picked_up,
                    &mut outbox.dropped,
                    &mut outbox.audio,
                );
                if destroyable {
                    commands.entity(target).despawn();
                    consumed.push(target);
                }
            }
            InteractableState::Accessible => {
                if let Some(required) = required {
                    inventory.use_item(Some(&required));
                }
            }
            _ => {}
        }

        focus.holding = object.state() == InteractableState::HoldRequiring && object.as_interactable().as_hold().is_some();
        crate::logger::log(&format!(
            "Interaction: {:?} → {} ({:?} → {:?})",
            actor,
            name,
            state,
            object.state()
        ));
    }
}

/// System: кнопку отпустили
pub fn handle_interact_releases(
    mut releases: EventReader<InteractReleased>,
    mut actors: Query<&mut InteractionFocus>,
    mut objects: Query<&mut InteractableObject>,
    mut scopes: ResMut<CancelScopes>,
    mut cues: EventWriter<AudioCue>,
) {
    for release in releases.read() {
        let Ok(mut focus) = actors.get_mut(release.actor) else {
            continue;
        };
        if !focus.holding {
            continue;
        }
        focus.holding = false;

        let Some(target) = focus.target else {
            continue;
        };
        let Ok(mut object) = objects.get_mut(target) else {
            continue;
        };
        if let Err(error) = release_hold(&mut object, release.actor, target, &mut scopes, &mut cues) {
            crate::logger::log_error(&format!("Interaction: {}", error));
        }
    }
}

/// System: объект сам вышел из HoldRequiring (зарядка завершена) → актор больше не holder
pub fn clear_finished_holds(mut actors: Query<&mut InteractionFocus>, objects: Query<&InteractableObject>) {
    for mut focus in actors.iter_mut() {
        if !focus.holding {
            continue;
        }
        let still_holding = focus
            .target
            .and_then(|target| objects.get(target).ok())
            .is_some_and(|object| object.state() == InteractableState::HoldRequiring);
        if !still_holding {
            focus.holding = false;
        }
    }
}

/// System: пересчёт can_interact и подсказки UI
pub fn refresh_interaction_judgement(
    mut actors: Query<(Entity, &mut InteractionFocus, &Inventory, &HealthCondition)>,
    objects: Query<&InteractableObject>,
    mut prompts: EventWriter<InteractPromptChanged>,
) {
    for (actor, mut focus, inventory, health) in actors.iter_mut() {
        let object = focus.target.and_then(|target| objects.get(target).ok());

        let (can_interact, prompt) = match object {
            Some(object) => {
                let interactable = object.as_interactable();
                let can_interact = judge_interaction(interactable, health.condition(), inventory.held());
                (can_interact, build_prompt(interactable, can_interact))
            }
            None => {
                // Цель уничтожена (подобрали предмет) → фокус пуст
                if focus.target.is_some() {
                    focus.target = None;
                    focus.holding = false;
                }
                (false, InteractPrompt::Hidden)
            }
        };

        if focus.can_interact != can_interact {
            focus.can_interact = can_interact;
        }
        if focus.prompt != prompt {
            focus.prompt = prompt.clone();
            prompts.write(InteractPromptChanged { actor, prompt });
        }
    }
}
