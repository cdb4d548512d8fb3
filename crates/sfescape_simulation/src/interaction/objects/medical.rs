use crate::error::InteractionError;
use crate::health::{ConditionMask, PlayerCondition};
use crate::interaction::{invalid_transition, InteractCtx, Interactable, InteractableState, InteractionEffect};
use crate::inventory::ItemId;
use crate::presentation::SoundClip;

/// Медицинская станция: лечит Infected, состояние не меняется
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalStation {
    state: InteractableState,
    required: ItemId,
}

impl MedicalStation {
    pub fn new() -> Self {
        Self {
            state: InteractableState::Accessible,
            required: ItemId::medical_box(),
        }
    }
}

impl Default for MedicalStation {
    fn default() -> Self {
        Self::new()
    }
}

impl Interactable for MedicalStation {
    fn name(&self) -> &'static str {
        "MedicalStation"
    }

    fn state(&self) -> InteractableState {
        self.state
    }

    fn interact(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        if self.state != InteractableState::Accessible {
            return Err(invalid_transition(self.name(), self.state));
        }

        ctx.audio.play_one_shot(SoundClip::MedicalSpray, 1.0);
        ctx.emit(InteractionEffect::RequestCondition(PlayerCondition::Normal));
        Ok(())
    }

    fn required_item(&self) -> Option<&ItemId> {
        Some(&self.required)
    }

    fn allowed_conditions(&self) -> ConditionMask {
        ConditionMask::of(PlayerCondition::Infected)
    }

    fn display_text(&self, state: InteractableState) -> &'static str {
        match state {
            InteractableState::Accessible => "Treat",
            _ => "",
        }
    }
}
