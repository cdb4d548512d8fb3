use crate::error::InteractionError;
use crate::interaction::{invalid_transition, InteractCtx, Interactable, InteractableState, InteractionEffect};
use crate::inventory::ItemId;
use crate::presentation::SoundClip;

/// Sub-computer: Accessible → Cleared (один раз, необратимо)
///
/// Требует charged battery (проверяет judgement scan). Clear засчитывается
/// в quest counter ровно один раз.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubComputer {
    state: InteractableState,
    required: ItemId,
}

impl SubComputer {
    pub fn new() -> Self {
        Self {
            state: InteractableState::Accessible,
            required: ItemId::charged_battery(),
        }
    }
}

impl Default for SubComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl Interactable for SubComputer {
    fn name(&self) -> &'static str {
        "SubComputer"
    }

    fn state(&self) -> InteractableState {
        self.state
    }

    fn interact(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        if self.state != InteractableState::Accessible {
            return Err(invalid_transition(self.name(), self.state));
        }

        self.state = InteractableState::Cleared;
        ctx.audio.play_one_shot(SoundClip::BatterySet, 1.0);
        ctx.audio.play_one_shot(SoundClip::PcStart, 1.0);
        ctx.emit(InteractionEffect::QuestClear);
        Ok(())
    }

    fn required_item(&self) -> Option<&ItemId> {
        Some(&self.required)
    }

    fn display_text(&self, state: InteractableState) -> &'static str {
        match state {
            InteractableState::Accessible => "Boot up",
            _ => "",
        }
    }
}
