use crate::error::InteractionError;
use crate::interaction::{invalid_transition, InteractCtx, Interactable, InteractableState, InteractionEffect};
use crate::presentation::{AudioSink, SceneTarget, SoundClip};

/// Портал выхода
///
/// Unavailable → Accessible, когда quest counter дошёл до max (не откатывается).
/// Interact в Accessible завершает сессию (GameClear).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portal {
    state: InteractableState,
}

impl Portal {
    pub fn new() -> Self {
        Self {
            state: InteractableState::Unavailable,
        }
    }

    /// Открыть портал. false если уже открыт
    pub fn unlock(&mut self, audio: &mut dyn AudioSink) -> bool {
        if self.state != InteractableState::Unavailable {
            return false;
        }
        self.state = InteractableState::Accessible;
        audio.start_loop(SoundClip::PortalHum);
        true
    }
}

impl Default for Portal {
    fn default() -> Self {
        Self::new()
    }
}

impl Interactable for Portal {
    fn name(&self) -> &'static str {
        "Portal"
    }

    fn state(&self) -> InteractableState {
        self.state
    }

    fn interact(&mut self, ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        match self.state {
            InteractableState::Unavailable => Ok(()),
            InteractableState::Accessible => {
                ctx.emit(InteractionEffect::Scene(SceneTarget::GameClear));
                Ok(())
            }
            state => Err(invalid_transition(self.name(), state)),
        }
    }

    fn display_text(&self, state: InteractableState) -> &'static str {
        match state {
            InteractableState::Unavailable | InteractableState::Accessible => "Escape",
            _ => "",
        }
    }
}
