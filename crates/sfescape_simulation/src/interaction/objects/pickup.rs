use crate::error::InteractionError;
use crate::interaction::{InteractCtx, Interactable, InteractableState};
use crate::inventory::ItemId;

/// Предмет, лежащий в мире. Всегда ItemSuppliable
///
/// Сам `interact` ничего не делает: подбор выполняет inventory (scan система).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPickup {
    item: ItemId,
}

impl ItemPickup {
    pub fn new(item: ItemId) -> Self {
        Self { item }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }
}

impl Interactable for ItemPickup {
    fn name(&self) -> &'static str {
        "ItemPickup"
    }

    fn state(&self) -> InteractableState {
        InteractableState::ItemSuppliable
    }

    fn interact(&mut self, _ctx: &mut InteractCtx) -> Result<(), InteractionError> {
        Ok(())
    }

    fn supply_item(&self) -> Option<&ItemId> {
        Some(&self.item)
    }

    fn is_destroyable(&self) -> bool {
        true
    }

    fn display_text(&self, state: InteractableState) -> &'static str {
        match state {
            InteractableState::ItemSuppliable => "Pick up",
            _ => "",
        }
    }
}
