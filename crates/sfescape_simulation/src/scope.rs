//! Cancellation scopes — явная арена структурной отмены
//!
//! Каждая владеющая entity держит root scope (`OwnedScope`).
//! Дочерние процессы (тело state FSM, broadcast позиции, зарядка) открывают
//! child scope. `cancel(parent)` отменяет всё поддерево транзитивно.
//!
//! Отменённые scopes удаляются из арены: `is_live(id) == false` навсегда
//! (id не переиспользуются).

use bevy::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct ScopeId(u64);

#[derive(Debug, Default)]
struct ScopeNode {
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

/// Resource: арена scopes всех entities
#[derive(Resource, Debug, Default)]
pub struct CancelScopes {
    nodes: HashMap<ScopeId, ScopeNode>,
    owners: HashMap<Entity, ScopeId>,
    next_id: u64,
}

impl CancelScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root scope без родителя
    pub fn open_root(&mut self) -> ScopeId {
        let id = self.allocate();
        self.nodes.insert(id, ScopeNode::default());
        id
    }

    /// Root scope, привязанный к entity (отменяется при despawn)
    pub fn open_owned(&mut self, owner: Entity) -> ScopeId {
        let id = self.open_root();
        self.owners.insert(owner, id);
        id
    }

    /// Child scope. Если parent уже отменён — child рождается отменённым
    pub fn open_child(&mut self, parent: ScopeId) -> ScopeId {
        let id = self.allocate();

        let Some(parent_node) = self.nodes.get_mut(&parent) else {
            return id;
        };
        parent_node.children.push(id);

        self.nodes.insert(
            id,
            ScopeNode {
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        id
    }

    pub fn is_live(&self, id: ScopeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Отменить scope и всё поддерево. Возвращает число отменённых scopes
    pub fn cancel(&mut self, id: ScopeId) -> usize {
        let Some(node) = self.nodes.remove(&id) else {
            return 0;
        };

        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }

        let mut cancelled = 1;
        let mut stack = node.children;
        while let Some(child) = stack.pop() {
            if let Some(child_node) = self.nodes.remove(&child) {
                cancelled += 1;
                stack.extend(child_node.children);
            }
        }
        cancelled
    }

    /// Отмена root scope владельца (despawn entity)
    pub fn cancel_owner(&mut self, owner: Entity) -> usize {
        match self.owners.remove(&owner) {
            Some(id) => self.cancel(id),
            None => 0,
        }
    }

    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    fn allocate(&mut self) -> ScopeId {
        let id = ScopeId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Component: root scope entity (все её процессы — потомки)
#[derive(Component, Debug, Clone, Copy)]
pub struct OwnedScope(pub ScopeId);

/// Система: despawn entity → отмена её scope-дерева
///
/// Процессы проверяют `is_live` в начале каждого тика, поэтому отмена
/// прерывает их до следующего side effect.
pub fn cancel_scopes_of_despawned(
    mut removed: RemovedComponents<OwnedScope>,
    mut scopes: ResMut<CancelScopes>,
) {
    for entity in removed.read() {
        let cancelled = scopes.cancel_owner(entity);
        if cancelled > 0 {
            crate::logger::log(&format!(
                "Scopes: {:?} despawned → cancelled {} scope(s)",
                entity, cancelled
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_parent_cancels_children_transitively() {
        let mut scopes = CancelScopes::new();
        let root = scopes.open_root();
        let child = scopes.open_child(root);
        let grandchild = scopes.open_child(child);
        let sibling = scopes.open_child(root);

        assert_eq!(scopes.cancel(root), 4);
        assert!(!scopes.is_live(root));
        assert!(!scopes.is_live(child));
        assert!(!scopes.is_live(grandchild));
        assert!(!scopes.is_live(sibling));
        assert_eq!(scopes.live_count(), 0);
    }

    #[test]
    fn test_cancel_child_keeps_parent() {
        let mut scopes = CancelScopes::new();
        let root = scopes.open_root();
        let first = scopes.open_child(root);
        let second = scopes.open_child(root);

        scopes.cancel(first);

        assert!(scopes.is_live(root));
        assert!(!scopes.is_live(first));
        assert!(scopes.is_live(second));

        // Повторная отмена — no-op
        assert_eq!(scopes.cancel(first), 0);
    }

    #[test]
    fn test_child_of_cancelled_parent_is_born_cancelled() {
        let mut scopes = CancelScopes::new();
        let root = scopes.open_root();
        scopes.cancel(root);

        let orphan = scopes.open_child(root);
        assert!(!scopes.is_live(orphan));
    }

    #[test]
    fn test_cancel_owner() {
        let mut scopes = CancelScopes::new();
        let owner = Entity::from_raw(7);
        let root = scopes.open_owned(owner);
        let body = scopes.open_child(root);

        assert_eq!(scopes.cancel_owner(owner), 2);
        assert!(!scopes.is_live(body));
        assert_eq!(scopes.cancel_owner(owner), 0);
    }
}
