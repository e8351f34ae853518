//! Outfit composition state.
//!
//! One optional selection per composable category over the cached closet.
//! Selections are indices into each category's newest-first list. A refresh
//! keeps each selection on its item, and clamps the index only when the
//! item is gone.

use crate::api::{ApiError, ValidationError};
use crate::closet::Closet;
use crate::models::{Category, ClothingItem, ItemId, OwnerId, TryOnRequest, TryOnResult};
use crate::session::Session;

/// A composable category. Outerwear is catalog-only and has no slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Top,
    Bottom,
    Shoes,
    Accessory,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Top, Slot::Bottom, Slot::Shoes, Slot::Accessory];

    pub fn category(self) -> Category {
        match self {
            Slot::Top => Category::Top,
            Slot::Bottom => Category::Bottom,
            Slot::Shoes => Category::Shoes,
            Slot::Accessory => Category::Accessory,
        }
    }

    pub fn from_category(category: Category) -> Option<Slot> {
        match category {
            Category::Top => Some(Slot::Top),
            Category::Bottom => Some(Slot::Bottom),
            Category::Shoes => Some(Slot::Shoes),
            Category::Accessory => Some(Slot::Accessory),
            Category::Outerwear => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// A selection that moved to a different item (or to none) on refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub slot: Slot,
    pub previous: Option<ItemId>,
    pub current: Option<ItemId>,
}

#[derive(Debug, Clone, Default)]
struct SlotState {
    items: Vec<ClothingItem>,
    selected: Option<usize>,
}

impl SlotState {
    fn selected_item(&self) -> Option<&ClothingItem> {
        self.selected.and_then(|index| self.items.get(index))
    }
}

/// Per-category selection state for one composition session.
#[derive(Debug, Clone, Default)]
pub struct OutfitComposer {
    slots: [SlotState; 4],
    generation: u64,
}

impl OutfitComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_closet(closet: &Closet) -> Self {
        let mut composer = Self::new();
        composer.refresh(closet);
        composer
    }

    /// Items available in a slot, newest first.
    pub fn items(&self, slot: Slot) -> &[ClothingItem] {
        &self.slots[slot.index()].items
    }

    pub fn selected_index(&self, slot: Slot) -> Option<usize> {
        self.slots[slot.index()].selected
    }

    pub fn selected_item(&self, slot: Slot) -> Option<&ClothingItem> {
        self.slots[slot.index()].selected_item()
    }

    /// Selects the item at `index` in a slot's list.
    pub fn select(&mut self, slot: Slot, index: usize) -> Result<&ClothingItem, ValidationError> {
        let state = &mut self.slots[slot.index()];
        if index >= state.items.len() {
            return Err(ValidationError::IndexOutOfRange {
                category: slot.category(),
                index,
                len: state.items.len(),
            });
        }
        state.selected = Some(index);
        Ok(&state.items[index])
    }

    /// Selects an item by id. The item must be in that slot's list.
    pub fn select_item(&mut self, slot: Slot, item_id: ItemId) -> Result<&ClothingItem, ValidationError> {
        let position = self.slots[slot.index()]
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(ValidationError::ItemNotInCategory {
                item_id,
                category: slot.category(),
            })?;
        self.select(slot, position)
    }

    pub fn clear(&mut self, slot: Slot) {
        self.slots[slot.index()].selected = None;
    }

    /// Re-partitions the closet and keeps every selection on its item.
    ///
    /// A selected item that left its list falls back to the clamped index.
    /// Returns the slots whose selected item changed, so the caller can tell
    /// the user instead of silently switching items.
    pub fn refresh(&mut self, closet: &Closet) -> Vec<SelectionChange> {
        let mut changes = Vec::new();

        for slot in Slot::ALL {
            let state = &mut self.slots[slot.index()];
            let previous = state.selected_item().map(|item| item.id);

            state.items = closet.by_category(slot.category());
            let kept = previous
                .and_then(|id| state.items.iter().position(|item| item.id == id));
            state.selected = match (kept, state.selected) {
                (Some(position), _) => Some(position),
                (None, Some(_)) if state.items.is_empty() => None,
                (None, Some(index)) => Some(index.min(state.items.len() - 1)),
                (None, None) => None,
            };

            let current = state.selected_item().map(|item| item.id);
            if previous != current {
                tracing::debug!(%slot, ?previous, ?current, "Selection moved on refresh");
                changes.push(SelectionChange {
                    slot,
                    previous,
                    current,
                });
            }
        }

        changes
    }

    /// Ends the composition session: clears every selection and bumps the
    /// generation, so results of requests started earlier can be discarded.
    pub fn reset(&mut self) {
        for state in &mut self.slots {
            state.selected = None;
        }
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn has_selection(&self) -> bool {
        Slot::ALL.iter().any(|slot| self.selected_item(*slot).is_some())
    }

    /// Builds a try-on request carrying only the non-empty selections.
    pub fn build_try_on_request(&self, owner_id: OwnerId) -> Result<TryOnRequest, ValidationError> {
        if !self.has_selection() {
            return Err(ValidationError::NoSelection);
        }

        let id = |slot: Slot| self.selected_item(slot).map(|item| item.id);
        Ok(TryOnRequest {
            user_id: owner_id,
            top_id: id(Slot::Top),
            bottom_id: id(Slot::Bottom),
            shoes_id: id(Slot::Shoes),
            accessory_id: id(Slot::Accessory),
        })
    }
}

/// Submits a try-on request. Results are not cached.
pub async fn submit_try_on(session: &Session, request: &TryOnRequest) -> Result<TryOnResult, ApiError> {
    if request.item_ids().is_empty() {
        return Err(ValidationError::NoSelection.into());
    }

    let result = session.api().generate_try_on(request).await?;
    tracing::info!(
        outfit_id = result.outfit_id,
        items = ?request.item_ids(),
        "Try-on generated"
    );
    Ok(result)
}
