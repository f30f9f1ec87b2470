use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product slot in a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique key within a machine's inventory.
    pub name: String,
    /// Units left. Serialized as `number`.
    #[serde(rename = "number", alias = "count")]
    pub count: u32,
    pub price: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, count: u32, price: u32) -> Self {
        Self {
            name: name.into(),
            count,
            price,
        }
    }
}

/// Product name to item mapping, owned by a single machine.
///
/// There is no public way to borrow an item mutably; callers get copies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<String, Item>,
}

impl Inventory {
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.items.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copies of every item, ordered by name.
    pub fn items(&self) -> Vec<Item> {
        self.items.values().cloned().collect()
    }
}

impl FromIterator<Item> for Inventory {
    /// Later items win when names repeat.
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let items = iter
            .into_iter()
            .map(|item| (item.name.clone(), item))
            .collect();
        Self { items }
    }
}
