//! Menu

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    ids::TypedId,
    money::{Amount, deserialize_amount},
};

/// Menu item id
pub type MenuItemId = TypedId<MenuItem>;

/// Category id
pub type CategoryId = TypedId<Category>;

/// Optional nutrition facts attached to a menu item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    /// Energy per portion, kcal.
    pub calories: Option<f64>,

    /// Proteins per portion, grams.
    pub proteins: Option<f64>,

    /// Fats per portion, grams.
    pub fats: Option<f64>,

    /// Carbohydrates per portion, grams.
    #[serde(alias = "carbs")]
    pub carbohydrates: Option<f64>,

    /// Portion weight, grams.
    pub weight: Option<f64>,
}

/// A dish or product as published by the menu service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item id
    pub id: MenuItemId,

    /// Display name
    pub name: String,

    /// Unit price in whole currency units
    #[serde(deserialize_with = "deserialize_amount")]
    pub price: Amount,

    /// Photo URL
    #[serde(default)]
    pub photo: Option<String>,

    /// Whether guests can see (and order) the item
    #[serde(default = "visible_by_default")]
    pub view: bool,

    /// Position inside its category
    #[serde(default)]
    pub placenum: i64,

    /// Nutrition facts
    #[serde(flatten)]
    pub nutrition: Nutrition,
}

fn visible_by_default() -> bool {
    true
}

/// A named group of menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Category id
    pub id: CategoryId,

    /// Display name
    pub name: String,

    /// Items, in any order
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A visible menu item together with the category it is listed under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedItem<'a> {
    /// The item
    pub item: &'a MenuItem,

    /// Its category
    pub category: &'a Category,
}

#[derive(Debug, Deserialize)]
struct MenuPayload {
    #[serde(default)]
    categories: Vec<Category>,
}

impl From<MenuPayload> for Menu {
    fn from(payload: MenuPayload) -> Self {
        Menu::new(payload.categories)
    }
}

/// Menu data for one restaurant, indexed by visible item.
///
/// Only items with `view = true` resolve; hidden items behave exactly like deleted ones from
/// the cart's point of view.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "MenuPayload")]
pub struct Menu {
    categories: Vec<Category>,
    index: FxHashMap<MenuItemId, (usize, usize)>,
}

impl Menu {
    /// Build a menu from its categories.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut index = FxHashMap::default();

        for (category_idx, category) in categories.iter().enumerate() {
            for (item_idx, item) in category.items.iter().enumerate() {
                if item.view {
                    index.entry(item.id).or_insert((category_idx, item_idx));
                }
            }
        }

        Self { categories, index }
    }

    /// Resolve a visible item by id.
    pub fn resolve(&self, id: MenuItemId) -> Option<ResolvedItem<'_>> {
        let (category_idx, item_idx) = *self.index.get(&id)?;
        let category = self.categories.get(category_idx)?;
        let item = category.items.get(item_idx)?;

        Some(ResolvedItem { item, category })
    }

    /// All categories, including hidden items.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Visible items, category by category, ordered by their position.
    pub fn visible_items(&self) -> Vec<ResolvedItem<'_>> {
        self.categories
            .iter()
            .flat_map(|category| {
                let mut items: Vec<_> = category
                    .items
                    .iter()
                    .filter(|item| item.view)
                    .map(|item| ResolvedItem { item, category })
                    .collect();

                items.sort_by_key(|resolved| resolved.item.placenum);

                items
            })
            .collect()
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if no item is visible.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
