use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::clock::Clock;

use super::{find_mut, next_id, remove_by_id, required, TrackerError, TrackerKind, TrackerRecord};

pub const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: u64,
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_owned()
}

impl TrackerRecord for WishlistItem {
    const KIND: TrackerKind = TrackerKind::Wishlist;

    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct WishDraft {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum WishSort {
    #[default]
    Name,
    /// Cheapest first
    Price,
    Category,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistTotals {
    /// Sum of prices of items not yet purchased.
    pub remaining: Decimal,
    pub purchased: Decimal,
    /// Remaining sum per category.
    pub by_category: BTreeMap<String, Decimal>,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn add_item(
    items: &mut Vec<WishlistItem>,
    draft: WishDraft,
    clock: &dyn Clock,
) -> Result<u64, TrackerError> {
    let name = required("name", &draft.name)?;
    if draft.price.is_sign_negative() {
        return Err(TrackerError::OutOfRange {
            field: "price",
            requirement: "zero or more",
            value: draft.price.to_string(),
        });
    }
    let category = match draft.category.trim() {
        "" => default_category(),
        v => v.to_owned(),
    };
    let id = next_id(items.iter().map(|v| v.id), clock);
    items.push(WishlistItem {
        id,
        name,
        price: draft.price,
        category,
        image_url: optional(draft.image_url),
        link: optional(draft.link),
        purchased: false,
        created_at: clock.time(),
    });
    Ok(id)
}

pub fn remove_item(items: &mut Vec<WishlistItem>, id: u64) -> Result<WishlistItem, TrackerError> {
    remove_by_id(items, "wishlist item", id)
}

/// Returns whether the item is purchased after toggling.
pub fn toggle_purchased(items: &mut [WishlistItem], id: u64) -> Result<bool, TrackerError> {
    let item = find_mut(items, "wishlist item", id)?;
    item.purchased = !item.purchased;
    Ok(item.purchased)
}

pub fn sort_items(items: &mut [WishlistItem], by: WishSort) {
    match by {
        WishSort::Name => items.sort_by_key(|v| v.name.to_lowercase()),
        WishSort::Price => items.sort_by_key(|v| (v.price, v.name.to_lowercase())),
        WishSort::Category => {
            items.sort_by_key(|v| (v.category.to_lowercase(), v.name.to_lowercase()))
        }
    }
}

pub fn totals(items: &[WishlistItem]) -> WishlistTotals {
    let mut totals = WishlistTotals::default();
    for item in items {
        if item.purchased {
            totals.purchased += item.price;
        } else {
            totals.remaining += item.price;
            *totals.by_category.entry(item.category.clone()).or_default() += item.price;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::trackers::{test_support::ticking_clock, TrackerError};

    use super::{
        add_item, remove_item, sort_items, toggle_purchased, totals, WishDraft, WishSort,
        WishlistItem, DEFAULT_CATEGORY,
    };

    fn draft(name: &str, price: &str, category: &str) -> WishDraft {
        WishDraft {
            name: name.into(),
            price: price.parse().unwrap(),
            category: category.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_totals_by_category() {
        let clock = ticking_clock();
        let mut items = vec![];
        let lamp = add_item(&mut items, draft("Lamp", "45.50", "Home"), &clock).unwrap();
        add_item(&mut items, draft("Rug", "120", "Home"), &clock).unwrap();
        add_item(&mut items, draft("Novel", "12.99", ""), &clock).unwrap();
        assert_eq!(items[2].category, DEFAULT_CATEGORY);

        assert!(toggle_purchased(&mut items, lamp).unwrap());

        let totals = totals(&items);
        assert_eq!(totals.purchased, "45.50".parse::<Decimal>().unwrap());
        assert_eq!(totals.remaining, "132.99".parse::<Decimal>().unwrap());
        assert_eq!(
            totals.by_category.get("Home"),
            Some(&"120".parse::<Decimal>().unwrap())
        );
        assert_eq!(totals.by_category.len(), 2);
    }

    #[test]
    fn test_validation_and_cleanup() {
        let clock = ticking_clock();
        let mut items = vec![];
        assert!(matches!(
            add_item(&mut items, draft("Boat", "-1", ""), &clock),
            Err(TrackerError::OutOfRange { field: "price", .. })
        ));

        let id = add_item(
            &mut items,
            WishDraft {
                image_url: Some("  ".into()),
                link: Some(" https://example.com/bike ".into()),
                ..draft("Bike", "300", "Sport")
            },
            &clock,
        )
        .unwrap();
        assert_eq!(items[0].image_url, None);
        assert_eq!(items[0].link.as_deref(), Some("https://example.com/bike"));

        remove_item(&mut items, id).unwrap();
        assert!(remove_item(&mut items, id).is_err());
    }

    #[test]
    fn test_sort_by_price() {
        let clock = ticking_clock();
        let mut items = vec![];
        add_item(&mut items, draft("b", "10", "x"), &clock).unwrap();
        add_item(&mut items, draft("a", "2.5", "y"), &clock).unwrap();
        add_item(&mut items, draft("c", "10", "a"), &clock).unwrap();

        sort_items(&mut items, WishSort::Price);
        let names = items.iter().map(|v| v.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);

        sort_items(&mut items, WishSort::Category);
        assert_eq!(items[0].name, "c");
    }

    #[test]
    fn test_legacy_numbers_deserialize() {
        let item: WishlistItem = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Headphones",
            "price": 99.9
        }))
        .unwrap();
        assert_eq!(item.price, "99.9".parse::<Decimal>().unwrap());
        assert_eq!(item.category, DEFAULT_CATEGORY);
    }
}
