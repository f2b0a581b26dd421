use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    core::record::{HeaderSet, Record},
    error::CoercionError,
    item::mapping::{Fields, FromRecord, ToRecord},
};

use super::next_id;

/// Stock categories. Labels are the values found in CSV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryCategory {
    Meat,
    Vegetables,
    Dairy,
    Spices,
    Beverages,
    Grains,
    Fruits,
    Cleaning,
    Other,
}

impl InventoryCategory {
    pub const ALL: [InventoryCategory; 9] = [
        InventoryCategory::Meat,
        InventoryCategory::Vegetables,
        InventoryCategory::Dairy,
        InventoryCategory::Spices,
        InventoryCategory::Beverages,
        InventoryCategory::Grains,
        InventoryCategory::Fruits,
        InventoryCategory::Cleaning,
        InventoryCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InventoryCategory::Meat => "Carnes",
            InventoryCategory::Vegetables => "Vegetais",
            InventoryCategory::Dairy => "Laticínios",
            InventoryCategory::Spices => "Temperos",
            InventoryCategory::Beverages => "Bebidas",
            InventoryCategory::Grains => "Grãos",
            InventoryCategory::Fruits => "Frutas",
            InventoryCategory::Cleaning => "Limpeza",
            InventoryCategory::Other => "Outros",
        }
    }

    /// Badge classes used when the category is displayed.
    pub fn badge_color(self) -> &'static str {
        match self {
            InventoryCategory::Meat => "bg-red-100 text-red-800",
            InventoryCategory::Vegetables => "bg-green-100 text-green-800",
            InventoryCategory::Dairy => "bg-blue-100 text-blue-800",
            InventoryCategory::Spices => "bg-yellow-100 text-yellow-800",
            InventoryCategory::Beverages => "bg-purple-100 text-purple-800",
            InventoryCategory::Grains => "bg-amber-100 text-amber-800",
            InventoryCategory::Fruits => "bg-pink-100 text-pink-800",
            InventoryCategory::Cleaning => "bg-gray-100 text-gray-800",
            InventoryCategory::Other => "bg-indigo-100 text-indigo-800",
        }
    }

    /// Case-insensitive match on [`label`](Self::label).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.label().to_lowercase() == label)
    }
}

/// Units of measure offered for stock items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Kilogram,
    Gram,
    Liter,
    Milliliter,
    Piece,
    Pack,
    Box,
    Dozen,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Kilogram,
        Unit::Gram,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Piece,
        Unit::Pack,
        Unit::Box,
        Unit::Dozen,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "L",
            Unit::Milliliter => "mL",
            Unit::Piece => "un",
            Unit::Pack => "pct",
            Unit::Box => "cx",
            Unit::Dozen => "dz",
        }
    }

    /// Exact match first (`mL` and `L` differ only by case), then case-insensitive.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        Self::ALL
            .into_iter()
            .find(|unit| unit.symbol() == symbol)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|unit| unit.symbol().eq_ignore_ascii_case(symbol))
            })
    }
}

/// A stock item before it is given an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: InventoryCategory,
    pub quantity: f64,
    pub unit: Unit,
    pub minimum_stock: f64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u32,
    pub name: String,
    pub category: InventoryCategory,
    pub quantity: f64,
    pub unit: Unit,
    pub minimum_stock: f64,
    pub price: f64,
}

impl InventoryItem {
    pub fn total_value(&self) -> f64 {
        self.quantity * self.price
    }

    /// At or below the minimum stock level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.minimum_stock
    }

    /// Quantity as a percentage of the minimum stock; `None` without a minimum.
    pub fn stock_percentage(&self) -> Option<f64> {
        (self.minimum_stock > 0.0).then(|| self.quantity / self.minimum_stock * 100.0)
    }
}

const NAME: &str = "nome";
const CATEGORY: &str = "categoria";
const QUANTITY: &str = "quantidade";
const UNIT: &str = "unidade";
const MINIMUM_STOCK: &str = "estoqueMinimo";
const PRICE: &str = "preco";
const TOTAL_VALUE: &str = "valorTotal";

impl ToRecord for InventoryItem {
    fn headers() -> HeaderSet {
        HeaderSet::new([NAME, CATEGORY, QUANTITY, UNIT, MINIMUM_STOCK, PRICE, TOTAL_VALUE])
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with(NAME, self.name.as_str())
            .with(CATEGORY, self.category.label())
            .with(QUANTITY, self.quantity)
            .with(UNIT, self.unit.symbol())
            .with(MINIMUM_STOCK, self.minimum_stock)
            .with(PRICE, self.price)
            .with(TOTAL_VALUE, format!("{:.2}", self.total_value()))
    }
}

/// Blank category reads as `Outros`, blank unit as `un`, blank numbers as 0.
/// An unknown category or unit is a coercion error.
impl FromRecord for NewInventoryItem {
    fn required_headers() -> HeaderSet {
        HeaderSet::new([NAME, CATEGORY, QUANTITY, UNIT, MINIMUM_STOCK, PRICE])
    }

    fn from_record(record: &Record) -> Result<Self, Vec<CoercionError>> {
        let mut fields = Fields::new(record);

        let item = NewInventoryItem {
            name: fields.text(NAME),
            category: fields
                .choice(CATEGORY, "inventory category", InventoryCategory::from_label)
                .unwrap_or(InventoryCategory::Other),
            quantity: fields.number(QUANTITY),
            unit: fields
                .choice(UNIT, "unit", Unit::from_symbol)
                .unwrap_or(Unit::Piece),
            minimum_stock: fields.number(MINIMUM_STOCK),
            price: fields.number(PRICE),
        };

        fields.finish(item)
    }
}

/// Appends `new_items`, numbering them after the highest existing id.
pub fn add_items(
    mut items: Vec<InventoryItem>,
    new_items: impl IntoIterator<Item = NewInventoryItem>,
) -> Vec<InventoryItem> {
    for new in new_items {
        let id = next_id(items.iter().map(|item| item.id));
        items.push(InventoryItem {
            id,
            name: new.name,
            category: new.category,
            quantity: new.quantity,
            unit: new.unit,
            minimum_stock: new.minimum_stock,
            price: new.price,
        });
    }
    items
}

pub fn low_stock(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    items.iter().filter(|item| item.is_low_stock()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    pub item_count: usize,
    pub low_stock_count: usize,
    pub total_value: f64,
    pub category_count: usize,
}

pub fn summarize(items: &[InventoryItem]) -> InventorySummary {
    InventorySummary {
        item_count: items.len(),
        low_stock_count: items.iter().filter(|item| item.is_low_stock()).count(),
        total_value: items.iter().map(InventoryItem::total_value).sum(),
        category_count: items
            .iter()
            .map(|item| item.category)
            .collect::<HashSet<_>>()
            .len(),
    }
}
