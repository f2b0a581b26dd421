use serde::{Deserialize, Serialize};

use crate::{
    core::record::{HeaderSet, Record},
    error::{CoercionError, StateError},
    item::mapping::{Fields, FromRecord, ToRecord},
};

use super::{contains_ignore_case, next_id};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub available: bool,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub available: bool,
    pub image: Option<String>,
}

const NAME: &str = "nome";
const CATEGORY: &str = "categoria";
const PRICE: &str = "preco";
const DESCRIPTION: &str = "descricao";
const AVAILABLE: &str = "disponivel";
const IMAGE: &str = "imagem";

impl ToRecord for MenuItem {
    fn headers() -> HeaderSet {
        HeaderSet::new([NAME, CATEGORY, PRICE, DESCRIPTION, AVAILABLE, IMAGE])
    }

    fn to_record(&self) -> Record {
        Record::new()
            .with(NAME, self.name.as_str())
            .with(CATEGORY, self.category.as_str())
            .with(PRICE, self.price)
            .with(DESCRIPTION, self.description.as_str())
            .with(AVAILABLE, self.available)
            .with(IMAGE, self.image.clone())
    }
}

/// `disponivel` and `imagem` are optional columns; a missing availability
/// means the item is on sale.
impl FromRecord for NewMenuItem {
    fn required_headers() -> HeaderSet {
        HeaderSet::new([NAME, CATEGORY, PRICE])
    }

    fn from_record(record: &Record) -> Result<Self, Vec<CoercionError>> {
        let mut fields = Fields::new(record);

        let item = NewMenuItem {
            name: fields.text(NAME),
            category: fields.text(CATEGORY),
            price: fields.number(PRICE),
            description: fields.text(DESCRIPTION),
            available: fields.boolean(AVAILABLE, true),
            image: fields.optional_text(IMAGE),
        };

        fields.finish(item)
    }
}

/// Category and free-text search over the menu. `None` category shows all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuFilter {
    pub category: Option<String>,
    pub search: String,
}

impl MenuFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        let category_matches = self
            .category
            .as_deref()
            .is_none_or(|category| item.category == category);

        category_matches && contains_ignore_case(&item.name, &self.search)
    }
}

pub fn filter_menu<'a>(items: &'a [MenuItem], filter: &MenuFilter) -> Vec<&'a MenuItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Distinct categories in order of first appearance.
pub fn categories(items: &[MenuItem]) -> Vec<&str> {
    let mut categories: Vec<&str> = Vec::new();
    for item in items {
        if !categories.contains(&item.category.as_str()) {
            categories.push(&item.category);
        }
    }
    categories
}

pub fn add_items(
    mut items: Vec<MenuItem>,
    new_items: impl IntoIterator<Item = NewMenuItem>,
) -> Vec<MenuItem> {
    for new in new_items {
        let id = next_id(items.iter().map(|item| item.id));
        items.push(MenuItem {
            id,
            name: new.name,
            category: new.category,
            price: new.price,
            description: new.description,
            available: new.available,
            image: new.image,
        });
    }
    items
}

/// Replaces the item sharing `updated`'s id.
pub fn update_item(
    mut items: Vec<MenuItem>,
    updated: MenuItem,
) -> Result<Vec<MenuItem>, StateError> {
    let slot = items
        .iter_mut()
        .find(|item| item.id == updated.id)
        .ok_or(StateError::UnknownMenuItem(updated.id))?;
    *slot = updated;
    Ok(items)
}

pub fn set_available(
    mut items: Vec<MenuItem>,
    id: u32,
    available: bool,
) -> Result<Vec<MenuItem>, StateError> {
    let item = items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or(StateError::UnknownMenuItem(id))?;
    item.available = available;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<MenuItem> {
        let new = |name: &str, category: &str, price: f64| NewMenuItem {
            name: name.into(),
            category: category.into(),
            price,
            description: String::new(),
            available: true,
            image: None,
        };

        add_items(
            Vec::new(),
            vec![
                new("Hambúrguer Artesanal", "Lanches", 28.9),
                new("Pizza Margherita", "Pizzas", 42.0),
                new("Caipirinha", "Bebidas", 15.0),
                new("Pizza Calabresa", "Pizzas", 40.0),
            ],
        )
    }

    #[test]
    fn filter_combines_category_and_case_insensitive_search() {
        let items = menu();

        let pizzas = MenuFilter {
            category: Some("Pizzas".into()),
            search: "MARG".into(),
        };
        let names: Vec<_> = filter_menu(&items, &pizzas)
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["Pizza Margherita"]);

        assert_eq!(filter_menu(&items, &MenuFilter::default()).len(), 4);
    }

    #[test]
    fn categories_keep_first_seen_order() {
        assert_eq!(categories(&menu()), vec!["Lanches", "Pizzas", "Bebidas"]);
    }

    #[test]
    fn availability_toggles_and_unknown_ids_are_rejected() {
        let items = set_available(menu(), 2, false).unwrap();
        assert!(!items[1].available);

        assert_eq!(
            set_available(items, 99, true),
            Err(StateError::UnknownMenuItem(99))
        );
    }

    #[test]
    fn update_replaces_whole_item() {
        let mut changed = menu()[0].clone();
        changed.price = 30.0;

        let items = update_item(menu(), changed).unwrap();
        assert_eq!(items[0].price, 30.0);
    }

    #[test]
    fn import_defaults_availability_and_reads_optional_image() {
        let record = Record::new()
            .with("nome", "Tiramisu")
            .with("categoria", "Sobremesas")
            .with("preco", "18")
            .with("imagem", "tiramisu.png");

        let new = NewMenuItem::from_record(&record).unwrap();

        assert!(new.available);
        assert_eq!(new.image.as_deref(), Some("tiramisu.png"));
        assert_eq!(new.description, "");
    }

    #[test]
    fn export_leaves_missing_image_empty() {
        let record = menu()[2].to_record();
        assert_eq!(record.text("imagem"), "");
        assert_eq!(record.text("disponivel"), "true");
    }
}
