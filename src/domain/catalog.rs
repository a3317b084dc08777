use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Cents;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Food,
    Drink,
    Comfort,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 3] = [
        ServiceCategory::Food,
        ServiceCategory::Drink,
        ServiceCategory::Comfort,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Food => "food",
            ServiceCategory::Drink => "drink",
            ServiceCategory::Comfort => "comfort",
        }
    }

    /// Code of the "nothing selected" entry every menu must carry at price 0.
    pub fn none_code(&self) -> &'static str {
        match self {
            ServiceCategory::Food => "F0",
            ServiceCategory::Drink => "D0",
            ServiceCategory::Comfort => "C0",
        }
    }
}

impl std::fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One purchasable add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub code: String,
    pub name: String,
    pub price_cents: Cents,
}

impl ServiceItem {
    fn new(code: &str, name: &str, price_cents: Cents) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            price_cents,
        }
    }
}

/// One code per category. Codes are only meaningful against a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub food: String,
    pub drink: String,
    pub comfort: String,
}

impl ServiceSelection {
    pub fn new(
        food: impl Into<String>,
        drink: impl Into<String>,
        comfort: impl Into<String>,
    ) -> Self {
        Self {
            food: food.into(),
            drink: drink.into(),
            comfort: comfort.into(),
        }
    }

    pub fn code(&self, category: ServiceCategory) -> &str {
        match category {
            ServiceCategory::Food => &self.food,
            ServiceCategory::Drink => &self.drink,
            ServiceCategory::Comfort => &self.comfort,
        }
    }
}

/// The food, drink and comfort menus. Built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCatalog {
    pub food: Vec<ServiceItem>,
    pub drink: Vec<ServiceItem>,
    pub comfort: Vec<ServiceItem>,
}

impl Default for ServiceCatalog {
    fn default() -> Self {
        Self {
            food: vec![
                ServiceItem::new("F0", "No meal", 0),
                ServiceItem::new("F1", "Snack box", 500),
                ServiceItem::new("F2", "Hot meal", 1000),
                ServiceItem::new("F3", "Vegetarian meal", 950),
                ServiceItem::new("F4", "Kids meal", 650),
            ],
            drink: vec![
                ServiceItem::new("D0", "No drink", 0),
                ServiceItem::new("D1", "Soft drink", 200),
                ServiceItem::new("D2", "Coffee", 250),
                ServiceItem::new("D3", "Juice", 300),
                ServiceItem::new("D4", "Water", 150),
            ],
            comfort: vec![
                ServiceItem::new("C0", "No comfort", 0),
                ServiceItem::new("C1", "Blanket", 300),
                ServiceItem::new("C2", "Pillow", 300),
                ServiceItem::new("C3", "Headphones", 400),
                ServiceItem::new("C4", "Amenity kit", 750),
            ],
        }
    }
}

impl ServiceCatalog {
    pub fn menu(&self, category: ServiceCategory) -> &[ServiceItem] {
        match category {
            ServiceCategory::Food => &self.food,
            ServiceCategory::Drink => &self.drink,
            ServiceCategory::Comfort => &self.comfort,
        }
    }

    pub fn lookup(&self, category: ServiceCategory, code: &str) -> Option<&ServiceItem> {
        self.menu(category).iter().find(|item| item.code == code)
    }

    /// Build a selection from optional user choices.
    /// Skipped categories fall back to the category's "none" entry; codes are
    /// normalized to upper-case and must exist in the menu.
    pub fn select(
        &self,
        food: Option<&str>,
        drink: Option<&str>,
        comfort: Option<&str>,
    ) -> Result<ServiceSelection, CatalogError> {
        let pick = |category: ServiceCategory, choice: Option<&str>| {
            let code = match choice {
                Some(c) => c.trim().to_uppercase(),
                None => category.none_code().to_string(),
            };
            match self.lookup(category, &code) {
                Some(_) => Ok(code),
                None => Err(CatalogError::UnknownCode { category, code }),
            }
        };

        Ok(ServiceSelection {
            food: pick(ServiceCategory::Food, food)?,
            drink: pick(ServiceCategory::Drink, drink)?,
            comfort: pick(ServiceCategory::Comfort, comfort)?,
        })
    }

    /// Sum the prices of the three selected items.
    pub fn compute_cost(&self, selection: &ServiceSelection) -> Result<Cents, CatalogError> {
        ServiceCategory::ALL.iter().try_fold(0, |total, &category| {
            let code = selection.code(category);
            self.lookup(category, code)
                .map(|item| total + item.price_cents)
                .ok_or_else(|| CatalogError::UnknownCode {
                    category,
                    code: code.to_string(),
                })
        })
    }

    /// Human-readable names, e.g. "Hot meal, Water, No comfort".
    /// `None` when any code is not in the catalog.
    pub fn describe(&self, selection: &ServiceSelection) -> Option<String> {
        let names = ServiceCategory::ALL
            .iter()
            .map(|&category| {
                self.lookup(category, selection.code(category))
                    .map(|item| item.name.as_str())
            })
            .collect::<Option<Vec<_>>>()?;
        Some(names.join(", "))
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for category in ServiceCategory::ALL {
            let menu = self.menu(category);

            let mut seen = HashSet::new();
            for item in menu {
                if item.code.is_empty() || item.code != item.code.to_uppercase() {
                    return Err(CatalogError::Invalid(format!(
                        "{} code '{}' must be non-empty upper-case",
                        category, item.code
                    )));
                }
                if item.code.contains([',', '|']) {
                    return Err(CatalogError::Invalid(format!(
                        "{} code '{}' must not contain ',' or '|'",
                        category, item.code
                    )));
                }
                if !seen.insert(item.code.as_str()) {
                    return Err(CatalogError::Invalid(format!(
                        "duplicate {} code '{}'",
                        category, item.code
                    )));
                }
                if item.price_cents < 0 {
                    return Err(CatalogError::Invalid(format!(
                        "{} item '{}' has a negative price",
                        category, item.code
                    )));
                }
            }

            match self.lookup(category, category.none_code()) {
                Some(item) if item.price_cents == 0 => {}
                Some(_) => {
                    return Err(CatalogError::Invalid(format!(
                        "{} entry '{}' must cost 0",
                        category,
                        category.none_code()
                    )));
                }
                None => {
                    return Err(CatalogError::Invalid(format!(
                        "{} menu is missing its '{}' entry",
                        category,
                        category.none_code()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    UnknownCode {
        category: ServiceCategory,
        code: String,
    },
    Invalid(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::UnknownCode { category, code } => {
                write!(f, "Unknown {} service code: {}", category, code)
            }
            CatalogError::Invalid(message) => write!(f, "Invalid service catalog: {}", message),
        }
    }
}

impl std::error::Error for CatalogError {}
