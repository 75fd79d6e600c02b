//! Static ingredient, menu and recipe tables.
//!
//! The catalog is plain data loaded once at startup: the built-in TOML file
//! compiled into the binary, or an operator-supplied replacement. Nothing in
//! the seeding logic hard-codes catalog entries.

use config::{Config, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::entities::{ingredient::Unit, menu_item::Category};
use crate::errors::{SeedError, SeedResult};

const BUILTIN_CATALOG: &str = include_str!("../catalog/pizzeria.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientSpec {
    pub name: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MenuItemSpec {
    /// Base name shared by every size variant
    pub name: String,
    pub category: Category,
    pub size: String,
    pub price: Decimal,
}

/// Ingredients required by every menu item whose name equals `item`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeSpec {
    pub item: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Catalog {
    pub ingredients: Vec<IngredientSpec>,
    pub menu_items: Vec<MenuItemSpec>,
    #[serde(default)]
    pub recipes: Vec<RecipeSpec>,
}

impl Catalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> SeedResult<Self> {
        Self::from_toml(BUILTIN_CATALOG)
    }

    /// Loads `path` when given, the built-in catalog otherwise
    pub fn load(path: Option<&str>) -> SeedResult<Self> {
        match path {
            Some(path) => {
                info!("Loading catalog from {}", path);
                Self::from_path(Path::new(path))
            }
            None => Self::builtin(),
        }
    }

    pub fn from_path(path: &Path) -> SeedResult<Self> {
        let source = File::from(path).format(FileFormat::Toml).required(true);
        Self::build(Config::builder().add_source(source))
    }

    pub fn from_toml(src: &str) -> SeedResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(src, FileFormat::Toml)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> SeedResult<Self> {
        let catalog: Catalog = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|e| SeedError::catalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that names are unique, prices are positive and that every recipe
    /// points at known menu items and ingredients.
    pub fn validate(&self) -> SeedResult<()> {
        let mut ingredient_names = HashSet::new();
        for ingredient in &self.ingredients {
            if ingredient.name.trim().is_empty() {
                return Err(SeedError::catalog("ingredient with an empty name"));
            }
            if !ingredient_names.insert(ingredient.name.as_str()) {
                return Err(SeedError::catalog(format!(
                    "duplicate ingredient '{}'",
                    ingredient.name
                )));
            }
        }

        let mut variants = HashSet::new();
        for item in &self.menu_items {
            if item.name.trim().is_empty() {
                return Err(SeedError::catalog("menu item with an empty name"));
            }
            if item.price <= Decimal::ZERO {
                return Err(SeedError::catalog(format!(
                    "menu item '{} ({})' must have a positive price",
                    item.name, item.size
                )));
            }
            if !variants.insert((item.name.as_str(), item.size.as_str())) {
                return Err(SeedError::catalog(format!(
                    "duplicate menu item '{} ({})'",
                    item.name, item.size
                )));
            }
        }

        let mut recipe_items = HashSet::new();
        for recipe in &self.recipes {
            if !recipe_items.insert(recipe.item.as_str()) {
                return Err(SeedError::catalog(format!(
                    "more than one recipe for '{}'",
                    recipe.item
                )));
            }
            if recipe.ingredients.is_empty() {
                return Err(SeedError::catalog(format!(
                    "recipe for '{}' lists no ingredients",
                    recipe.item
                )));
            }
            if self.variants_of(&recipe.item) == 0 {
                return Err(SeedError::catalog(format!(
                    "recipe '{}' matches no menu item",
                    recipe.item
                )));
            }
            if let Some(unknown) = recipe
                .ingredients
                .iter()
                .find(|name| !ingredient_names.contains(name.as_str()))
            {
                return Err(SeedError::catalog(format!(
                    "recipe '{}' needs unknown ingredient '{}'",
                    recipe.item, unknown
                )));
            }
        }

        Ok(())
    }

    /// Number of menu items (size variants) carrying exactly this base name
    pub fn variants_of(&self, base_name: &str) -> usize {
        self.menu_items
            .iter()
            .filter(|item| item.name == base_name)
            .count()
    }

    /// Recipe rows a full run inserts: ingredients x matching variants, summed
    /// over all recipes.
    pub fn expected_recipe_rows(&self) -> usize {
        self.recipes
            .iter()
            .map(|recipe| recipe.ingredients.len() * self.variants_of(&recipe.item))
            .sum()
    }

}
