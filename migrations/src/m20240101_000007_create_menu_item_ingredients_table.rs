use sea_orm_migration::prelude::*;

use super::m20240101_000003_create_ingredients_table::Ingredients;
use super::m20240101_000004_create_menu_items_table::MenuItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Surrogate key only: recipe rows are not deduplicated per (item, ingredient).
        manager
            .create_table(
                Table::create()
                    .table(MenuItemIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItemIngredients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MenuItemIngredients::ItemId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItemIngredients::IngredientId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItemIngredients::QuantityNeeded)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_item_ingredients_item_id")
                            .from(MenuItemIngredients::Table, MenuItemIngredients::ItemId)
                            .to(MenuItems::Table, MenuItems::ItemId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_item_ingredients_ingredient_id")
                            .from(
                                MenuItemIngredients::Table,
                                MenuItemIngredients::IngredientId,
                            )
                            .to(Ingredients::Table, Ingredients::IngredientId),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItemIngredients::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MenuItemIngredients {
    Table,
    Id,
    ItemId,
    IngredientId,
    QuantityNeeded,
}
