use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A sellable menu entry. Size variants are separate rows sharing `name`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i32,
    pub name: String,
    pub category: Category,
    pub size: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
    #[sea_orm(has_many = "super::menu_item_ingredient::Entity")]
    MenuItemIngredients,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::menu_item_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItemIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Category {
    #[sea_orm(string_value = "Pizza")]
    Pizza,
    #[sea_orm(string_value = "Side")]
    Side,
    #[sea_orm(string_value = "Drink")]
    Drink,
}
