use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub ingredient_id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub stock_quantity: Decimal,
    pub unit: Unit,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::menu_item_ingredient::Entity")]
    MenuItemIngredients,
}

impl Related<super::menu_item_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItemIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Unit of measure for ingredient stock
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "liters")]
    Liters,
    #[sea_orm(string_value = "units")]
    Units,
}
