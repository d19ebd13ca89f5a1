use contracts::domain::budget::{Budget, BudgetCreate};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, QueryOrder, Set};
use serde::{Deserialize, Serialize};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub salesperson_id: i64,
    pub salesperson_name: String,
    pub brand: Option<String>,
    pub flag: Option<String>,
    pub customer_name: Option<String>,
    pub customer_class: String,
    pub quarter_1_sales: f64,
    pub quarter_2_sales: f64,
    pub quarter_3_sales: f64,
    pub quarter_4_sales: f64,
    pub is_custom: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Budget {
    fn from(m: Model) -> Self {
        let mut budget = Budget {
            id: m.id,
            salesperson_id: m.salesperson_id,
            salesperson_name: m.salesperson_name,
            brand: m.brand,
            flag: m.flag,
            customer_name: m.customer_name,
            customer_class: m.customer_class,
            quarter_1_sales: m.quarter_1_sales,
            quarter_2_sales: m.quarter_2_sales,
            quarter_3_sales: m.quarter_3_sales,
            quarter_4_sales: m.quarter_4_sales,
            is_custom: m.is_custom,
            total_sales: 0.0,
        };
        budget.recompute_total();
        budget
    }
}

fn active_from_create(dto: &BudgetCreate) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        salesperson_id: Set(dto.salesperson_id),
        salesperson_name: Set(dto.salesperson_name.clone()),
        brand: Set(dto.brand.clone()),
        flag: Set(dto.flag.clone()),
        customer_name: Set(dto.customer_name.clone()),
        customer_class: Set(dto.customer_class.clone()),
        quarter_1_sales: Set(dto.quarter_1_sales),
        quarter_2_sales: Set(dto.quarter_2_sales),
        quarter_3_sales: Set(dto.quarter_3_sales),
        quarter_4_sales: Set(dto.quarter_4_sales),
        is_custom: Set(dto.is_custom),
    }
}

fn conn() -> anyhow::Result<&'static DatabaseConnection> {
    get_connection()
}

pub async fn list_by_salesperson(salesperson_id: i64) -> anyhow::Result<Vec<Budget>> {
    let items = Entity::find()
        .filter(Column::SalespersonId.eq(salesperson_id))
        .order_by_asc(Column::Id)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Budgets that follow computed defaults, across all salespeople
pub async fn list_non_custom() -> anyhow::Result<Vec<Budget>> {
    let items = Entity::find()
        .filter(Column::IsCustom.eq(false))
        .order_by_asc(Column::Id)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: i64) -> anyhow::Result<Option<Budget>> {
    let result = Entity::find_by_id(id).one(conn()?).await?;
    Ok(result.map(Into::into))
}

pub async fn insert(dto: &BudgetCreate) -> anyhow::Result<Budget> {
    let model = active_from_create(dto).insert(conn()?).await?;
    Ok(model.into())
}

/// Insert several budgets in order, returning the stored rows
pub async fn insert_many(dtos: &[BudgetCreate]) -> anyhow::Result<Vec<Budget>> {
    let mut stored = Vec::with_capacity(dtos.len());
    for dto in dtos {
        stored.push(insert(dto).await?);
    }
    Ok(stored)
}

/// Write every editable field of `budget` back to its row
pub async fn update(budget: &Budget) -> anyhow::Result<Budget> {
    let active = ActiveModel {
        id: Set(budget.id),
        salesperson_id: Set(budget.salesperson_id),
        salesperson_name: Set(budget.salesperson_name.clone()),
        brand: Set(budget.brand.clone()),
        flag: Set(budget.flag.clone()),
        customer_name: Set(budget.customer_name.clone()),
        customer_class: Set(budget.customer_class.clone()),
        quarter_1_sales: Set(budget.quarter_1_sales),
        quarter_2_sales: Set(budget.quarter_2_sales),
        quarter_3_sales: Set(budget.quarter_3_sales),
        quarter_4_sales: Set(budget.quarter_4_sales),
        is_custom: Set(budget.is_custom),
    };
    let model = active.update(conn()?).await?;
    Ok(model.into())
}

/// Returns `true` when a row was removed
pub async fn delete(id: i64) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id).exec(conn()?).await?;
    Ok(result.rows_affected > 0)
}
