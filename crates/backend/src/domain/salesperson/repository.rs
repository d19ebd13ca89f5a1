use anyhow::Result;
use contracts::domain::salesperson::Salesperson;
use sea_orm::{DatabaseBackend, FromQueryResult, Statement};

use crate::shared::data::db::get_connection;

#[derive(Debug, FromQueryResult)]
struct SalespersonRow {
    salesman_no: i64,
    salesman_name: String,
    role: Option<String>,
}

impl From<SalespersonRow> for Salesperson {
    fn from(r: SalespersonRow) -> Self {
        Salesperson {
            salesman_no: r.salesman_no,
            salesman_name: r.salesman_name,
            role: r.role,
        }
    }
}

pub async fn get_by_no(salesman_no: i64) -> Result<Option<Salesperson>> {
    let row = SalespersonRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT salesman_no, salesman_name, role FROM salesperson_masters WHERE salesman_no = ?",
        [salesman_no.into()],
    ))
    .one(get_connection()?)
    .await?;
    Ok(row.map(Into::into))
}

/// Salesperson linked to a login. Admin accounts (no salesman id, or the
/// superadmin id 0) have none.
pub async fn get_for_username(username: &str) -> Result<Option<Salesperson>> {
    let row = SalespersonRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        r#"
            SELECT s.salesman_no, s.salesman_name, s.role
            FROM sys_users u
            JOIN salesperson_masters s ON s.salesman_no = u.salesman_id
            WHERE u.username = ?
              AND u.salesman_id IS NOT NULL
              AND u.salesman_id != 0
        "#,
        [username.into()],
    ))
    .one(get_connection()?)
    .await?;
    Ok(row.map(Into::into))
}

/// Salespeople that have a login of their own, by number
pub async fn list_with_accounts() -> Result<Vec<Salesperson>> {
    let rows = SalespersonRow::find_by_statement(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
            SELECT DISTINCT s.salesman_no, s.salesman_name, s.role
            FROM salesperson_masters s
            INNER JOIN sys_users u ON u.salesman_id = s.salesman_no
            WHERE u.salesman_id IS NOT NULL AND u.salesman_id != 0
            ORDER BY s.salesman_no
        "#
        .to_string(),
    ))
    .all(get_connection()?)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
