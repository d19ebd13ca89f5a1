use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Tables are created on startup when missing. Sales ledger, open orders and
/// the master tables are loaded by an external import; the dashboard only
/// reads them.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sys_users (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        salesman_id INTEGER,
        full_name TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        last_login_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sys_settings (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        created_at TEXT,
        updated_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS salesperson_masters (
        salesman_no INTEGER PRIMARY KEY NOT NULL,
        salesman_name TEXT NOT NULL,
        role TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        salesperson INTEGER NOT NULL,
        order_no TEXT,
        period TEXT NOT NULL,
        customer_name TEXT,
        derived_customer_class TEXT,
        brand TEXT,
        flag TEXT,
        item_division INTEGER,
        qty REAL NOT NULL DEFAULT 0,
        ext_sales REAL NOT NULL DEFAULT 0,
        ext_cost REAL NOT NULL DEFAULT 0,
        zero_perc_sales TEXT,
        is_warranty TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sales_salesperson_period ON sales (salesperson, period)",
    "CREATE INDEX IF NOT EXISTS idx_sales_order_no ON sales (order_no)",
    r#"
    CREATE TABLE IF NOT EXISTS open_orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        salesperson INTEGER NOT NULL,
        requested_ship_date TEXT NOT NULL,
        customer_name TEXT,
        derived_customer_class TEXT,
        brand TEXT,
        flag TEXT,
        ext_sales REAL NOT NULL DEFAULT 0,
        zero_perc_sales TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_open_orders_salesperson_ship \
     ON open_orders (salesperson, requested_ship_date)",
    r#"
    CREATE TABLE IF NOT EXISTS division_masters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        div_no INTEGER NOT NULL,
        div_desc TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS budgets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        salesperson_id INTEGER NOT NULL,
        salesperson_name TEXT NOT NULL,
        brand TEXT,
        flag TEXT,
        customer_name TEXT,
        customer_class TEXT NOT NULL,
        quarter_1_sales REAL NOT NULL DEFAULT 0,
        quarter_2_sales REAL NOT NULL DEFAULT 0,
        quarter_3_sales REAL NOT NULL DEFAULT 0,
        quarter_4_sales REAL NOT NULL DEFAULT 0,
        is_custom BOOLEAN NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_budgets_salesperson ON budgets (salesperson_id)",
    r#"
    CREATE TABLE IF NOT EXISTS division_ratio_overrides (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        salesperson_id INTEGER NOT NULL,
        salesperson_name TEXT NOT NULL,
        customer_class TEXT NOT NULL,
        group_key TEXT NOT NULL,
        item_division INTEGER NOT NULL,
        custom_ratio REAL NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (salesperson_id, customer_class, group_key, item_division)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS gross_profit_overrides (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        salesperson_id INTEGER NOT NULL,
        customer_class TEXT NOT NULL,
        group_key TEXT NOT NULL,
        period TEXT NOT NULL,
        gp_percent REAL NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (salesperson_id, customer_class, group_key, period)
    )
    "#,
];

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/dashboard.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    apply_schema(&conn).await?;
    tracing::info!("Database ready at {}", absolute_path.display());

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

async fn apply_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for sql in SCHEMA {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}
