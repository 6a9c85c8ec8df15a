//! Read the live schema back from the database.
//!
//! Used to check that a rollback followed by a re-apply leaves the schema
//! exactly as it was, and by the `inspect` command.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend};
use serde::Serialize;
use sqlx::FromRow;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ColumnInfo {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    /// 1 when the column accepts NULL.
    pub nullable: i64,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct ForeignKeyInfo {
    pub table_name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_delete: String,
    pub on_update: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSnapshot {
    pub columns: Vec<ColumnInfo>,
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl SchemaSnapshot {
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .columns
            .iter()
            .map(|column| column.table_name.as_str())
            .collect();
        names.dedup();
        names
    }

    pub fn columns_of<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ColumnInfo> + 'a {
        self.columns
            .iter()
            .filter(move |column| column.table_name == table)
    }

    pub fn foreign_keys_of<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a ForeignKeyInfo> + 'a {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.table_name == table)
    }
}

const POSTGRES_TABLES: &str = r#"
SELECT CAST(table_name AS TEXT) AS table_name
FROM information_schema.tables
WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'
ORDER BY table_name
"#;

const SQLITE_TABLES: &str = r#"
SELECT name AS table_name
FROM sqlite_master
WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
ORDER BY name
"#;

const POSTGRES_COLUMNS: &str = r#"
SELECT CAST(c.table_name AS TEXT) AS table_name,
       CAST(c.column_name AS TEXT) AS column_name,
       CAST(c.data_type AS TEXT) AS data_type,
       CAST(CASE WHEN c.is_nullable = 'YES' THEN 1 ELSE 0 END AS BIGINT) AS nullable,
       CAST(c.column_default AS TEXT) AS default_value
FROM information_schema.columns c
JOIN information_schema.tables t
  ON t.table_schema = c.table_schema AND t.table_name = c.table_name
WHERE c.table_schema = current_schema() AND t.table_type = 'BASE TABLE'
ORDER BY c.table_name, c.ordinal_position
"#;

// pragma_table_info reports NOT NULL as 0 for INTEGER PRIMARY KEY columns
const SQLITE_COLUMNS: &str = r#"
SELECT m.name AS table_name,
       p.name AS column_name,
       p.type AS data_type,
       CASE WHEN p."notnull" = 1 OR p.pk = 1 THEN 0 ELSE 1 END AS nullable,
       p.dflt_value AS default_value
FROM sqlite_master m
JOIN pragma_table_info(m.name) p
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%'
ORDER BY m.name, p.cid
"#;

const POSTGRES_FOREIGN_KEYS: &str = r#"
SELECT CAST(kcu.table_name AS TEXT) AS table_name,
       CAST(kcu.column_name AS TEXT) AS column_name,
       CAST(ccu.table_name AS TEXT) AS referenced_table,
       CAST(ccu.column_name AS TEXT) AS referenced_column,
       CAST(rc.delete_rule AS TEXT) AS on_delete,
       CAST(rc.update_rule AS TEXT) AS on_update
FROM information_schema.referential_constraints rc
JOIN information_schema.key_column_usage kcu
  ON kcu.constraint_schema = rc.constraint_schema AND kcu.constraint_name = rc.constraint_name
JOIN information_schema.constraint_column_usage ccu
  ON ccu.constraint_schema = rc.unique_constraint_schema AND ccu.constraint_name = rc.unique_constraint_name
WHERE rc.constraint_schema = current_schema()
ORDER BY 1, 2
"#;

const SQLITE_FOREIGN_KEYS: &str = r#"
SELECT m.name AS table_name,
       p."from" AS column_name,
       p."table" AS referenced_table,
       p."to" AS referenced_column,
       p.on_delete AS on_delete,
       p.on_update AS on_update
FROM sqlite_master m
JOIN pragma_foreign_key_list(m.name) p
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%'
ORDER BY m.name, p."from"
"#;

/// Names of all user tables, sorted.
pub async fn table_names(db: &DatabaseConnection) -> Result<Vec<String>> {
    let names = match db.get_database_backend() {
        DbBackend::Postgres => {
            sqlx::query_scalar::<_, String>(POSTGRES_TABLES)
                .fetch_all(db.get_postgres_connection_pool())
                .await?
        }
        DbBackend::Sqlite => {
            sqlx::query_scalar::<_, String>(SQLITE_TABLES)
                .fetch_all(db.get_sqlite_connection_pool())
                .await?
        }
        other => return Err(Error::UnsupportedBackend(format!("{other:?}"))),
    };
    Ok(names)
}

pub async fn snapshot(db: &DatabaseConnection) -> Result<SchemaSnapshot> {
    let snapshot = match db.get_database_backend() {
        DbBackend::Postgres => {
            let pool = db.get_postgres_connection_pool();
            SchemaSnapshot {
                columns: sqlx::query_as(POSTGRES_COLUMNS).fetch_all(pool).await?,
                foreign_keys: sqlx::query_as(POSTGRES_FOREIGN_KEYS).fetch_all(pool).await?,
            }
        }
        DbBackend::Sqlite => {
            let pool = db.get_sqlite_connection_pool();
            SchemaSnapshot {
                columns: sqlx::query_as(SQLITE_COLUMNS).fetch_all(pool).await?,
                foreign_keys: sqlx::query_as(SQLITE_FOREIGN_KEYS).fetch_all(pool).await?,
            }
        }
        other => return Err(Error::UnsupportedBackend(format!("{other:?}"))),
    };
    Ok(snapshot)
}
