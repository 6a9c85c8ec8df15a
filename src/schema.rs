//! Migrations described as an ordered list of tables.
//!
//! The list is the only source of truth: [`create_tables`] applies it front to
//! back and [`drop_tables`] walks it back to front, so a rollback removes
//! exactly what the forward migration created. Both run inside one
//! transaction (a savepoint when the migrator already holds one).

use sea_orm::{DatabaseTransaction, DbBackend, StatementBuilder, TransactionTrait};
use sea_orm_migration::prelude::{
    DbErr, SchemaManager, Table, TableCreateStatement, TableDropStatement, TableRef,
};
use tracing::{debug, warn};

use crate::error::Error;

/// Name of the table a `CREATE TABLE` statement creates.
pub fn table_name(table: &TableCreateStatement) -> Option<String> {
    match table.get_table_name()? {
        TableRef::Table(iden) => Some(iden.to_string()),
        _ => None,
    }
}

fn referenced_tables(table: &TableCreateStatement) -> Vec<String> {
    table
        .get_foreign_key_create_stmts()
        .iter()
        .filter_map(|fk| match fk.get_foreign_key().get_ref_table()? {
            TableRef::Table(iden) => Some(iden.to_string()),
            _ => None,
        })
        .collect()
}

/// Rejects a list in which a table references another table created later in
/// the same list. Tables outside the list (created by earlier migrations) and
/// self references are fine.
pub fn check_dependency_order(tables: &[TableCreateStatement]) -> Result<(), Error> {
    let names: Vec<Option<String>> = tables.iter().map(table_name).collect();

    for (position, table) in tables.iter().enumerate() {
        for referenced in referenced_tables(table) {
            let created_later = names[position + 1..]
                .iter()
                .flatten()
                .any(|later| *later == referenced);
            if created_later {
                return Err(Error::DependencyOrder {
                    table: names[position].clone().unwrap_or_default(),
                    references: referenced,
                });
            }
        }
    }
    Ok(())
}

/// `DROP TABLE` for every table in the list, last created first.
pub fn drop_statements(tables: &[TableCreateStatement]) -> Vec<TableDropStatement> {
    tables
        .iter()
        .rev()
        .filter_map(TableCreateStatement::get_table_name)
        .map(|name| Table::drop().table(name.clone()).to_owned())
        .collect()
}

/// SQL text of a statement for the given backend.
pub fn render<S: StatementBuilder>(backend: DbBackend, statement: &S) -> String {
    backend.build(statement).to_string()
}

pub async fn create_tables(
    manager: &SchemaManager<'_>,
    tables: Vec<TableCreateStatement>,
) -> Result<(), DbErr> {
    check_dependency_order(&tables).map_err(|e| DbErr::Migration(e.to_string()))?;

    let txn = manager.get_connection().begin().await?;
    let result = create_each(&SchemaManager::new(&txn), tables).await;
    finish(txn, result).await
}

pub async fn drop_tables(
    manager: &SchemaManager<'_>,
    tables: &[TableCreateStatement],
) -> Result<(), DbErr> {
    let txn = manager.get_connection().begin().await?;
    let result = drop_each(&SchemaManager::new(&txn), drop_statements(tables)).await;
    finish(txn, result).await
}

async fn create_each(
    manager: &SchemaManager<'_>,
    tables: Vec<TableCreateStatement>,
) -> Result<(), DbErr> {
    for table in tables {
        debug!("Creating table '{}'", table_name(&table).unwrap_or_default());
        manager.create_table(table).await?;
    }
    Ok(())
}

async fn drop_each(
    manager: &SchemaManager<'_>,
    statements: Vec<TableDropStatement>,
) -> Result<(), DbErr> {
    for statement in statements {
        debug!("{}", render(manager.get_database_backend(), &statement));
        manager.drop_table(statement).await?;
    }
    Ok(())
}

// The statement error wins over a failed rollback
async fn finish(txn: DatabaseTransaction, result: Result<(), DbErr>) -> Result<(), DbErr> {
    match result {
        Ok(()) => txn.commit().await,
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                warn!("Rollback failed: {}", rollback);
            }
            Err(e)
        }
    }
}
