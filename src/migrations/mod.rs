//! Migrations known to this build, in the order they are applied.

use sea_orm_migration::prelude::*;

pub mod m20220922_201653_cinema_system;

/// Table recording which migrations have been applied.
pub const MIGRATIONS_TABLE: &str = "cinema_migrations";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20220922_201653_cinema_system::Migration)]
    }

    fn migration_table_name() -> DynIden {
        Alias::new(MIGRATIONS_TABLE).into_iden()
    }
}
