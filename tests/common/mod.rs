#![allow(dead_code)]

use cinema_system::config::DatabaseConfig;
use cinema_system::database::Database;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, ExecResult};
use sea_orm_migration::SchemaManager;

pub async fn connect() -> Database {
    Database::new(&DatabaseConfig::new("sqlite::memory:"))
        .await
        .expect("in-memory sqlite")
}

pub fn manager(db: &Database) -> SchemaManager<'_> {
    SchemaManager::new(db.connection())
}

pub async fn exec(db: &DatabaseConnection, sql: &str) -> Result<ExecResult, DbErr> {
    db.execute_unprepared(sql).await
}

pub async fn count(db: &DatabaseConnection, sql: &str) -> i64 {
    let result = match db.get_database_backend() {
        DbBackend::Postgres => {
            sqlx::query_scalar::<_, i64>(sql)
                .fetch_one(db.get_postgres_connection_pool())
                .await
        }
        _ => {
            sqlx::query_scalar::<_, i64>(sql)
                .fetch_one(db.get_sqlite_connection_pool())
                .await
        }
    };
    result.expect(sql)
}

/// Cinema "Roxy" with show room "Hall 1", movie "Dune", one show from 18:00
/// to 20:30 and seat 12 ("vip") in Hall 1. Every row gets id 1.
pub async fn seed_roxy(db: &DatabaseConnection) {
    for sql in [
        "INSERT INTO \"cinema\" (\"name\", \"address\") VALUES ('Roxy', '1 Main Street')",
        "INSERT INTO \"show_room\" (\"name\", \"cinema_id\") VALUES ('Hall 1', 1)",
        "INSERT INTO \"movie\" (\"title\", \"description\") VALUES ('Dune', 'Arrakis')",
        "INSERT INTO \"show\" (\"start_time\", \"end_time\", \"movie_id\", \"cinema_id\") \
         VALUES ('2022-09-23 18:00:00', '2022-09-23 20:30:00', 1, 1)",
        "INSERT INTO \"seat\" (\"show_room_id\", \"seat_number\", \"seat_type\") VALUES (1, 12, 'vip')",
    ] {
        exec(db, sql).await.expect(sql);
    }
}

/// Roxy plus a second show and seat, with one booking for each pair.
pub async fn seed_two_bookings(db: &DatabaseConnection) {
    seed_roxy(db).await;
    for sql in [
        "INSERT INTO \"show\" (\"start_time\", \"end_time\", \"movie_id\", \"cinema_id\") \
         VALUES ('2022-09-23 21:00:00', '2022-09-23 23:30:00', 1, 1)",
        "INSERT INTO \"seat\" (\"show_room_id\", \"seat_number\", \"seat_type\") VALUES (1, 13, 'standard')",
        "INSERT INTO \"booking\" (\"show_id\", \"seat_id\") VALUES (1, 1)",
        "INSERT INTO \"booking\" (\"show_id\", \"seat_id\") VALUES (2, 2)",
    ] {
        exec(db, sql).await.expect(sql);
    }
}
