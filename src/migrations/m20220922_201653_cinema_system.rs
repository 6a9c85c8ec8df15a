//! Initial cinema schema: movies, cinemas and their show rooms, shows,
//! per-show pricing, seats and bookings.

use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::{boolean as bool, decimal_len, integer, pk_auto, text_null, timestamp};

use crate::schema::{create_tables, drop_tables};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_tables(manager, tables()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_tables(manager, &tables()).await
    }
}

/// Tables in creation order: every table comes after the tables it references.
pub fn tables() -> Vec<TableCreateStatement> {
    vec![
        Table::create()
            .table(Movie::Table)
            .col(pk_auto(Movie::Id))
            .col(ColumnDef::new(Movie::Title).string_len(255).not_null())
            .col(text_null(Movie::Description))
            .col(ColumnDef::new(Movie::ImageUrl).string_len(255))
            .to_owned(),
        Table::create()
            .table(Cinema::Table)
            .col(pk_auto(Cinema::Id))
            .col(ColumnDef::new(Cinema::Name).string_len(255).not_null())
            .col(text_null(Cinema::Address))
            .to_owned(),
        Table::create()
            .table(Show::Table)
            .col(pk_auto(Show::Id))
            .col(ColumnDef::new(Show::StartTime).date_time().not_null())
            .col(ColumnDef::new(Show::EndTime).date_time().not_null())
            .col(integer(Show::MovieId))
            .col(integer(Show::CinemaId))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_show_movie")
                    .from(Show::Table, Show::MovieId)
                    .to(Movie::Table, Movie::Id),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_show_cinema")
                    .from(Show::Table, Show::CinemaId)
                    .to(Cinema::Table, Cinema::Id),
            )
            .to_owned(),
        Table::create()
            .table(ShowRoom::Table)
            .col(pk_auto(ShowRoom::Id))
            .col(ColumnDef::new(ShowRoom::Name).string_len(255).not_null())
            .col(integer(ShowRoom::CinemaId))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_show_room_cinema")
                    .from(ShowRoom::Table, ShowRoom::CinemaId)
                    .to(Cinema::Table, Cinema::Id),
            )
            .to_owned(),
        Table::create()
            .table(Pricing::Table)
            .col(pk_auto(Pricing::Id))
            .col(integer(Pricing::ShowId))
            .col(ColumnDef::new(Pricing::SeatType).string_len(255).not_null())
            .col(
                decimal_len(Pricing::Price, 10, 2)
                    .check(Expr::cust("\"price\" >= 0 AND \"price\" = ROUND(\"price\", 2)")),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_pricing_show")
                    .from(Pricing::Table, Pricing::ShowId)
                    .to(Show::Table, Show::Id),
            )
            .to_owned(),
        Table::create()
            .table(Seat::Table)
            .col(pk_auto(Seat::Id))
            .col(integer(Seat::ShowRoomId))
            .col(integer(Seat::SeatNumber))
            .col(ColumnDef::new(Seat::SeatType).string_len(255).not_null())
            .col(bool(Seat::IsBooked).default(false))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_seat_show_room")
                    .from(Seat::Table, Seat::ShowRoomId)
                    .to(ShowRoom::Table, ShowRoom::Id),
            )
            .to_owned(),
        Table::create()
            .table(Booking::Table)
            .col(pk_auto(Booking::Id))
            .col(integer(Booking::ShowId))
            .col(integer(Booking::SeatId))
            .col(timestamp(Booking::CreatedAt).default(Expr::current_timestamp()))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_booking_show")
                    .from(Booking::Table, Booking::ShowId)
                    .to(Show::Table, Show::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_booking_seat")
                    .from(Booking::Table, Booking::SeatId)
                    .to(Seat::Table, Seat::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .on_update(ForeignKeyAction::Cascade),
            )
            .to_owned(),
    ]
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Description,
    ImageUrl,
}

#[derive(DeriveIden)]
enum Cinema {
    Table,
    Id,
    Name,
    Address,
}

#[derive(DeriveIden)]
enum Show {
    Table,
    Id,
    StartTime,
    EndTime,
    MovieId,
    CinemaId,
}

#[derive(DeriveIden)]
enum ShowRoom {
    Table,
    Id,
    Name,
    CinemaId,
}

#[derive(DeriveIden)]
enum Pricing {
    Table,
    Id,
    ShowId,
    SeatType,
    Price,
}

#[derive(DeriveIden)]
enum Seat {
    Table,
    Id,
    ShowRoomId,
    SeatNumber,
    SeatType,
    IsBooked,
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    ShowId,
    SeatId,
    CreatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{check_dependency_order, drop_statements, render, table_name};
    use sea_orm::DbBackend;

    const CREATION_ORDER: [&str; 7] = [
        "movie",
        "cinema",
        "show",
        "show_room",
        "pricing",
        "seat",
        "booking",
    ];

    fn create_sql(backend: DbBackend) -> Vec<String> {
        tables()
            .iter()
            .map(|table| render(backend, table))
            .collect()
    }

    #[test]
    fn creates_tables_in_dependency_order() {
        let names: Vec<String> = tables().iter().filter_map(table_name).collect();
        assert_eq!(names, CREATION_ORDER);
        assert!(check_dependency_order(&tables()).is_ok());
    }

    #[test]
    fn down_drops_every_created_table_in_reverse() {
        let drops: Vec<String> = drop_statements(&tables())
            .iter()
            .map(|drop| render(DbBackend::Postgres, drop))
            .collect();
        let expected: Vec<String> = CREATION_ORDER
            .iter()
            .rev()
            .map(|name| format!("DROP TABLE \"{name}\""))
            .collect();
        assert_eq!(drops, expected);
    }

    #[test]
    fn booking_cascades_on_show_and_seat() {
        let up = create_sql(DbBackend::Postgres);
        let booking = &up[6];
        assert!(booking.contains(
            "FOREIGN KEY (\"show_id\") REFERENCES \"show\" (\"id\") ON DELETE CASCADE ON UPDATE CASCADE"
        ));
        assert!(booking.contains(
            "FOREIGN KEY (\"seat_id\") REFERENCES \"seat\" (\"id\") ON DELETE CASCADE ON UPDATE CASCADE"
        ));
        assert!(booking.contains("DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn only_booking_foreign_keys_cascade() {
        for (name, sql) in CREATION_ORDER.iter().zip(create_sql(DbBackend::Sqlite)) {
            assert_eq!(
                sql.contains("CASCADE"),
                *name == "booking",
                "unexpected cascade rule on {name}"
            );
        }
    }

    #[test]
    fn price_carries_the_check_constraint() {
        for backend in [DbBackend::Postgres, DbBackend::Sqlite] {
            let sql = create_sql(backend);
            assert!(sql[4].contains("CHECK (\"price\" >= 0 AND \"price\" = ROUND(\"price\", 2))"));
        }
    }

    #[test]
    fn surrogate_keys_per_backend() {
        let postgres = create_sql(DbBackend::Postgres);
        assert!(postgres[0].contains("\"id\" serial"));
        assert!(postgres[5].contains("DEFAULT FALSE"));

        let sqlite = create_sql(DbBackend::Sqlite);
        assert!(sqlite[0].contains("AUTOINCREMENT"));
    }
}
