//! Initial schema migration.
//!
//! Creates the complete schema:
//!
//! - `users`: accounts, with the ledger version used for optimistic saves
//! - `entries`: one row per ledger entry, ordered by `position`
//! - `transactions`: add/remove adjustments, keyed by `(entry_id, id)`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
    LedgerVersion,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    UserId,
    Position,
    Value,
    OpeningValue,
    Date,
    NextTransactionId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    EntryId,
    Id,
    Kind,
    Label,
    Cost,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::LedgerVersion)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Entries
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entries::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Entries::UserId).string().not_null())
                    .col(ColumnDef::new(Entries::Position).big_integer().not_null())
                    .col(ColumnDef::new(Entries::Value).big_integer().not_null())
                    .col(
                        ColumnDef::new(Entries::OpeningValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::Date).date().not_null())
                    .col(
                        ColumnDef::new(Entries::NextTransactionId)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-user_id")
                            .from(Entries::Table, Entries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-user_id-position")
                    .table(Entries::Table)
                    .col(Entries::UserId)
                    .col(Entries::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::EntryId).string().not_null())
                    .col(ColumnDef::new(Transactions::Id).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Label).string().not_null())
                    .col(ColumnDef::new(Transactions::Cost).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Transactions::EntryId)
                            .col(Transactions::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-entry_id")
                            .from(Transactions::Table, Transactions::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
