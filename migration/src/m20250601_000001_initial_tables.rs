//! Initial schema migration
//!
//! Creates the four core tables:
//! - users: account records
//! - links: shortening records (soft-delete only)
//! - short_codes: one-to-many codes per link, globally unique
//! - clicks: insert-only attribution events

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).text().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(Links::OriginalUrl).text().not_null())
                    .col(ColumnDef::new(Links::Title).string_len(255).null())
                    .col(ColumnDef::new(Links::Description).text().null())
                    .col(
                        ColumnDef::new(Links::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Links::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Links::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_user_id")
                    .table(Links::Table)
                    .col(Links::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ShortCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortCodes::Code)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortCodes::LinkId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ShortCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_codes_link_id")
                    .table(ShortCodes::Table)
                    .col(ShortCodes::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clicks::LinkId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Clicks::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clicks::UserAgent).text().null())
                    .col(ColumnDef::new(Clicks::DeviceType).string_len(32).null())
                    .col(ColumnDef::new(Clicks::DeviceName).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Browser).string_len(64).null())
                    .col(ColumnDef::new(Clicks::Os).string_len(64).null())
                    .col(ColumnDef::new(Clicks::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Clicks::Country).string_len(2).null())
                    .col(ColumnDef::new(Clicks::Region).string_len(100).null())
                    .col(ColumnDef::new(Clicks::City).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Source).string_len(100).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_link_id")
                    .table(Clicks::Table)
                    .col(Clicks::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_link_time")
                    .table(Clicks::Table)
                    .col(Clicks::LinkId)
                    .col(Clicks::ClickedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_link_time").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_clicks_link_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_short_codes_link_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShortCodes::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_links_user_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Links {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    UserId,
    OriginalUrl,
    Title,
    Description,
    IsActive,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ShortCodes {
    #[sea_orm(iden = "short_codes")]
    Table,
    Code,
    LinkId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Clicks {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    LinkId,
    ClickedAt,
    UserAgent,
    DeviceType,
    DeviceName,
    Browser,
    Os,
    IpAddress,
    Country,
    Region,
    City,
    Source,
}
