use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActiveQueries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActiveQueries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActiveQueries::Word).string().not_null())
                    .col(
                        ColumnDef::new(ActiveQueries::BatchRequestCustomId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActiveQueries::BatchRequestId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActiveQueries::UploadedFileId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActiveQueries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ActiveQueries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ActiveQueries::Status)
                            .string()
                            .not_null()
                            .default("awaiting_response"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_active_queries_batch_request_id")
                    .table(ActiveQueries::Table)
                    .col(ActiveQueries::BatchRequestId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_active_queries_status")
                    .table(ActiveQueries::Table)
                    .col(ActiveQueries::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompletedQueries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompletedQueries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CompletedQueries::Word).string().not_null())
                    .col(
                        ColumnDef::new(CompletedQueries::BatchRequestCustomId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompletedQueries::BatchRequestId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompletedQueries::UploadedFileId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompletedQueries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompletedQueries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompletedQueries::Status).string().not_null())
                    .col(
                        ColumnDef::new(CompletedQueries::CompletedAt)
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
                    .name("idx_completed_queries_batch_request_id")
                    .table(CompletedQueries::Table)
                    .col(CompletedQueries::BatchRequestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CompletedQueries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActiveQueries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActiveQueries {
    Table,
    Id,
    Word,
    BatchRequestCustomId,
    BatchRequestId,
    UploadedFileId,
    CreatedAt,
    UpdatedAt,
    Status,
}

#[derive(DeriveIden)]
enum CompletedQueries {
    Table,
    Id,
    Word,
    BatchRequestCustomId,
    BatchRequestId,
    UploadedFileId,
    CreatedAt,
    UpdatedAt,
    Status,
    CompletedAt,
}
