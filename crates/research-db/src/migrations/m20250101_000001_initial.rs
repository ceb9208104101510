use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Failures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Failures::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Failures::Title).string().not_null())
                    .col(ColumnDef::new(Failures::Pillar).string().not_null())
                    .col(ColumnDef::new(Failures::Description).text().not_null())
                    .col(ColumnDef::new(Failures::SearchHint).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QueueItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QueueItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QueueItems::FailureId).big_integer().not_null())
                    .col(ColumnDef::new(QueueItems::QueryText).text().not_null())
                    .col(ColumnDef::new(QueueItems::Language).string().not_null())
                    .col(ColumnDef::new(QueueItems::Provider).string().not_null())
                    .col(ColumnDef::new(QueueItems::Priority).integer().not_null().default(0))
                    .col(ColumnDef::new(QueueItems::Attempts).integer().not_null().default(0))
                    .col(ColumnDef::new(QueueItems::MaxAttempts).integer().not_null().default(3))
                    .col(
                        ColumnDef::new(QueueItems::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(QueueItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(QueueItems::ClaimedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .from(QueueItems::Table, QueueItems::FailureId)
                            .to(Failures::Table, Failures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Results::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Results::FailureId).big_integer().not_null())
                    .col(ColumnDef::new(Results::Title).text().not_null())
                    .col(ColumnDef::new(Results::Description).text().not_null())
                    .col(ColumnDef::new(Results::Url).text().not_null())
                    .col(ColumnDef::new(Results::ProviderType).string().not_null())
                    .col(ColumnDef::new(Results::Country).string())
                    .col(ColumnDef::new(Results::Language).string().not_null())
                    .col(ColumnDef::new(Results::Query).text())
                    .col(
                        ColumnDef::new(Results::ConfidenceScore)
                            .double()
                            .not_null()
                            .default(0.5),
                    )
                    .col(ColumnDef::new(Results::Occurrences).integer().not_null().default(1))
                    .col(ColumnDef::new(Results::OriginProvider).string().not_null())
                    .col(
                        ColumnDef::new(Results::ContentHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Results::UrlValid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Results::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Results::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Results::TitlePt).text())
                    .col(ColumnDef::new(Results::DescriptionPt).text())
                    .col(ColumnDef::new(Results::TitleEn).text())
                    .col(ColumnDef::new(Results::DescriptionEn).text())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Results::Table, Results::FailureId)
                            .to(Failures::Table, Failures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HistoryEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoryEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoryEntries::FailureId).big_integer().not_null())
                    .col(ColumnDef::new(HistoryEntries::Query).text().not_null())
                    .col(ColumnDef::new(HistoryEntries::Language).string().not_null())
                    .col(ColumnDef::new(HistoryEntries::Provider).string().not_null())
                    .col(ColumnDef::new(HistoryEntries::Status).string().not_null())
                    .col(
                        ColumnDef::new(HistoryEntries::ResultsFound)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(HistoryEntries::ErrorMessage).text())
                    .col(ColumnDef::new(HistoryEntries::ElapsedSeconds).double())
                    .col(
                        ColumnDef::new(HistoryEntries::ExecutedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HistoryEntries::Table, HistoryEntries::FailureId)
                            .to(Failures::Table, Failures::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_results_failure")
                    .table(Results::Table)
                    .col(Results::FailureId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_results_score")
                    .table(Results::Table)
                    .col(Results::ConfidenceScore)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_queue_status_priority")
                    .table(QueueItems::Table)
                    .col(QueueItems::Status)
                    .col(QueueItems::Priority)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_history_failure")
                    .table(HistoryEntries::Table)
                    .col(HistoryEntries::FailureId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(HistoryEntries::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Results::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(QueueItems::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Failures::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Failures {
    Table,
    Id,
    Title,
    Pillar,
    Description,
    SearchHint,
}

#[derive(DeriveIden)]
enum QueueItems {
    Table,
    Id,
    FailureId,
    QueryText,
    Language,
    Provider,
    Priority,
    Attempts,
    MaxAttempts,
    Status,
    CreatedAt,
    ClaimedAt,
}

#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    FailureId,
    Title,
    Description,
    Url,
    ProviderType,
    Country,
    Language,
    Query,
    ConfidenceScore,
    Occurrences,
    OriginProvider,
    ContentHash,
    UrlValid,
    CreatedAt,
    UpdatedAt,
    TitlePt,
    DescriptionPt,
    TitleEn,
    DescriptionEn,
}

#[derive(DeriveIden)]
enum HistoryEntries {
    Table,
    Id,
    FailureId,
    Query,
    Language,
    Provider,
    Status,
    ResultsFound,
    ErrorMessage,
    ElapsedSeconds,
    ExecutedAt,
}
