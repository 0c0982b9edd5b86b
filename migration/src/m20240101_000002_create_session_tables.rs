use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GameSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameSessions::Status).string().not_null())
                    .col(ColumnDef::new(GameSessions::MaxPlayers).integer().not_null())
                    .col(ColumnDef::new(GameSessions::Difficulty).string().not_null())
                    .col(
                        ColumnDef::new(GameSessions::LanguagePairId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameSessions::CreatorId).string().not_null())
                    // Serialized GameMode, tagged by "mode"
                    .col(ColumnDef::new(GameSessions::Mode).text().not_null())
                    .col(ColumnDef::new(GameSessions::Seed).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameSessions::Generation)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GameSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GameSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Lobby listing filters on status and pair
        manager
            .create_index(
                Index::create()
                    .name("idx_game_sessions_status")
                    .table(GameSessions::Table)
                    .col(GameSessions::Status)
                    .col(GameSessions::LanguagePairId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GamePlayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GamePlayers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GamePlayers::SessionId).string().not_null())
                    .col(ColumnDef::new(GamePlayers::PlayerId).string().not_null())
                    .col(ColumnDef::new(GamePlayers::UserId).string().null())
                    .col(ColumnDef::new(GamePlayers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(GamePlayers::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GamePlayers::IsReady)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GamePlayers::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GamePlayers::Moves)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GamePlayers::TimeMs).big_integer().null())
                    .col(
                        ColumnDef::new(GamePlayers::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_session")
                            .from(GamePlayers::Table, GamePlayers::SessionId)
                            .to(GameSessions::Table, GameSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A user holds at most one seat per session
        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_session_player")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::SessionId)
                    .col(GamePlayers::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GamePlayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GameSessions {
    Table,
    Id,
    Status,
    MaxPlayers,
    Difficulty,
    LanguagePairId,
    CreatorId,
    Mode,
    Seed,
    Generation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GamePlayers {
    Table,
    Id,
    SessionId,
    PlayerId,
    UserId,
    DisplayName,
    Score,
    IsReady,
    Progress,
    Moves,
    TimeMs,
    JoinedAt,
}
