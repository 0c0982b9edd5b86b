use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LanguagePairs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LanguagePairs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LanguagePairs::SourceLanguageId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LanguagePairs::TargetLanguageId)
                            .integer()
                            .not_null(),
                    )
                    // JSON array of article/gender strings
                    .col(
                        ColumnDef::new(LanguagePairs::GenderOptions)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Nouns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Nouns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Nouns::Word).string().not_null())
                    .col(ColumnDef::new(Nouns::Gender).string().null())
                    .col(ColumnDef::new(Nouns::LanguageId).integer().not_null())
                    .col(ColumnDef::new(Nouns::CategoryId).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_nouns_language_id")
                    .table(Nouns::Table)
                    .col(Nouns::LanguageId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NounTranslations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NounTranslations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NounTranslations::NounId).integer().not_null())
                    .col(
                        ColumnDef::new(NounTranslations::LanguageId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(NounTranslations::Text).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noun_translations_noun")
                            .from(NounTranslations::Table, NounTranslations::NounId)
                            .to(Nouns::Table, Nouns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NounListItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NounListItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(NounListItems::ListId).integer().not_null())
                    .col(ColumnDef::new(NounListItems::NounId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_noun_list_items_noun")
                            .from(NounListItems::Table, NounListItems::NounId)
                            .to(Nouns::Table, Nouns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LessonNouns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonNouns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LessonNouns::LessonId).integer().not_null())
                    .col(ColumnDef::new(LessonNouns::NounId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_nouns_noun")
                            .from(LessonNouns::Table, LessonNouns::NounId)
                            .to(Nouns::Table, Nouns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Verbs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Verbs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Verbs::Infinitive).string().not_null())
                    .col(ColumnDef::new(Verbs::Translation).string().null())
                    .col(ColumnDef::new(Verbs::LanguageId).integer().not_null())
                    .col(ColumnDef::new(Verbs::FrequencyRank).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verbs_frequency_rank")
                    .table(Verbs::Table)
                    .col(Verbs::LanguageId)
                    .col(Verbs::FrequencyRank)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VerbListItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerbListItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerbListItems::ListId).integer().not_null())
                    .col(ColumnDef::new(VerbListItems::VerbId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_verb_list_items_verb")
                            .from(VerbListItems::Table, VerbListItems::VerbId)
                            .to(Verbs::Table, Verbs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tenses::Name).string().not_null())
                    .col(ColumnDef::new(Tenses::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(Tenses::LanguageId).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Pronouns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pronouns::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pronouns::OrderIndex).integer().not_null())
                    .col(ColumnDef::new(Pronouns::Display).string().null())
                    .col(ColumnDef::new(Pronouns::Code).string().null())
                    .col(ColumnDef::new(Pronouns::LanguageId).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conjugations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conjugations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conjugations::VerbId).integer().not_null())
                    .col(ColumnDef::new(Conjugations::TenseId).integer().not_null())
                    .col(ColumnDef::new(Conjugations::PronounId).integer().not_null())
                    .col(ColumnDef::new(Conjugations::Form).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conjugations_verb")
                            .from(Conjugations::Table, Conjugations::VerbId)
                            .to(Verbs::Table, Verbs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One form per verb, tense and person
        manager
            .create_index(
                Index::create()
                    .name("idx_conjugations_key")
                    .table(Conjugations::Table)
                    .col(Conjugations::VerbId)
                    .col(Conjugations::TenseId)
                    .col(Conjugations::PronounId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Conjugations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pronouns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VerbListItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Verbs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LessonNouns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NounListItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NounTranslations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Nouns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LanguagePairs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LanguagePairs {
    Table,
    Id,
    SourceLanguageId,
    TargetLanguageId,
    GenderOptions,
}

#[derive(DeriveIden)]
enum Nouns {
    Table,
    Id,
    Word,
    Gender,
    LanguageId,
    CategoryId,
}

#[derive(DeriveIden)]
enum NounTranslations {
    Table,
    Id,
    NounId,
    LanguageId,
    Text,
}

#[derive(DeriveIden)]
enum NounListItems {
    Table,
    Id,
    ListId,
    NounId,
}

#[derive(DeriveIden)]
enum LessonNouns {
    Table,
    Id,
    LessonId,
    NounId,
}

#[derive(DeriveIden)]
enum Verbs {
    Table,
    Id,
    Infinitive,
    Translation,
    LanguageId,
    FrequencyRank,
}

#[derive(DeriveIden)]
enum VerbListItems {
    Table,
    Id,
    ListId,
    VerbId,
}

#[derive(DeriveIden)]
enum Tenses {
    Table,
    Id,
    Name,
    OrderIndex,
    LanguageId,
}

#[derive(DeriveIden)]
enum Pronouns {
    Table,
    Id,
    OrderIndex,
    Display,
    Code,
    LanguageId,
}

#[derive(DeriveIden)]
enum Conjugations {
    Table,
    Id,
    VerbId,
    TenseId,
    PronounId,
    Form,
}
