use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建课表（由外部课表目录维护，本服务只做存在性查询）
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Schedules::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Schedules::CourseName).string().not_null())
                    .col(ColumnDef::new(Schedules::Day).string().not_null())
                    .col(ColumnDef::new(Schedules::StartTime).string().not_null())
                    .col(ColumnDef::new(Schedules::EndTime).string().not_null())
                    .col(ColumnDef::new(Schedules::Room).string().null())
                    .col(ColumnDef::new(Schedules::ClassName).string().null())
                    .col(
                        ColumnDef::new(Schedules::Semester)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建考勤记录表
        manager
            .create_table(
                Table::create()
                    .table(Attendances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attendances::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Attendances::ScheduleId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attendances::AssistantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attendances::Kind).string().not_null())
                    .col(ColumnDef::new(Attendances::Status).string().not_null())
                    .col(ColumnDef::new(Attendances::PresenceProof).string().null())
                    .col(ColumnDef::new(Attendances::AbsenceProof).string().null())
                    .col(ColumnDef::new(Attendances::SessionNotes).text().null())
                    .col(
                        ColumnDef::new(Attendances::RecordedAt)
                            .big_integer()
                            .not_null(),
                    )
                    // 删除课表不能绕过汇总重算，因此禁止级联
                    .foreign_key(
                        ForeignKey::create()
                            .from(Attendances::Table, Attendances::ScheduleId)
                            .to(Schedules::Table, Schedules::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建汇总表（每个助教一行）
        manager
            .create_table(
                Table::create()
                    .table(Rekaps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rekaps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Rekaps::AssistantId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Rekaps::CountPresent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rekaps::CountExcused)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rekaps::CountAbsent)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rekaps::CountSubstitute)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Rekaps::HonorTier).string().null())
                    .col(
                        ColumnDef::new(Rekaps::RatePerSession)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rekaps::TotalHonor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Rekaps::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建申诉表
        manager
            .create_table(
                Table::create()
                    .table(Disputes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Disputes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Disputes::RekapId).big_integer().not_null())
                    .col(ColumnDef::new(Disputes::Content).text().not_null())
                    .col(ColumnDef::new(Disputes::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Disputes::Table, Disputes::RekapId)
                            .to(Rekaps::Table, Rekaps::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        // 考勤表索引（按助教重放、按课表筛选）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendances_assistant_id")
                    .table(Attendances::Table)
                    .col(Attendances::AssistantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendances_schedule_id")
                    .table(Attendances::Table)
                    .col(Attendances::ScheduleId)
                    .to_owned(),
            )
            .await?;

        // 申诉表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_disputes_rekap_id")
                    .table(Disputes::Table)
                    .col(Disputes::RekapId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Disputes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rekaps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attendances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Schedules {
    #[sea_orm(iden = "schedules")]
    Table,
    Id,
    CourseName,
    Day,
    StartTime,
    EndTime,
    Room,
    ClassName,
    Semester,
}

#[derive(DeriveIden)]
enum Attendances {
    #[sea_orm(iden = "attendances")]
    Table,
    Id,
    ScheduleId,
    AssistantId,
    Kind,
    Status,
    PresenceProof,
    AbsenceProof,
    SessionNotes,
    RecordedAt,
}

#[derive(DeriveIden)]
enum Rekaps {
    #[sea_orm(iden = "rekaps")]
    Table,
    Id,
    AssistantId,
    CountPresent,
    CountExcused,
    CountAbsent,
    CountSubstitute,
    HonorTier,
    RatePerSession,
    TotalHonor,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Disputes {
    #[sea_orm(iden = "disputes")]
    Table,
    Id,
    RekapId,
    Content,
    CreatedAt,
}
