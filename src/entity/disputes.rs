//! 申诉实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "disputes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub rekap_id: i64,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rekaps::Entity",
        from = "Column::RekapId",
        to = "super::rekaps::Column::Id"
    )]
    Rekap,
}

impl Related<super::rekaps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rekap.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_dispute(self) -> crate::models::disputes::entities::Dispute {
        use crate::models::disputes::entities::Dispute;
        use chrono::{DateTime, Utc};

        Dispute {
            id: self.id,
            rekap_id: self.rekap_id,
            content: self.content,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}
