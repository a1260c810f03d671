//! 汇总实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rekaps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub assistant_id: i64,
    pub count_present: i64,
    pub count_excused: i64,
    pub count_absent: i64,
    pub count_substitute: i64,
    pub honor_tier: Option<String>,
    pub rate_per_session: i64,
    pub total_honor: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::disputes::Entity")]
    Disputes,
}

impl Related<super::disputes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Disputes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_rekap(self) -> crate::errors::Result<crate::models::rekaps::entities::Rekap> {
        use crate::models::rekaps::entities::{HonorTier, Rekap};
        use crate::errors::RekapError;
        use chrono::{DateTime, Utc};

        let honor_tier = self
            .honor_tier
            .as_deref()
            .map(str::parse::<HonorTier>)
            .transpose()
            .map_err(|e| {
                RekapError::database_operation(format!("汇总 {} 数据损坏: {}", self.id, e.message()))
            })?;

        Ok(Rekap {
            id: self.id,
            assistant_id: self.assistant_id,
            count_present: self.count_present,
            count_excused: self.count_excused,
            count_absent: self.count_absent,
            count_substitute: self.count_substitute,
            honor_tier,
            rate_per_session: self.rate_per_session,
            total_honor: self.total_honor,
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rekaps::entities::HonorTier;

    fn row(honor_tier: Option<&str>) -> Model {
        Model {
            id: 1,
            assistant_id: 9,
            count_present: 2,
            count_excused: 0,
            count_absent: 1,
            count_substitute: 1,
            honor_tier: honor_tier.map(str::to_string),
            rate_per_session: 14_500,
            total_honor: 43_500,
            updated_at: 0,
        }
    }

    #[test]
    fn test_into_rekap() {
        let rekap = row(Some("B")).into_rekap().unwrap();
        assert_eq!(rekap.honor_tier, Some(HonorTier::B));
        assert_eq!(rekap.total_honor, 43_500);
        assert!(row(None).into_rekap().unwrap().honor_tier.is_none());
    }

    #[test]
    fn test_corrupted_tier_is_storage_error() {
        let err = row(Some("Z")).into_rekap().unwrap_err();
        assert!(err.message().contains("数据损坏"));
    }
}
