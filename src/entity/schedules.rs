//! 课表实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_name: String,
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub room: Option<String>,
    pub class_name: Option<String>,
    pub semester: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendances::Entity")]
    Attendances,
}

impl Related<super::attendances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_schedule(self) -> crate::models::schedules::entities::Schedule {
        use crate::models::schedules::entities::Schedule;

        Schedule {
            id: self.id,
            course_name: self.course_name,
            day: self.day,
            start_time: self.start_time,
            end_time: self.end_time,
            room: self.room,
            class_name: self.class_name,
            semester: self.semester,
        }
    }
}
