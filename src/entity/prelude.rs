//! 预导入模块，方便使用

pub use super::attendances::{
    ActiveModel as AttendanceActiveModel, Entity as Attendances, Model as AttendanceModel,
};
pub use super::disputes::{
    ActiveModel as DisputeActiveModel, Entity as Disputes, Model as DisputeModel,
};
pub use super::rekaps::{ActiveModel as RekapActiveModel, Entity as Rekaps, Model as RekapModel};
pub use super::schedules::{
    ActiveModel as ScheduleActiveModel, Entity as Schedules, Model as ScheduleModel,
};
