use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::attendances::requests::{
    AmendAttendanceRequest, AttendanceListQuery, CreateAttendanceRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AttendanceService;
use crate::utils::SafeAttendanceIdI64;

// 懒加载的全局 ATTENDANCE_SERVICE 实例
static ATTENDANCE_SERVICE: Lazy<AttendanceService> = Lazy::new(AttendanceService::new_lazy);

// HTTP处理程序
pub async fn create_attendance(
    req: HttpRequest,
    attendance_data: web::Json<CreateAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .create_attendance(&req, attendance_data.into_inner())
        .await
}

pub async fn list_attendances(
    req: HttpRequest,
    query: web::Query<AttendanceListQuery>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .list_attendances(&req, query.into_inner())
        .await
}

pub async fn get_attendance(
    req: HttpRequest,
    attendance_id: SafeAttendanceIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE.get_attendance(&req, attendance_id.0).await
}

pub async fn update_attendance(
    req: HttpRequest,
    attendance_id: SafeAttendanceIdI64,
    update_data: web::Json<AmendAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .update_attendance(&req, attendance_id.0, update_data.into_inner())
        .await
}

pub async fn delete_attendance(
    req: HttpRequest,
    attendance_id: SafeAttendanceIdI64,
) -> ActixResult<HttpResponse> {
    ATTENDANCE_SERVICE
        .delete_attendance(&req, attendance_id.0)
        .await
}

// 配置路由
pub fn configure_attendance_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/attendances")
            .wrap(middlewares::RequireJWT)
            .service(
                // 助教查看自己的考勤，管理员可查看全部
                web::resource("").route(web::get().to(list_attendances)).route(
                    web::post()
                        .to(create_attendance)
                        .wrap(middlewares::RateLimit::attendance_submit())
                        // 只有助教本人可以提交考勤
                        .wrap(middlewares::RequireRole::new_any(UserRole::assistant_roles())),
                ),
            )
            .service(
                web::resource("/{attendance_id}")
                    .route(web::get().to(get_attendance))
                    .route(
                        web::patch()
                            .to(update_attendance)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_attendance)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
