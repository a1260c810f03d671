/// 组装带完整中间件与内存存储的测试应用
#[cfg(test)]
macro_rules! test_app {
    ($storage:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(
                    actix_web::web::JsonConfig::default()
                        .error_handler(crate::utils::json_error_handler),
                )
                .app_data(
                    actix_web::web::QueryConfig::default()
                        .error_handler(crate::utils::query_error_handler),
                )
                .app_data(actix_web::web::Data::new($storage))
                .app_data(actix_web::web::Data::new(crate::utils::JwtVerifier::new(
                    crate::utils::jwt::test_support::TEST_SECRET,
                )))
                .configure(crate::routes::configure_attendance_routes)
                .configure(crate::routes::configure_rekap_routes)
                .configure(crate::routes::configure_dispute_routes),
        )
        .await
    };
}

pub mod attendances;

pub mod rekaps;

pub mod disputes;

pub use attendances::configure_attendance_routes;
pub use disputes::configure_dispute_routes;
pub use rekaps::configure_rekap_routes;
