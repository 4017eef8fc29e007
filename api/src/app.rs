//! Application factory
//!
//! Builds the actix-web application over an [`AppState`]. The factory is
//! generic over the credential store and notifier so the server and the
//! integration tests share one routing table.

use actix_web::{web, App};
use tracing_actix_web::TracingLogger;

use tw_core::repositories::{TokenRepository, UserRepository};
use tw_core::services::NotificationService;
use tw_shared::Environment;

use crate::handlers::error::{json_error_handler, not_found};
use crate::middleware::{auth::JwtAuth, security::SecurityHeaders};
use crate::routes::auth::{
    logout::{logout, logout_all},
    password_reset::{complete_reset, request_reset},
    refresh::refresh,
    AppState,
};
use crate::routes::health::health_check;

/// Create and configure the application with all dependencies
pub fn create_app<R, U, N>(
    app_state: web::Data<AppState<R, U, N>>,
    environment: Environment,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    R: TokenRepository + 'static,
    U: UserRepository + 'static,
    N: NotificationService + 'static,
{
    let jwt_auth = JwtAuth::new(app_state.codec.clone());

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(SecurityHeaders::for_environment(environment))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check::<R, U, N>))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/refresh", web::post().to(refresh::<R, U, N>))
                    .route("/logout", web::post().to(logout::<R, U, N>))
                    .service(
                        web::resource("/logout-all")
                            .route(web::post().to(logout_all::<R, U, N>))
                            .wrap(jwt_auth),
                    )
                    .route(
                        "/password-reset/request",
                        web::post().to(request_reset::<R, U, N>),
                    )
                    .route(
                        "/password-reset/complete",
                        web::post().to(complete_reset::<R, U, N>),
                    ),
            ),
        )
        .default_service(web::route().to(not_found))
}
