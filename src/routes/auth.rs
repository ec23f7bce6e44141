use actix_web::web;

use crate::handlers::auth;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::get().to(auth::login))
            .route("/logout", web::get().to(auth::logout))
            .route("/me", web::get().to(auth::me))
            .route(
                "/me/onboarding",
                web::post().to(auth::complete_onboarding),
            ),
    );
}
