use actix_web::web;

use crate::handlers::signups;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/signups")
            .route("", web::post().to(signups::create_signup))
            .route("", web::get().to(signups::list_signups))
            .route("/count", web::get().to(signups::count_signups)),
    );
}

/// Landing-page collector, mounted outside the versioned API.
pub fn configure_collector(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/collect-email", web::post().to(signups::collect_email));
}
