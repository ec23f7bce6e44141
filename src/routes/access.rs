use actix_web::web;

use crate::handlers::access;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/access")
            .route("", web::get().to(access::get_access))
            .route("/check", web::post().to(access::check_access)),
    );
}
