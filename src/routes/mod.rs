use actix_web::web;

pub mod access;
pub mod auth;
pub mod equipment;
pub mod signups;
pub mod teams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(auth::configure)
            .configure(access::configure)
            .configure(teams::configure)
            .configure(equipment::configure)
            .configure(signups::configure),
    )
    .configure(signups::configure_collector);
}
