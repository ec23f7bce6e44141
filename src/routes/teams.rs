use actix_web::web;

use crate::handlers::teams;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/teams")
            .route("", web::post().to(teams::create_team))
            .route("", web::get().to(teams::list_teams))
            .route("/{id}", web::get().to(teams::get_team))
            .route("/{id}", web::put().to(teams::update_team))
            .route("/{id}", web::delete().to(teams::delete_team))
            .route("/{id}/members", web::post().to(teams::add_member))
            .route("/{id}/members", web::get().to(teams::list_members))
            .route("/{id}/members/{user_id}", web::get().to(teams::get_member))
            .route(
                "/{id}/members/{user_id}",
                web::put().to(teams::update_member),
            )
            .route(
                "/{id}/members/{user_id}",
                web::delete().to(teams::remove_member),
            ),
    )
    .service(
        web::scope("/users")
            .route("/{user_id}/teams", web::get().to(teams::get_user_teams))
            .route(
                "/{user_id}/teams/default",
                web::post().to(teams::ensure_default_team),
            ),
    );
}
