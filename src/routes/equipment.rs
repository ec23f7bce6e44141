use actix_web::web;

use crate::handlers::equipment;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/equipment")
            .route("", web::get().to(equipment::list_equipment))
            .route("", web::post().to(equipment::create_equipment))
            .route("/stats/summary", web::get().to(equipment::get_stats))
            .route(
                "/categories/list",
                web::get().to(equipment::list_categories),
            )
            .route("/{id}", web::get().to(equipment::get_equipment))
            .route("/{id}", web::put().to(equipment::update_equipment))
            .route("/{id}", web::delete().to(equipment::delete_equipment)),
    );
}
