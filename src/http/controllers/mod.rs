use actix_web::web;

pub mod posts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/create/", web::get().to(posts::create_form))
        .route("/create/", web::post().to(posts::create))
        .service(
            web::scope("/posts")
                .route("/{id}/", web::get().to(posts::detail))
                .route("/{id}/edit/", web::get().to(posts::edit_form))
                .route("/{id}/edit/", web::post().to(posts::edit)),
        );
}
