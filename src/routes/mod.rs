pub mod accounts;
pub mod chats;
pub mod context;
pub mod middleware;
pub mod moment;
pub mod pages;
pub mod payments;
pub mod posts;
pub mod profiles;
pub mod smiles;
pub mod uploads;
pub mod validation;
pub mod views;

use actix_web::web;

/// Registers every page and form handler of the site.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(pages::init_routes)
        .configure(accounts::init_routes)
        .configure(profiles::init_routes)
        .configure(chats::init_routes)
        .configure(smiles::init_routes)
        .configure(posts::init_routes)
        .configure(uploads::init_routes)
        .configure(payments::init_routes);
}
