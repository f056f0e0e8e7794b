pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::init_routes;
