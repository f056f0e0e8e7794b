pub mod handlers;
pub mod structures;

pub use handlers::{about, contact, contact_us, home, init_routes};
