pub mod facebook_api;
pub mod object_storage;
pub mod passwords;
pub mod sessions;
pub mod stripe_api;
