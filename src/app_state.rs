use crate::config::Config;
use crate::errors::AppError;
use crate::services::facebook_api::FacebookApiService;
use crate::services::object_storage::ObjectStorageService;
use crate::services::stripe_api::StripeApiService;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub timezone: Tz,
    pub stripe_api: StripeApiService,
    pub facebook_api: FacebookApiService,
    pub storage: ObjectStorageService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config) -> Result<Self, AppError> {
        let timezone = config.get_timezone().unwrap_or(chrono_tz::UTC);
        let stripe_api = StripeApiService::new(
            config.effective_stripe_api_base(),
            config.stripe_secret_key.clone(),
        );
        let facebook_api = FacebookApiService::new(
            config.effective_facebook_graph_base(),
            config.facebook_app_id.clone(),
            config.facebook_app_secret.clone(),
            config.facebook_callback_url.clone(),
        );
        let storage = ObjectStorageService::from_config(&config)?;

        Ok(Self {
            db,
            config,
            timezone,
            stripe_api,
            facebook_api,
            storage,
        })
    }
}
