use crate::errors::AppError;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

const DIALOG_URL: &str = "https://www.facebook.com/v19.0/dialog/oauth";

#[derive(Clone)]
pub struct FacebookApiService {
    client: Client,
    graph_base: String,
    app_id: String,
    app_secret: String,
    callback_url: String,
}

impl FacebookApiService {
    pub fn new(graph_base: String, app_id: String, app_secret: String, callback_url: String) -> Self {
        Self {
            client: Client::new(),
            graph_base,
            app_id,
            app_secret,
            callback_url,
        }
    }

    async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, AppError> {
        let url = format!("{}{}", self.graph_base, path);
        let response = self.client.get(&url).query(query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error reading response body".to_string());
            log::error!("Facebook API error on path {}: {} - {}", path, status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Facebook request failed with status {}",
                status
            )));
        }

        Ok(response.json::<R>().await?)
    }

    /// Login dialog the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> Result<String, AppError> {
        let mut url = Url::parse(DIALOG_URL).map_err(|_| AppError::Internal)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.app_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("state", state)
            .append_pair("scope", "email");
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AccessToken, AppError> {
        self.get(
            "/oauth/access_token",
            &[
                ("client_id", self.app_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("client_secret", self.app_secret.as_str()),
                ("code", code),
            ],
        )
        .await
    }

    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<FacebookProfile, AppError> {
        self.get(
            "/me",
            &[
                ("fields", "id,name,email"),
                ("access_token", token.access_token.as_str()),
            ],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookProfile {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

impl FacebookProfile {
    pub fn picture_url(&self) -> String {
        format!("https://graph.facebook.com/{}/picture?type=large", self.id)
    }

    /// Accounts without a shared email still need a unique address.
    pub fn email_or_placeholder(&self) -> String {
        self.email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| format!("{}@facebook.invalid", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> FacebookApiService {
        FacebookApiService::new(
            "https://graph.facebook.com/v19.0".to_string(),
            "1234".to_string(),
            "shh".to_string(),
            "http://localhost:3000/auth/facebook/callback".to_string(),
        )
    }

    #[test]
    fn authorize_url_carries_client_state_and_scope() {
        let url = Url::parse(&service().authorize_url("abc").unwrap()).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "1234".to_string())));
        assert!(pairs.contains(&("state".to_string(), "abc".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "email".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "http://localhost:3000/auth/facebook/callback".to_string()
        )));
    }

    #[test]
    fn profile_without_email_gets_placeholder() {
        let profile = FacebookProfile {
            id: "42".to_string(),
            name: "Jo".to_string(),
            email: None,
        };
        assert_eq!(profile.email_or_placeholder(), "42@facebook.invalid");
        assert_eq!(
            profile.picture_url(),
            "https://graph.facebook.com/42/picture?type=large"
        );
    }
}
