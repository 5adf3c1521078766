use async_trait::async_trait;
use oauth2::{
    AuthType, AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl, basic::BasicClient,
    reqwest::async_http_client,
};
use tracing::{info, instrument, warn};

use super::{AccessToken, TokenIssuer};
use crate::config::AmadeusConfig;
use crate::{GetawayError, Result};

const TOKEN_PATH: &str = "/v1/security/oauth2/token";

/// OAuth2 client-credentials grant against the travel data provider
pub struct ClientCredentialsIssuer {
    client: BasicClient,
}

impl ClientCredentialsIssuer {
    pub fn new(config: &AmadeusConfig) -> Result<Self> {
        let token_url = format!("{}{TOKEN_PATH}", config.base_url.trim_end_matches('/'));

        // the grant never visits the authorization endpoint
        let auth_url = AuthUrl::new(token_url.clone())
            .map_err(|e| GetawayError::config(format!("Invalid token URL: {e}")))?;
        let token_url = TokenUrl::new(token_url)
            .map_err(|e| GetawayError::config(format!("Invalid token URL: {e}")))?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.expose().to_string())),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody);

        Ok(Self { client })
    }
}

#[async_trait]
impl TokenIssuer for ClientCredentialsIssuer {
    #[instrument(name = "acquire_token", skip(self))]
    async fn acquire_token(&self) -> Result<AccessToken> {
        let response = self
            .client
            .exchange_client_credentials()
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                warn!("Token request failed: {}", e);
                GetawayError::credential(format!("Token request failed: {e}"))
            })?;

        info!(
            "Acquired access token (expires in {:?})",
            response.expires_in()
        );
        Ok(AccessToken::new(response.access_token().secret().clone()))
    }
}
