//! Profile lookup against the hosted REST data API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::debug;

use neas_auth::provider::ProfileStore;
use neas_core::error::{AppError, ErrorKind};
use neas_core::result::AppResult;
use neas_core::types::UserId;
use neas_entity::user::ProfileRow;

use crate::http::{BackendHttp, read_failure, transport_error};
use crate::identity::HostedIdentityClient;

const PROFILES_PATH: &str = "/rest/v1/profiles";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Reads `profiles` joined to `roles`, authenticated as the signed-in user.
#[derive(Debug, Clone)]
pub struct HostedProfileStore {
    http: BackendHttp,
    identity: Arc<HostedIdentityClient>,
}

impl HostedProfileStore {
    /// Create a store that borrows its bearer token from `identity`.
    pub fn new(http: BackendHttp, identity: Arc<HostedIdentityClient>) -> Self {
        Self { http, identity }
    }

    fn query_path(user_id: UserId) -> String {
        format!(
            "{PROFILES_PATH}?select={}&id=eq.{user_id}",
            urlencoding::encode("username,roles(role_name)")
        )
    }
}

#[async_trait]
impl ProfileStore for HostedProfileStore {
    async fn find_profile(&self, user_id: UserId) -> AppResult<ProfileRow> {
        let token = self.identity.access_token();
        let response = self
            .http
            .request(Method::GET, &Self::query_path(user_id), token.as_deref())
            .header("accept", SINGLE_OBJECT)
            .send()
            .await
            .map_err(|e| transport_error("Profile query failed", e))?;

        match response.status() {
            status if status.is_success() => {
                debug!(user_id = %user_id, "Profile row fetched");
                response
                    .json::<ProfileRow>()
                    .await
                    .map_err(|e| transport_error("Invalid profile payload", e))
            }
            // Single-object requests return 406 when zero rows match.
            StatusCode::NOT_ACCEPTABLE => {
                Err(AppError::not_found(format!("No profile for user {user_id}")))
            }
            _ => {
                let (status, message) = read_failure(response).await;
                let kind = if status == StatusCode::UNAUTHORIZED {
                    ErrorKind::Authentication
                } else {
                    ErrorKind::ExternalService
                };
                Err(AppError::new(kind, message))
            }
        }
    }
}
