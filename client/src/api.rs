use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{AuthResponse, Created, EntityId, LoginRequest, MessageResponse, RegisterRequest};
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::list::ResourceBackend;
use crate::resource::{ListQuery, Resource};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    Bearer,
}

/// HTTP access to the backend. The bearer credential is read from the
/// session when a request is built, so a request in flight keeps the token
/// it left with.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, url: Url, auth: Auth) -> RequestBuilder {
        debug!(%method, %url, "Dispatching request");
        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");
        match (auth, self.session.current_token()) {
            (Auth::Bearer, Some(token)) => {
                builder.header("Authorization", format!("Bearer {token}"))
            }
            _ => builder,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::from_response(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let response = Self::check(builder.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn read_nothing(builder: RequestBuilder) -> Result<()> {
        Self::check(builder.send().await?).await?;
        Ok(())
    }

    fn item_url<R: Resource>(&self, id: EntityId) -> Result<Url> {
        self.config.endpoint(&format!("{}/{id}", R::PATH))
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let url = self.config.endpoint("auth/register")?;
        let builder = self.request(Method::POST, url, Auth::Anonymous).json(request);
        let response: AuthResponse = Self::read_json(builder).await?;
        info!(username = %request.username, user_id = response.user_id, "Api register");
        Ok(response)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let url = self.config.endpoint("auth/login")?;
        let builder = self.request(Method::POST, url, Auth::Anonymous).json(request);
        let response: AuthResponse = Self::read_json(builder).await?;
        info!(username = %request.username, user_id = response.user_id, "Api login");
        Ok(response)
    }

    pub async fn logout(&self) -> Result<MessageResponse> {
        let url = self.config.endpoint("auth/logout")?;
        Self::read_json(self.request(Method::POST, url, Auth::Bearer)).await
    }

    pub async fn fetch_list<R: Resource>(&self, filter: &R::Filter) -> Result<Vec<R>> {
        let mut url = self.config.endpoint(R::PATH)?;
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }
        let items: Vec<R> = Self::read_json(self.request(Method::GET, url, Auth::Bearer)).await?;
        debug!(resource = R::NAME, ?filter, count = items.len(), "Api list");
        Ok(items)
    }

    /// `Ok(None)` when the backend does not know the id.
    pub async fn fetch_one<R: Resource>(&self, id: EntityId) -> Result<Option<R>> {
        let url = self.item_url::<R>(id)?;
        match Self::read_json(self.request(Method::GET, url, Auth::Bearer)).await {
            Ok(item) => Ok(Some(item)),
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Only the new id is decoded; the list reload brings the full entity.
    pub async fn create_item<R: Resource>(&self, input: &R::New) -> Result<Created> {
        let url = self.config.endpoint(R::PATH)?;
        let builder = self.request(Method::POST, url, Auth::Bearer).json(input);
        let created: Created = Self::read_json(builder).await?;
        info!(resource = R::NAME, id = created.id, "Api create");
        Ok(created)
    }

    pub async fn update_item<R: Resource>(&self, id: EntityId, patch: &R::Update) -> Result<()> {
        let url = self.item_url::<R>(id)?;
        Self::read_nothing(self.request(Method::PUT, url, Auth::Bearer).json(patch)).await?;
        info!(resource = R::NAME, id, "Api update");
        Ok(())
    }

    pub async fn delete_item<R: Resource>(&self, id: EntityId) -> Result<()> {
        let url = self.item_url::<R>(id)?;
        Self::read_nothing(self.request(Method::DELETE, url, Auth::Bearer)).await?;
        info!(resource = R::NAME, id, "Api delete");
        Ok(())
    }
}

#[async_trait]
impl<R: Resource> ResourceBackend<R> for ApiClient {
    async fn list(&self, filter: &R::Filter) -> Result<Vec<R>> {
        self.fetch_list::<R>(filter).await
    }

    async fn create(&self, input: &R::New) -> Result<Created> {
        self.create_item::<R>(input).await
    }

    async fn update(&self, id: EntityId, patch: &R::Update) -> Result<()> {
        self.update_item::<R>(id, patch).await
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        self.delete_item::<R>(id).await
    }
}
