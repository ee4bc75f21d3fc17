use crate::core::import::is_exact_match;
use crate::domain::model::{
    Collection, CollectionId, CurrentUser, DataType, Group, ImportRecord, ParameterPage, Session,
    SharedParameter,
};
use crate::domain::ports::ParameterStore;
use crate::utils::error::{DefineryError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Clone)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    current_user: CurrentUser,
    csrf_token: String,
}

#[derive(Debug, Deserialize)]
struct ViewResponse {
    rows: Vec<SharedParameter>,
    pager: ViewPager,
}

#[derive(Debug, Deserialize)]
struct ViewPager {
    total_items: usize,
}

#[derive(Debug, Serialize)]
struct CreateParameterBody<'a> {
    name: &'a str,
    guid: Uuid,
    data_type: &'a str,
    data_category: &'a str,
    group: &'a str,
    description: &'a str,
    visible: &'a str,
    user_modifiable: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    batch_id: &'a str,
    collection: &'a CollectionId,
}

/// HTTP client for the Definery backend.
pub struct DefineryClient {
    client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
    session: Option<Session>,
}

impl DefineryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| DefineryError::InvalidConfigValueError {
            field: "server.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            credentials: None,
            session: None,
        })
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.session.as_ref().map(|s| &s.current_user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Logs in and keeps the CSRF token and credentials for later calls.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<&CurrentUser> {
        let url = self.endpoint(&["user", "login"])?;
        tracing::debug!("Logging in as {} at {}", username, url);

        let response = self
            .client
            .post(url)
            .query(&[("_format", "json")])
            .json(&serde_json::json!({ "name": username, "pass": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Login rejected with status {}", response.status());
            return Err(DefineryError::AuthenticationFailed {
                username: username.to_string(),
            });
        }

        let login: LoginResponse = response.json().await?;
        tracing::info!("Logged in as {}", login.current_user.name);
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        let session = self.session.insert(Session {
            current_user: login.current_user,
            csrf_token: login.csrf_token,
        });
        Ok(&session.current_user)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DefineryError::ConfigError {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder, operation: &str) -> Result<RequestBuilder> {
        let (Some(credentials), Some(session)) = (&self.credentials, &self.session) else {
            return Err(DefineryError::NotAuthenticated {
                operation: operation.to_string(),
            });
        };
        Ok(builder
            .query(&[("_format", "json")])
            .basic_auth(&credentials.username, Some(&credentials.password))
            .header(CSRF_HEADER, &session.csrf_token))
    }

    fn get(&self, segments: &[&str], operation: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("GET {}", url);
        self.authorized(self.client.get(url), operation)
    }

    fn post(&self, segments: &[&str], operation: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!("POST {}", url);
        self.authorized(self.client.post(url), operation)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);
        if !status.is_success() {
            return Err(remote_failure(response).await);
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        Ok(Self::send(request).await?.json().await?)
    }

    async fn fetch_page(&self, request: RequestBuilder, page_size: usize, offset: usize) -> Result<ParameterPage> {
        let request = request.query(&[("items_per_page", page_size), ("offset", offset)]);
        let view: ViewResponse = Self::send_json(request).await?;
        Ok(ParameterPage {
            records: view.rows,
            total_items: view.pager.total_items,
        })
    }
}

async fn remote_failure(response: Response) -> DefineryError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    DefineryError::RemoteFailure { status, message }
}

#[async_trait]
impl ParameterStore for DefineryClient {
    async fn fetch_by_user(&self, username: &str, page_size: usize, offset: usize) -> Result<ParameterPage> {
        let request = self.get(&["rest", "params", "user", username], "fetch_by_user")?;
        self.fetch_page(request, page_size, offset).await
    }

    async fn fetch_by_collection(
        &self,
        collection_id: &CollectionId,
        page_size: usize,
        offset: usize,
    ) -> Result<ParameterPage> {
        let request = self.get(
            &["rest", "params", "collection", collection_id.0.as_str()],
            "fetch_by_collection",
        )?;
        self.fetch_page(request, page_size, offset).await
    }

    async fn create_record(&self, record: &ImportRecord, collection_id: &CollectionId) -> Result<()> {
        let body = CreateParameterBody {
            name: &record.name,
            guid: record.guid,
            data_type: &record.data_type,
            data_category: &record.data_category,
            group: &record.group_name,
            description: &record.description,
            visible: &record.visible,
            user_modifiable: &record.user_modifiable,
            batch_id: &record.batch_id,
            collection: collection_id,
        };
        let request = self.post(&["rest", "params"], "create_record")?.json(&body);
        Self::send(request).await?;
        Ok(())
    }

    async fn find_exact_match(&self, record: &ImportRecord) -> Result<bool> {
        let request = self.get(&["rest", "params", "search"], "find_exact_match")?.query(&[
            ("name", record.name.as_str()),
            ("data_type", record.data_type.as_str()),
            ("group", record.group_name.as_str()),
        ]);
        let candidates: Vec<SharedParameter> = Self::send_json(request).await?;
        Ok(candidates.iter().any(|candidate| is_exact_match(record, candidate)))
    }

    async fn create_collection(&self, name: &str, description: &str) -> Result<()> {
        let request = self
            .post(&["rest", "collections"], "create_collection")?
            .json(&serde_json::json!({ "name": name, "description": description }));
        let response = Self::send(request).await?;
        if response.status() != StatusCode::CREATED {
            return Err(remote_failure(response).await);
        }
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Self::send_json(self.get(&["rest", "collections"], "list_collections")?).await
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        Self::send_json(self.get(&["rest", "groups"], "list_groups")?).await
    }

    async fn list_data_types(&self) -> Result<Vec<DataType>> {
        let mut data_types: Vec<DataType> =
            Self::send_json(self.get(&["rest", "datatypes"], "list_data_types")?).await?;
        data_types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(data_types)
    }

    async fn add_to_collection(&self, parameter_id: &str, collection_id: &CollectionId) -> Result<()> {
        let request = self
            .post(
                &["rest", "collections", collection_id.0.as_str(), "params"],
                "add_to_collection",
            )?
            .json(&serde_json::json!({ "parameter_id": parameter_id }));
        Self::send(request).await?;
        Ok(())
    }
}
