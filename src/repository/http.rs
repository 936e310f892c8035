//! REST client for the catalog API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use uuid::Uuid;

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult, ErrorDetail},
    models::{
        Author, AuthorDraft, Book, BookDraft, Cabinet, CabinetDraft, Entity, Page, PageRequest,
        Pagination, Shelf, ShelfDraft, Tag, TagDraft,
    },
    repository::PagedCollection,
};

/// How a draft is put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftEncoding {
    Json,
    Form,
}

/// A catalog resource exposed under `/{PATH}/`
pub trait Resource: Entity<Id = Uuid> + DeserializeOwned {
    /// Path segment, also the key of the list in list responses
    const PATH: &'static str;

    type Draft: Send + Sync + 'static;

    fn encode(draft: &Self::Draft) -> AppResult<DraftBody>;
}

/// Encoded request body of a create/update call
#[derive(Debug, Clone, PartialEq)]
pub enum DraftBody {
    Json(Value),
    Form(Vec<(&'static str, String)>),
}

impl DraftBody {
    pub fn encoding(&self) -> DraftEncoding {
        match self {
            DraftBody::Json(_) => DraftEncoding::Json,
            DraftBody::Form(_) => DraftEncoding::Form,
        }
    }

    fn json<T: Serialize>(draft: &T) -> AppResult<Self> {
        Ok(DraftBody::Json(serde_json::to_value(draft)?))
    }
}

impl Resource for Author {
    const PATH: &'static str = "authors";
    type Draft = AuthorDraft;

    fn encode(draft: &AuthorDraft) -> AppResult<DraftBody> {
        DraftBody::json(draft)
    }
}

impl Resource for Book {
    const PATH: &'static str = "books";
    type Draft = BookDraft;

    fn encode(draft: &BookDraft) -> AppResult<DraftBody> {
        Ok(DraftBody::Form(draft.form_fields()))
    }
}

impl Resource for Shelf {
    const PATH: &'static str = "shelves";
    type Draft = ShelfDraft;

    fn encode(draft: &ShelfDraft) -> AppResult<DraftBody> {
        DraftBody::json(draft)
    }
}

impl Resource for Cabinet {
    const PATH: &'static str = "cabinets";
    type Draft = CabinetDraft;

    fn encode(draft: &CabinetDraft) -> AppResult<DraftBody> {
        DraftBody::json(draft)
    }
}

impl Resource for Tag {
    const PATH: &'static str = "tags";
    type Draft = TagDraft;

    fn encode(draft: &TagDraft) -> AppResult<DraftBody> {
        DraftBody::json(draft)
    }
}

/// Shared HTTP client holding the API base URL
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_body(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<ErrorDetail>,
}

/// Maps a non-2xx response to an error, keeping the server's `detail`
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail);
    match (status, detail) {
        (StatusCode::NOT_FOUND, Some(ErrorDetail::Message(msg))) => AppError::NotFound(msg),
        (StatusCode::NOT_FOUND, _) => AppError::NotFound("resource not found".to_string()),
        (_, Some(detail)) => AppError::Rejected {
            status: status.as_u16(),
            detail,
        },
        (_, None) => AppError::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        },
    }
}

/// List response: `{ "<resource>": [...], "pagination": {...} }`
#[derive(Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    pagination: Pagination,
    #[serde(flatten)]
    rest: HashMap<String, Value>,
}

pub(crate) fn decode_list<R: Resource>(body: Value) -> AppResult<Page<R>> {
    let mut envelope: ListEnvelope = serde_json::from_value(body)?;
    let items = match envelope.rest.remove(R::PATH) {
        Some(list) => serde_json::from_value(list)?,
        None => Vec::new(),
    };
    Ok(Page {
        items,
        pagination: envelope.pagination,
    })
}

/// `/all` responses come either as a bare array or wrapped under the resource key
pub(crate) fn decode_all<R: Resource>(body: Value) -> AppResult<Vec<R>> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(mut map) => match map.remove(R::PATH) {
            Some(list) => Ok(serde_json::from_value(list)?),
            None => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn list_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", request.page.to_string()),
        ("per_page", request.per_page.to_string()),
    ];
    if let Some(q) = &request.search {
        query.push(("q", q.clone()));
    }
    query
}

/// One REST resource as a [`PagedCollection`]
pub struct HttpCollection<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpCollection<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn with_draft(builder: RequestBuilder, draft: &R::Draft) -> AppResult<RequestBuilder> {
        Ok(match R::encode(draft)? {
            DraftBody::Json(value) => builder.json(&value),
            DraftBody::Form(fields) => builder.form(&fields),
        })
    }
}

#[async_trait]
impl<R: Resource> PagedCollection for HttpCollection<R> {
    type Id = Uuid;
    type Entity = R;
    type Draft = R::Draft;

    async fn list_page(&self, request: PageRequest) -> AppResult<Page<R>> {
        let builder = self
            .client
            .request(Method::GET, &format!("/{}/", R::PATH))
            .query(&list_query(&request));
        let body: Value = self.client.send(builder).await?.json().await?;
        decode_list(body)
    }

    async fn get(&self, id: &Uuid) -> AppResult<Option<R>> {
        match self.client.get_json(&format!("/{}/{}", R::PATH, id)).await {
            Ok(entity) => Ok(Some(entity)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create(&self, draft: R::Draft) -> AppResult<R> {
        let builder = self
            .client
            .request(Method::POST, &format!("/{}/", R::PATH));
        let response = self.client.send(Self::with_draft(builder, &draft)?).await?;
        Ok(response.json().await?)
    }

    async fn update(&self, id: &Uuid, draft: R::Draft) -> AppResult<R> {
        let builder = self
            .client
            .request(Method::PATCH, &format!("/{}/{}", R::PATH, id));
        let response = self.client.send(Self::with_draft(builder, &draft)?).await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, id: &Uuid) -> AppResult<()> {
        let builder = self
            .client
            .request(Method::DELETE, &format!("/{}/{}", R::PATH, id));
        self.client.send(builder).await?;
        Ok(())
    }

    async fn list_all(&self) -> AppResult<Vec<R>> {
        let body: Value = self.client.get_json(&format!("/{}/all", R::PATH)).await?;
        decode_all(body)
    }
}
