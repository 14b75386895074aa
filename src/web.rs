//! REST surface.
//!
//! A thin axum adapter over the query, loader and resolver contracts. List
//! endpoints accept `<field>.<operator>=<value>` criteria plus `page`,
//! `size`, `sort`, `distinct` and `eagerload`, and answer with the page
//! content as a JSON array, an `X-Total-Count` header and a `Link` header.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::{HeaderName, LINK};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::QueryLimits;
use crate::criteria::CriteriaSet;
use crate::entity::{DeviceUsageIndication, FeatureFlag, Flag, Gene, Transcript, User};
use crate::error::{CurationError, FilterError};
use crate::loader::{EagerLoader, WithRelations};
use crate::page::{Order, Page};
use crate::query::{log_store_error, QueryService};
use crate::resolver::Resolver;
use crate::schema::Record;
use crate::storage::{Database, HasStore};

const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

const PAGE_PARAM: &str = "page";
const SIZE_PARAM: &str = "size";
const SORT_PARAM: &str = "sort";
const EAGERLOAD_PARAM: &str = "eagerload";

/// Shared state behind every handler.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub limits: QueryLimits,
}

impl AppState {
    #[must_use]
    pub fn new(db: Database, limits: QueryLimits) -> Self {
        Self { db, limits }
    }
}

/// Error response rendered as a JSON problem document.
#[derive(Debug)]
pub struct ApiError(CurationError);

impl<E: Into<CurationError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct Problem {
    status: u16,
    title: &'static str,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_client_error() {
            debug!(error = %self.0, "request rejected");
        } else {
            warn!(error = %self.0, "request failed");
        }
        let problem = Problem {
            status: status.as_u16(),
            title: self.0.title(),
            detail: self.0.to_string(),
        };
        (status, Json(problem)).into_response()
    }
}

/// List parameters split into criteria and paging controls.
struct ListParams {
    criteria: Vec<(String, String)>,
    page: Option<usize>,
    size: Option<usize>,
    sort: Vec<Order>,
    eagerload: bool,
}

impl ListParams {
    fn parse<E: Record>(params: Vec<(String, String)>) -> Result<Self, FilterError> {
        let mut out = Self {
            criteria: Vec::new(),
            page: None,
            size: None,
            sort: Vec::new(),
            eagerload: false,
        };
        for (key, value) in params {
            match key.as_str() {
                PAGE_PARAM => out.page = Some(parse_usize(PAGE_PARAM, &value)?),
                SIZE_PARAM => out.size = Some(parse_usize(SIZE_PARAM, &value)?),
                SORT_PARAM => out.sort.push(Order::parse(E::SCHEMA, &value)?),
                EAGERLOAD_PARAM => {
                    out.eagerload = match value.trim().to_ascii_lowercase().as_str() {
                        "true" => true,
                        "false" => false,
                        _ => {
                            return Err(FilterError::MalformedParameter {
                                parameter: format!("{EAGERLOAD_PARAM}={value}"),
                                reason: "expected true or false".to_string(),
                            })
                        }
                    }
                }
                _ => out.criteria.push((key, value)),
            }
        }
        Ok(out)
    }
}

fn parse_usize(name: &str, raw: &str) -> Result<usize, FilterError> {
    raw.trim()
        .parse()
        .map_err(|_| FilterError::MalformedParameter {
            parameter: format!("{name}={raw}"),
            reason: "expected a non-negative integer".to_string(),
        })
}

/// The raw query string without `page` and `size`, for `Link` targets.
fn carried_query(query: Option<&str>) -> String {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|part| {
            let key = part.split('=').next().unwrap_or_default();
            !part.is_empty() && key != PAGE_PARAM && key != SIZE_PARAM
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn paged_response<T: Serialize>(page: Page<T>, uri: &Uri) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));
    let link = page.link_header(uri.path(), &carried_query(uri.query()));
    if let Ok(value) = HeaderValue::from_str(&link) {
        headers.insert(LINK, value);
    }
    (headers, Json(page.content)).into_response()
}

async fn list<E>(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError>
where
    E: Record,
    Database: HasStore<E>,
{
    debug!(entity = %E::SCHEMA.entity, query = uri.query().unwrap_or_default(), "REST request to list");
    let ListParams {
        criteria,
        page,
        size,
        sort,
        eagerload,
    } = ListParams::parse::<E>(params)?;
    let criteria = CriteriaSet::from_query_pairs(E::SCHEMA, criteria)?;
    let request = state.limits.page_request(page, size, sort)?;
    let store = <Database as HasStore<E>>::store(&state.db);

    if !eagerload {
        let page = QueryService::new(store).find_by_criteria(&criteria, &request)?;
        return Ok(paged_response(page, &uri));
    }

    let loader = EagerLoader::new(store, &state.db);
    let page: Page<WithRelations<E>> = if criteria.is_empty() && request.sort().is_empty() {
        loader.find_all_paged(true, &request)?
    } else {
        let page = QueryService::new(store).find_by_criteria(&criteria, &request)?;
        let total = page.total_elements;
        Page::new(loader.attach(page.content)?, &request, total)
    };
    Ok(paged_response(page, &uri))
}

async fn count<E>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<u64>, ApiError>
where
    E: Record,
    Database: HasStore<E>,
{
    debug!(entity = %E::SCHEMA.entity, "REST request to count");
    let criteria = CriteriaSet::from_query_pairs(E::SCHEMA, params)?;
    let store = <Database as HasStore<E>>::store(&state.db);
    Ok(Json(QueryService::new(store).count_by_criteria(&criteria)?))
}

async fn get_one<E>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<WithRelations<E>>, ApiError>
where
    E: Record,
    Database: HasStore<E>,
{
    debug!(entity = %E::SCHEMA.entity, id, "REST request to get");
    let store = <Database as HasStore<E>>::store(&state.db);
    EagerLoader::new(store, &state.db)
        .find_one_eager(id)?
        .map(Json)
        .ok_or_else(|| ApiError::from(CurationError::not_found(E::SCHEMA.entity.name(), id)))
}

async fn find_gene(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<Gene>, ApiError> {
    debug!(token = %token, "REST request to find gene");
    Resolver::<Gene>::new(&state.db.genes)
        .resolve(&token)
        .map_err(log_store_error)?
        .map(Json)
        .ok_or_else(|| ApiError::from(CurationError::not_found("Gene", token)))
}

async fn find_genes(
    State(state): State<Arc<AppState>>,
    Json(tokens): Json<Option<Vec<String>>>,
) -> Result<Json<Vec<Gene>>, ApiError> {
    let tokens = tokens.unwrap_or_default();
    debug!(count = tokens.len(), "REST request to find genes");
    let genes = Resolver::<Gene>::new(&state.db.genes)
        .resolve_all(tokens.as_slice())
        .map_err(log_store_error)?;
    Ok(Json(genes))
}

async fn device_usage_indications_by_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<DeviceUsageIndication>>, ApiError> {
    debug!(fda_submission_id = id, "REST request to list device usage indications");
    let found = state
        .db
        .find_by_fda_submission_id(id)
        .map_err(log_store_error)?;
    Ok(Json(found))
}

fn collection<E>(router: Router<Arc<AppState>>, path: &str) -> Router<Arc<AppState>>
where
    E: Record,
    Database: HasStore<E>,
{
    router
        .route(&format!("/api/{path}"), get(list::<E>))
        .route(&format!("/api/{path}/count"), get(count::<E>))
        .route(&format!("/api/{path}/{{id}}"), get(get_one::<E>))
}

/// Build the HTTP API router over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/api/find-gene", post(find_genes))
        .route("/api/find-gene/{token}", get(find_gene))
        .route(
            "/api/fda-submissions/{id}/device-usage-indications",
            get(device_usage_indications_by_submission),
        );
    let router = collection::<Gene>(router, "genes");
    let router = collection::<Transcript>(router, "transcripts");
    let router = collection::<Flag>(router, "flags");
    let router = collection::<FeatureFlag>(router, "feature-flags");
    let router = collection::<User>(router, "users");
    let router = collection::<DeviceUsageIndication>(router, "device-usage-indications");
    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carried_query_drops_paging() {
        assert_eq!(
            carried_query(Some("page=2&name.contains=a&size=5&sort=id,desc")),
            "name.contains=a&sort=id,desc"
        );
        assert_eq!(carried_query(None), "");
        assert_eq!(carried_query(Some("page=1")), "");
    }

    #[test]
    fn test_list_params_split() {
        let params = vec![
            ("page".to_string(), "1".to_string()),
            ("size".to_string(), "5".to_string()),
            ("sort".to_string(), "name,desc".to_string()),
            ("eagerload".to_string(), "true".to_string()),
            ("name.contains".to_string(), "onc".to_string()),
            ("distinct".to_string(), "true".to_string()),
        ];
        let parsed = ListParams::parse::<Flag>(params).unwrap();
        assert_eq!(parsed.page, Some(1));
        assert_eq!(parsed.size, Some(5));
        assert_eq!(parsed.sort, vec![Order::desc("name")]);
        assert!(parsed.eagerload);
        assert_eq!(parsed.criteria.len(), 2);
    }

    #[test]
    fn test_list_params_reject_bad_page() {
        let params = vec![("page".to_string(), "-1".to_string())];
        assert!(matches!(
            ListParams::parse::<Flag>(params),
            Err(FilterError::MalformedParameter { .. })
        ));
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::from(CurationError::not_found("Gene", "KRAS")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = ApiError::from(FilterError::InvalidPage {
            reason: "size".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_poisoned_store_is_500_problem() {
        let db = Database::new();
        db.genes.poison();
        let state = Arc::new(AppState::new(db, QueryLimits::default()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });

        for path in ["genes?hugoSymbol.equals=BRAF", "genes/count", "genes/1", "find-gene/BRAF"] {
            let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/{path}"))
                .await
                .unwrap();
            assert_eq!(resp.status(), 500, "path {path}");
            let body: serde_json::Value = resp.json().await.unwrap();
            assert_eq!(body["status"], 500);
            assert_eq!(body["title"], "Internal Server Error");
        }

        // Batch resolution propagates the failure instead of dropping tokens.
        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/find-gene"))
            .json(&["BRAF"])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 500);

        // Other tables keep serving.
        let resp = reqwest::get(format!("http://127.0.0.1:{port}/api/flags")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }
}
