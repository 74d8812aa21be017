//! Engagement HTTP server.
//!
//! Exposes the proposal lifecycle over a small JSON API. Images travel
//! as base64 payloads inside the JSON bodies; there is no multipart
//! handling.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{
    ApiConfig, AttendanceEntry, Comment, CommentSubject, DocumentationEntry, ExecutionRecord,
    ExecutionStatus, Proposal, ProposalStatus, VoteKind,
};
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ImageUpload, Page, ProposalFilter,
    ProposalRepository,
};
use crate::services::engagement::{
    AttendanceInput, AttendanceReport, CommentView, DocumentationView, EngagementService,
    ExecutionView, NewComment, NewDocumentation, NewProposal, ProposalChanges, ProposalDetail,
    ProposalPage, VoteView,
};

/// Configuration for the engagement HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to enable CORS.
    pub enable_cors: bool,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8085,
            enable_cors: true,
        }
    }
}

impl From<&ApiConfig> for HttpServerConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
        }
    }
}

/// An image carried inside a JSON body.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl ImagePayload {
    fn decode(self) -> Result<ImageUpload, ApiError> {
        let bytes = STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| bad_request(format!("Invalid base64 image data: {e}")))?;
        Ok(ImageUpload::new(bytes, self.file_name, self.content_type))
    }
}

/// Request to submit a proposal.
#[derive(Debug, Deserialize)]
pub struct SubmitProposalRequest {
    pub title: String,
    pub plan: String,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    pub proposer_name: String,
    pub proposer_email: String,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Request to edit a proposal.
#[derive(Debug, Deserialize)]
pub struct UpdateProposalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

/// Request to vote on a proposal.
#[derive(Debug, Deserialize)]
pub struct ProposalVoteRequest {
    pub voter_email: String,
    pub kind: String,
}

/// Request to vote on a comment.
#[derive(Debug, Deserialize)]
pub struct CommentVoteRequest {
    pub voter_id: Uuid,
    pub kind: String,
}

/// Request to add a comment.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub member_id: Option<Uuid>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Request to record an execution outcome.
#[derive(Debug, Deserialize)]
pub struct ExecutionStatusRequest {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// One roster line in an attendance request.
#[derive(Debug, Deserialize)]
pub struct AttendanceLine {
    pub member_id: Uuid,
    #[serde(default = "default_attended")]
    pub attended: bool,
    #[serde(default)]
    pub note: Option<String>,
}

fn default_attended() -> bool {
    true
}

/// Request to replace an attendance roster.
#[derive(Debug, Deserialize)]
pub struct SetAttendanceRequest {
    pub roster: Vec<AttendanceLine>,
}

/// Request to add a documentation entry.
#[derive(Debug, Deserialize)]
pub struct AddDocumentationRequest {
    pub title: String,
    pub description: String,
    pub uploader_name: String,
    pub uploader_email: String,
    #[serde(default)]
    pub photo: Option<ImagePayload>,
}

/// Query parameters for proposal listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProposalQueryParams {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub proposer: Option<String>,
    #[serde(default)]
    pub starts_after: Option<NaiveDate>,
    #[serde(default)]
    pub ends_before: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Query parameters for the proposal detail view.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQueryParams {
    #[serde(default)]
    pub viewer: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Query parameters for comment threads.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadQueryParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn default_page() -> u32 {
    1
}

/// A comment thread page.
#[derive(Debug, Serialize)]
pub struct CommentThreadResponse {
    pub comments: Vec<CommentView>,
    /// All comments on the subject, replies included.
    pub total: i64,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            code: "BAD_REQUEST".to_string(),
        }),
    )
}

/// Map a domain error onto a status code and a stable error code.
fn domain_error(e: &DomainError) -> ApiError {
    let (status, code) = match e {
        DomainError::ProposalNotFound(_)
        | DomainError::CommentNotFound(_)
        | DomainError::ExecutionNotFound(_)
        | DomainError::NoExecutionForProposal(_)
        | DomainError::DocumentationNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        DomainError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
        DomainError::ConstraintViolation(_) => (StatusCode::CONFLICT, "CONFLICT"),
        DomainError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
        DomainError::Collaborator { .. } => (StatusCode::BAD_GATEWAY, "COLLABORATOR_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            code: code.to_string(),
        }),
    )
}

fn parse_vote_kind(kind: &str) -> Result<VoteKind, ApiError> {
    VoteKind::from_str(kind).ok_or_else(|| bad_request(format!("Unknown vote kind: {kind}")))
}

/// Shared state for the engagement HTTP server.
struct AppState<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    service: Arc<EngagementService<P, V, C, E>>,
}

/// Engagement HTTP server.
pub struct ApiServer<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    config: HttpServerConfig,
    service: Arc<EngagementService<P, V, C, E>>,
}

impl<P, V, C, E> ApiServer<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    pub fn new(service: Arc<EngagementService<P, V, C, E>>, config: HttpServerConfig) -> Self {
        Self { config, service }
    }

    /// Build the router.
    fn build_router(self) -> Router {
        let state = Arc::new(AppState {
            service: self.service,
        });

        let app = Router::new()
            // Proposals
            .route("/api/v1/proposals", get(list_proposals::<P, V, C, E>))
            .route("/api/v1/proposals", post(submit_proposal::<P, V, C, E>))
            .route("/api/v1/proposals/{id}", get(get_proposal::<P, V, C, E>))
            .route("/api/v1/proposals/{id}", put(update_proposal::<P, V, C, E>))
            // Lifecycle
            .route("/api/v1/proposals/{id}/vote", post(vote_on_proposal::<P, V, C, E>))
            .route("/api/v1/proposals/{id}/advance", post(advance_proposal::<P, V, C, E>))
            .route("/api/v1/proposals/{id}/execution", get(execution_for_proposal::<P, V, C, E>))
            // Comment threads
            .route("/api/v1/proposals/{id}/comments", get(proposal_comments::<P, V, C, E>))
            .route("/api/v1/proposals/{id}/comments", post(comment_on_proposal::<P, V, C, E>))
            .route("/api/v1/executions/{id}/comments", get(execution_comments::<P, V, C, E>))
            .route("/api/v1/executions/{id}/comments", post(comment_on_execution::<P, V, C, E>))
            .route("/api/v1/comments/{id}/vote", post(vote_on_comment::<P, V, C, E>))
            // Executions
            .route("/api/v1/executions/{id}", get(get_execution::<P, V, C, E>))
            .route("/api/v1/executions/{id}/status", post(set_execution_status::<P, V, C, E>))
            .route("/api/v1/executions/{id}/attendance", put(set_attendance::<P, V, C, E>))
            .route("/api/v1/executions/{id}/attendance", get(get_attendance::<P, V, C, E>))
            .route("/api/v1/executions/{id}/documentation", post(add_documentation::<P, V, C, E>))
            .route("/api/v1/executions/{id}/documentation", get(list_documentation::<P, V, C, E>))
            .route("/api/v1/documentation/{id}", delete(remove_documentation::<P, V, C, E>))
            // Health check
            .route("/health", get(health_check))
            .with_state(state);

        if self.config.enable_cors {
            app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
                .layer(TraceLayer::new_for_http())
        } else {
            app.layer(TraceLayer::new_for_http())
        }
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("Engagement HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.build_router();

        tracing::info!("Engagement HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_check() -> &'static str {
    "OK"
}

async fn list_proposals<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Query(params): Query<ProposalQueryParams>,
) -> Result<Json<ProposalPage>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let status = match &params.status {
        Some(s) => Some(
            ProposalStatus::from_str(s)
                .ok_or_else(|| bad_request(format!("Unknown proposal status: {s}")))?,
        ),
        None => None,
    };

    let filter = ProposalFilter {
        status,
        keyword: params.keyword,
        starts_after: params.starts_after,
        ends_before: params.ends_before,
        proposer_email: params.proposer,
    };
    let size = params
        .page_size
        .unwrap_or(state.service.config().proposal_page_size);
    let page = Page::new(params.page, size);

    state
        .service
        .list_proposals(filter, page)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn submit_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Json(req): Json<SubmitProposalRequest>,
) -> Result<(StatusCode, Json<Proposal>), ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let image = req.image.map(ImagePayload::decode).transpose()?;

    let input = NewProposal {
        title: req.title,
        plan: req.plan,
        starts_on: req.starts_on,
        ends_on: req.ends_on,
        proposer_name: req.proposer_name,
        proposer_email: req.proposer_email,
        image,
    };

    state
        .service
        .create_proposal(input)
        .await
        .map(|proposal| (StatusCode::CREATED, Json(proposal)))
        .map_err(|e| domain_error(&e))
}

async fn get_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Query(params): Query<DetailQueryParams>,
) -> Result<Json<ProposalDetail>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let size = params
        .page_size
        .unwrap_or(state.service.config().comment_page_size);
    let page = Page::new(params.page, size);

    state
        .service
        .proposal_detail(id, params.viewer.as_deref(), page)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn update_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProposalRequest>,
) -> Result<Json<Proposal>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let image = req.image.map(ImagePayload::decode).transpose()?;

    let changes = ProposalChanges {
        title: req.title,
        plan: req.plan,
        starts_on: req.starts_on,
        ends_on: req.ends_on,
        image,
    };

    state
        .service
        .update_proposal(id, changes)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn vote_on_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProposalVoteRequest>,
) -> Result<Json<VoteView>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let kind = parse_vote_kind(&req.kind)?;

    state
        .service
        .vote_on_proposal(id, &req.voter_email, kind)
        .await
        .map(|receipt| Json(VoteView::from(receipt)))
        .map_err(|e| domain_error(&e))
}

async fn advance_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecutionRecord>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .move_to_execution(id)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn execution_for_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecutionRecord>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .execution_for_proposal(id)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn proposal_comments<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ThreadQueryParams>,
) -> Result<Json<CommentThreadResponse>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    comment_thread(&state, CommentSubject::Proposal(id), &params).await
}

async fn execution_comments<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Query(params): Query<ThreadQueryParams>,
) -> Result<Json<CommentThreadResponse>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    comment_thread(&state, CommentSubject::Execution(id), &params).await
}

async fn comment_thread<P, V, C, E>(
    state: &AppState<P, V, C, E>,
    subject: CommentSubject,
    params: &ThreadQueryParams,
) -> Result<Json<CommentThreadResponse>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .ensure_subject_exists(subject)
        .await
        .map_err(|e| domain_error(&e))?;

    let size = params
        .page_size
        .unwrap_or(state.service.config().comment_page_size);
    let page = Page::new(params.page, size);

    let comments = state
        .service
        .comment_thread(subject, page)
        .await
        .map_err(|e| domain_error(&e))?;
    let total = state
        .service
        .comment_count(subject)
        .await
        .map_err(|e| domain_error(&e))?;

    Ok(Json(CommentThreadResponse { comments, total }))
}

async fn comment_on_proposal<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    add_comment(&state, CommentSubject::Proposal(id), req).await
}

async fn comment_on_execution<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    add_comment(&state, CommentSubject::Execution(id), req).await
}

async fn add_comment<P, V, C, E>(
    state: &AppState<P, V, C, E>,
    subject: CommentSubject,
    req: AddCommentRequest,
) -> Result<(StatusCode, Json<Comment>), ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let input = NewComment {
        body: req.body,
        author_name: req.author_name,
        member_id: req.member_id,
        parent_id: req.parent_id,
    };

    state
        .service
        .add_comment(subject, input)
        .await
        .map(|comment| (StatusCode::CREATED, Json(comment)))
        .map_err(|e| domain_error(&e))
}

async fn vote_on_comment<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentVoteRequest>,
) -> Result<Json<VoteView>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let kind = parse_vote_kind(&req.kind)?;

    state
        .service
        .vote_on_comment(id, req.voter_id, kind)
        .await
        .map(|receipt| Json(VoteView::from(receipt)))
        .map_err(|e| domain_error(&e))
}

async fn get_execution<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExecutionView>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .execution_view(id)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn set_execution_status<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ExecutionStatusRequest>,
) -> Result<Json<ExecutionRecord>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let status = ExecutionStatus::from_str(&req.status)
        .ok_or_else(|| bad_request(format!("Unknown execution status: {}", req.status)))?;

    state
        .service
        .update_execution_status(id, status, req.note)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn set_attendance<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetAttendanceRequest>,
) -> Result<Json<AttendanceReport>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let roster: Vec<AttendanceInput> = req
        .roster
        .into_iter()
        .map(|line| AttendanceInput {
            member_id: line.member_id,
            attended: line.attended,
            note: line.note,
        })
        .collect();

    state
        .service
        .save_attendance(id, &roster)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn get_attendance<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceEntry>>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .attendance(id)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn add_documentation<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddDocumentationRequest>,
) -> Result<(StatusCode, Json<DocumentationEntry>), ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    let photo = req.photo.map(ImagePayload::decode).transpose()?;

    let input = NewDocumentation {
        title: req.title,
        description: req.description,
        uploader_name: req.uploader_name,
        uploader_email: req.uploader_email,
        photo,
    };

    state
        .service
        .add_documentation(id, input)
        .await
        .map(|entry| (StatusCode::CREATED, Json(entry)))
        .map_err(|e| domain_error(&e))
}

async fn list_documentation<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DocumentationView>>, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .documentation(id)
        .await
        .map(Json)
        .map_err(|e| domain_error(&e))
}

async fn remove_documentation<P, V, C, E>(
    State(state): State<Arc<AppState<P, V, C, E>>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    state
        .service
        .remove_documentation(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| domain_error(&e))
}
