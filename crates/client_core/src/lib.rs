use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Role, TaskId, UserId},
    error::{ApiError, ErrorCode},
    protocol::{
        CreateTaskRequest, EmptyPayload, RequestEnvelope, SetRoleRequest, TakeTaskRequest,
        TaskSummary, UserProfile, WithdrawRequest,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub mod view;

pub use view::{MainView, Panel, TaskCard, ViewState};

const ACK_TASK_CREATED: &str = "Задание создано!";
const ACK_TASK_TAKEN: &str = "Взято! Пришли фото в боте.";
const ACK_WITHDRAWAL_SENT: &str = "Заявка отправлена!";
const PROMPT_WITHDRAW_AMOUNT: &str = "Сумма (мин. 50 ₽):";
const PROMPT_WITHDRAW_WALLET: &str = "Qiwi кошелёк:";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host platform supplied no user identity")]
    MissingIdentity,
}

/// Seam to the surrounding mini-app container. The container supplies the
/// authenticated user identity at load and receives lifecycle/interaction
/// signals back.
pub trait HostPlatform: Send + Sync {
    /// The container's authenticated user id (`initDataUnsafe.user.id`).
    /// Queried exactly once per session bootstrap.
    fn user_id(&self) -> Result<UserId, HostError>;

    /// Readiness signal back to the container.
    fn ready(&self);

    /// Blocking acknowledgment shown to the user.
    fn alert(&self, message: &str);

    /// Freeform input collection; `None` when the user dismisses the prompt.
    fn prompt(&self, message: &str) -> Option<String>;
}

pub struct MissingHostPlatform;

impl HostPlatform for MissingHostPlatform {
    fn user_id(&self) -> Result<UserId, HostError> {
        Err(HostError::MissingIdentity)
    }

    fn ready(&self) {}

    fn alert(&self, _message: &str) {}

    fn prompt(&self, _message: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport failure calling {endpoint}: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("backend returned {status} for {endpoint}")]
    BadStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("malformed {endpoint} response: {source}")]
    MalformedResponse {
        endpoint: &'static str,
        source: serde_json::Error,
    },
}

impl GatewayError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            GatewayError::Transport { endpoint, .. }
            | GatewayError::BadStatus { endpoint, .. }
            | GatewayError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::Transport { .. } => ErrorCode::Transport,
            GatewayError::BadStatus { .. } => ErrorCode::BadStatus,
            GatewayError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
        }
    }
}

impl From<&GatewayError> for ApiError {
    fn from(err: &GatewayError) -> Self {
        ApiError::new(err.code(), err.endpoint(), err.to_string())
    }
}

/// One method per backend endpoint. Every call returns an explicit result;
/// no outcome is dropped on the floor at this layer.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, GatewayError>;
    async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), GatewayError>;
    async fn get_tasks(&self, user_id: UserId) -> Result<Vec<TaskSummary>, GatewayError>;
    async fn create_task(
        &self,
        user_id: UserId,
        request: CreateTaskRequest,
    ) -> Result<(), GatewayError>;
    async fn take_task(&self, user_id: UserId, task_id: TaskId) -> Result<(), GatewayError>;
    async fn withdraw(&self, user_id: UserId, request: WithdrawRequest)
        -> Result<(), GatewayError>;
}

/// Backend gateway over the uniform POST-JSON envelope: every endpoint is
/// `POST {backend_url}/<action>` with `{ userId, ...payload }`. Transport
/// defaults apply; there is no retry, timeout override or request ordering.
pub struct HttpBackend {
    http: Client,
    backend_url: Url,
}

impl HttpBackend {
    pub fn new(backend_url: Url) -> Self {
        Self {
            http: Client::new(),
            backend_url,
        }
    }

    pub fn from_str(backend_url: &str) -> Result<Self, url::ParseError> {
        Url::parse(backend_url).map(Self::new)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{endpoint}",
            self.backend_url.as_str().trim_end_matches('/')
        )
    }

    async fn post<T: Serialize + Sync>(
        &self,
        endpoint: &'static str,
        envelope: &RequestEnvelope<T>,
    ) -> Result<String, GatewayError> {
        debug!(endpoint, user_id = envelope.user_id.0, "backend call");
        let response = self
            .http
            .post(self.endpoint_url(endpoint))
            .json(envelope)
            .send()
            .await
            .map_err(|source| GatewayError::Transport { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::BadStatus { endpoint, status });
        }

        response
            .text()
            .await
            .map_err(|source| GatewayError::Transport { endpoint, source })
    }

    async fn post_json<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        envelope: &RequestEnvelope<T>,
    ) -> Result<R, GatewayError> {
        let body = self.post(endpoint, envelope).await?;
        serde_json::from_str(&body)
            .map_err(|source| GatewayError::MalformedResponse { endpoint, source })
    }

    /// For endpoints whose response shape is implementation-defined and
    /// ignored by the client: only the status is inspected.
    async fn post_ack<T: Serialize + Sync>(
        &self,
        endpoint: &'static str,
        envelope: &RequestEnvelope<T>,
    ) -> Result<(), GatewayError> {
        self.post(endpoint, envelope).await.map(drop)
    }
}

#[async_trait]
impl BackendGateway for HttpBackend {
    async fn get_user(&self, user_id: UserId) -> Result<UserProfile, GatewayError> {
        self.post_json("get_user", &RequestEnvelope::new(user_id, EmptyPayload {}))
            .await
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), GatewayError> {
        self.post_ack("set_role", &RequestEnvelope::new(user_id, SetRoleRequest { role }))
            .await
    }

    async fn get_tasks(&self, user_id: UserId) -> Result<Vec<TaskSummary>, GatewayError> {
        self.post_json("get_tasks", &RequestEnvelope::new(user_id, EmptyPayload {}))
            .await
    }

    async fn create_task(
        &self,
        user_id: UserId,
        request: CreateTaskRequest,
    ) -> Result<(), GatewayError> {
        self.post_ack("create_task", &RequestEnvelope::new(user_id, request))
            .await
    }

    async fn take_task(&self, user_id: UserId, task_id: TaskId) -> Result<(), GatewayError> {
        self.post_ack(
            "take_task",
            &RequestEnvelope::new(user_id, TakeTaskRequest { task_id }),
        )
        .await
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        request: WithdrawRequest,
    ) -> Result<(), GatewayError> {
        self.post_ack("withdraw", &RequestEnvelope::new(user_id, request))
            .await
    }
}

/// Immutable session identity for the lifetime of one page load.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    user_id: UserId,
}

impl Session {
    /// Reads the host identity exactly once and signals readiness. A missing
    /// identity is a hard failure with no recovery path; the host is expected
    /// to supply it synchronously at load.
    pub fn from_host(host: &dyn HostPlatform) -> Result<Self, HostError> {
        let user_id = host.user_id()?;
        host.ready();
        info!(user_id = user_id.0, "session bootstrap complete");
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// The client-side workflow: unauthenticated → role-unset → role-set. Holds
/// the session, the resolved view state and the seams to the host container
/// and the backend. All mutation happens through `&mut self` on the single
/// driving thread; concurrent in-flight requests are not coordinated.
pub struct MiniApp {
    host: Arc<dyn HostPlatform>,
    backend: Arc<dyn BackendGateway>,
    session: Session,
    state: ViewState,
}

impl MiniApp {
    pub fn bootstrap(
        host: Arc<dyn HostPlatform>,
        backend: Arc<dyn BackendGateway>,
    ) -> Result<Self, HostError> {
        let session = Session::from_host(host.as_ref())?;
        Ok(Self {
            host,
            backend,
            session,
            state: ViewState::Blank,
        })
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Role resolver: queries the backend for the current user's profile and
    /// branches on the presence of a role. A role-less profile routes to the
    /// one-shot selector; a resolved worker immediately fetches the task
    /// list. Rendering is full-replace: the previous view state is discarded.
    pub async fn resolve_user(&mut self) -> &ViewState {
        let user_id = self.session.user_id();
        self.state = match self.backend.get_user(user_id).await {
            Ok(UserProfile { role: None, .. }) => {
                info!(user_id = user_id.0, "no role on record, showing selector");
                ViewState::RoleSelect
            }
            Ok(UserProfile {
                role: Some(role),
                balance,
            }) => {
                let panel = match role {
                    Role::Employer => Panel::Employer { form_visible: false },
                    Role::Worker => match self.backend.get_tasks(user_id).await {
                        Ok(tasks) => Panel::Worker {
                            cards: view::task_cards(&tasks),
                        },
                        Err(err) => {
                            warn!(error = %err, "task list fetch failed");
                            self.state = ViewState::Failed(ApiError::from(&err));
                            return &self.state;
                        }
                    },
                };
                ViewState::Main(view::main_view(role, balance, panel))
            }
            Err(err) => {
                warn!(error = %err, "user resolution failed");
                ViewState::Failed(ApiError::from(&err))
            }
        };
        &self.state
    }

    /// One-shot role write followed by a full bootstrap re-run. The write's
    /// outcome is not inspected beyond logging: the re-run re-queries the
    /// role and re-shows the selector if the write silently failed. From the
    /// client's perspective this is an at-least-once write.
    pub async fn choose_role(&mut self, role: Role) -> &ViewState {
        if let Err(err) = self.backend.set_role(self.session.user_id(), role).await {
            warn!(role = role.as_str(), error = %err, "role write failed, reloading anyway");
        }
        self.resolve_user().await
    }

    /// Shows or hides the employer task-creation form. No effect outside the
    /// employer panel.
    pub fn toggle_task_form(&mut self) {
        if let ViewState::Main(main) = &mut self.state {
            if let Panel::Employer { form_visible } = &mut main.panel {
                *form_visible = !*form_visible;
            }
        }
    }

    /// Posts a new task from the three freeform form fields. Fields travel
    /// as typed; the backend validates price and link shape. One blocking
    /// acknowledgment either way.
    pub async fn create_task(&mut self, text: String, link: String, price: String) {
        let request = CreateTaskRequest { text, link, price };
        if let Err(err) = self
            .backend
            .create_task(self.session.user_id(), request)
            .await
        {
            warn!(error = %err, "create_task dispatch failed");
        }
        self.host.alert(ACK_TASK_CREATED);
    }

    /// Asks the backend to assign `task_id` to the current user. The task
    /// list is NOT re-fetched afterwards; it stays stale until the next
    /// bootstrap.
    pub async fn take_task(&mut self, task_id: TaskId) {
        if let Err(err) = self.backend.take_task(self.session.user_id(), task_id).await {
            warn!(task_id = task_id.0, error = %err, "take_task dispatch failed");
        }
        self.host.alert(ACK_TASK_TAKEN);
    }

    /// Collects amount and wallet via host prompts and dispatches the
    /// withdrawal only when both came back non-empty. The minimum amount in
    /// the prompt text is enforced by the backend, not here.
    pub async fn request_withdrawal(&mut self) {
        let Some(amount) = self.host.prompt(PROMPT_WITHDRAW_AMOUNT) else {
            return;
        };
        let Some(wallet) = self.host.prompt(PROMPT_WITHDRAW_WALLET) else {
            return;
        };
        if amount.is_empty() || wallet.is_empty() {
            return;
        }

        let request = WithdrawRequest { amount, wallet };
        if let Err(err) = self.backend.withdraw(self.session.user_id(), request).await {
            warn!(error = %err, "withdraw dispatch failed");
        }
        self.host.alert(ACK_WITHDRAWAL_SENT);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
