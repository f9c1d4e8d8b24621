use serde::{Deserialize, Serialize};

use crate::domain::{Role, TaskId, UserId};

/// Uniform POST-JSON envelope for every backend call: `{ "userId": ..,
/// ..payload fields.. }`. The backend trusts the embedded `userId`; there is
/// no separate auth token.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope<T: Serialize> {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> RequestEnvelope<T> {
    pub fn new(user_id: UserId, payload: T) -> Self {
        Self { user_id, payload }
    }
}

/// Payload for endpoints that carry nothing beyond the envelope's `userId`
/// (`get_user`, `get_tasks`).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Serialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// `text`, `link` and `price` are forwarded exactly as typed; the backend is
/// the enforcement point for numeric price and URL shape.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTaskRequest {
    pub text: String,
    pub link: String,
    pub price: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TakeTaskRequest {
    #[serde(rename = "taskId")]
    pub task_id: TaskId,
}

/// `amount` travels as the raw prompt input; the minimum threshold is
/// enforced by the backend only.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawRequest {
    pub amount: String,
    pub wallet: String,
}

/// `get_user` response. A null `role` means the user has not picked one yet
/// and must be routed through the role selector.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub role: Option<Role>,
    pub balance: f64,
}

/// One entry of the `get_tasks` response. Read-only on the client; held only
/// transiently for rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    pub id: TaskId,
    pub text: String,
    pub link: String,
    pub price: f64,
}
