//! View models for the two role-based panels. Building a view is a pure
//! function of backend data, so re-rendering with the same inputs yields the
//! same state (full replace, no incremental patching).

use shared::{
    domain::{Role, TaskId},
    error::ApiError,
    protocol::TaskSummary,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Before the first resolve: neither the selector nor the main view.
    Blank,
    /// No role on record; the one-shot selector is shown, main view hidden.
    RoleSelect,
    Main(MainView),
    /// Resolver failure surfaced as a visible error instead of a frozen page.
    Failed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainView {
    pub role: Role,
    pub role_label: &'static str,
    /// Balance formatted to exactly two decimal places.
    pub balance_label: String,
    pub panel: Panel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Employer { form_visible: bool },
    Worker { cards: Vec<TaskCard> },
}

/// One rendered task entry; `take_action` carries the id the take button
/// submits.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCard {
    pub take_action: TaskId,
    pub text: String,
    pub link: String,
    pub price_label: String,
}

/// Display label as an explicit function of the resolved role.
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::Employer => "Работодатель",
        Role::Worker => "Исполнитель",
    }
}

pub fn format_balance(balance: f64) -> String {
    format!("{balance:.2}")
}

pub fn main_view(role: Role, balance: f64, panel: Panel) -> MainView {
    MainView {
        role,
        role_label: role_label(role),
        balance_label: format_balance(balance),
        panel,
    }
}

pub fn task_cards(tasks: &[TaskSummary]) -> Vec<TaskCard> {
    tasks
        .iter()
        .map(|task| TaskCard {
            take_action: task.id,
            text: task.text.clone(),
            link: task.link.clone(),
            price_label: format!("Цена: {} ₽", task.price),
        })
        .collect()
}
