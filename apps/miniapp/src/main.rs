mod config;

use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use client_core::{HostError, HostPlatform, HttpBackend, MiniApp, Panel, ViewState};
use shared::domain::{Role, TaskId, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// User identity, normally supplied by the container's init data.
    #[arg(long)]
    user_id: i64,
    /// Overrides the configured backend url.
    #[arg(long)]
    backend_url: Option<String>,
}

/// Stand-in for the chat-platform container: identity comes from the CLI
/// argument, alerts and prompts go over stdio.
struct StdioHost {
    user_id: UserId,
}

impl HostPlatform for StdioHost {
    fn user_id(&self) -> Result<UserId, HostError> {
        Ok(self.user_id)
    }

    fn ready(&self) {
        info!("host signalled ready");
    }

    fn alert(&self, message: &str) {
        println!("[!] {message}");
    }

    fn prompt(&self, message: &str) -> Option<String> {
        print!("{message} ");
        io::stdout().flush().ok()?;
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end().to_string()),
            Err(_) => None,
        }
    }
}

fn render(state: &ViewState) {
    match state {
        ViewState::Blank => {}
        ViewState::RoleSelect => {
            println!("-- Выбор роли --");
            println!("Команды: employer | worker | quit");
        }
        ViewState::Main(main) => {
            println!("-- {} | Баланс: {} --", main.role_label, main.balance_label);
            match &main.panel {
                Panel::Employer { form_visible } => {
                    if *form_visible {
                        println!("Форма задания открыта: команда post отправит её");
                    }
                    println!("Команды: form | post | withdraw | reload | quit");
                }
                Panel::Worker { cards } => {
                    for card in cards {
                        println!("[{}] {}", card.take_action.0, card.text);
                        println!("    Ссылка: {}", card.link);
                        println!("    {}", card.price_label);
                    }
                    println!("Команды: take <id> | withdraw | reload | quit");
                }
            }
        }
        ViewState::Failed(error) => {
            println!("Ошибка загрузки: {error}");
            println!("Команда reload повторит запрос");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = config::load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let backend_url = args.backend_url.unwrap_or(settings.backend_url);
    let backend = Arc::new(HttpBackend::new(config::parse_backend_url(&backend_url)?));
    let host = Arc::new(StdioHost {
        user_id: UserId(args.user_id),
    });

    let mut app = MiniApp::bootstrap(Arc::clone(&host) as Arc<dyn HostPlatform>, backend)?;
    app.resolve_user().await;
    render(app.state());

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            None => continue,
            Some("quit") => break,
            Some("reload") => {
                app.resolve_user().await;
            }
            Some("employer") => {
                app.choose_role(Role::Employer).await;
            }
            Some("worker") => {
                app.choose_role(Role::Worker).await;
            }
            Some("form") => app.toggle_task_form(),
            Some("post") => {
                let text = host.prompt("Текст задания:").unwrap_or_default();
                let link = host.prompt("Ссылка:").unwrap_or_default();
                let price = host.prompt("Цена:").unwrap_or_default();
                app.create_task(text, link, price).await;
            }
            Some("take") => match parts.next().and_then(|raw| raw.parse::<i64>().ok()) {
                Some(id) => app.take_task(TaskId(id)).await,
                None => println!("Использование: take <id>"),
            },
            Some("withdraw") => app.request_withdrawal().await,
            Some(other) => println!("Неизвестная команда: {other}"),
        }
        render(app.state());
    }

    Ok(())
}
