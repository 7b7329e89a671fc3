use crate::auth::{LoginForm, RegisterForm};
use crate::cli::{Cli, Commands, PontoAction, TableAction};
use crate::config::ClientConfig;
use crate::errors::ClientResult;
use crate::ponto::PontoManager;
use crate::reset::{PasswordResetForm, ResetField};
use crate::state::AppState;
use crate::tables::TableManager;
use crate::typewriter::Typewriter;
use crate::ui::Surface;
use std::{sync::Arc, time::Duration};
use tracing::warn;

/// Applies command-line overrides on top of the environment configuration.
pub fn resolve_config(cli: &Cli) -> ClientConfig {
    let mut config = ClientConfig::load();
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.as_str());
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    if let Some(path) = &cli.session {
        config.session_path = path.clone();
    }
    if let Some(dir) = &cli.download_dir {
        config.download_dir = dir.clone();
    }
    config
}

pub async fn run(cli: Cli, surface: Arc<dyn Surface>) -> ClientResult<()> {
    let config = resolve_config(&cli);
    let state = AppState::from_config(&config, surface).await;
    dispatch(cli.command, state).await
}

pub async fn dispatch(command: Commands, state: AppState) -> ClientResult<()> {
    match command {
        Commands::Login { username, password } => {
            let mut form = LoginForm::new(state);
            form.fields.username = username;
            form.fields.senha = password;
            form.submit().await.map(|_| ())
        }
        Commands::Register {
            username,
            email,
            password,
            confirm,
        } => {
            let mut form = RegisterForm::new(state);
            form.fields.username = username;
            form.fields.email = email;
            form.fields.senha = password;
            form.fields.confirmar_senha = confirm;
            form.submit().await
        }
        Commands::Logout => {
            match state.session.sign_out().await? {
                Some(user) => state.surface.alert(&format!("Logged out {user}.")),
                None => state.surface.alert("No user is logged in."),
            }
            Ok(())
        }
        Commands::Whoami => {
            match state.session.current_user().await {
                Some(user) => state.surface.alert(&user),
                None => state.surface.alert("No user is logged in."),
            }
            Ok(())
        }
        Commands::Tables { action } => tables(action, state).await,
        Commands::Ponto { action } => ponto(action, state).await,
        Commands::ResetPassword {
            email,
            new_password,
            confirm,
            phrase,
        } => {
            let surface = state.surface.clone();
            let mut form = PasswordResetForm::new(state);
            form.input(ResetField::Email, &email);
            form.set_new_password(&new_password);
            form.input(ResetField::ConfirmPassword, &confirm);
            form.input(ResetField::SecurityPhrase, &phrase);
            let result = form.submit().await;
            for field in form.visible_errors() {
                surface.alert(field.message());
            }
            result
        }
        Commands::Quote => {
            let surface = state.surface.clone();
            tokio::select! {
                _ = Typewriter::random().run(surface.as_ref()) => {}
                _ = tokio::signal::ctrl_c() => warn!("quote interrupted"),
            }
            println!();
            Ok(())
        }
    }
}

async fn tables(action: TableAction, state: AppState) -> ClientResult<()> {
    let surface = state.surface.clone();
    let mut manager = TableManager::new(state);
    match action {
        TableAction::List => {
            manager.refresh().await;
            Ok(())
        }
        TableAction::Create { name, kind } => {
            manager.open();
            manager.name = name;
            manager.kind = Some(kind);
            manager.create().await
        }
        TableAction::Delete { name } => manager.delete(&name).await,
        TableAction::Export { name } => {
            let path = manager.export(&name).await?;
            surface.alert(&format!("Saved {}", path.display()));
            Ok(())
        }
        TableAction::Items { name } => {
            manager.open_table(&name).await?;
            Ok(())
        }
        TableAction::AddItem { name, fields } => {
            manager.open_table(&name).await?;
            manager.add_item(fields.into()).await
        }
        TableAction::DeleteItem { name, id } => {
            manager.open_table(&name).await?;
            manager.delete_item(&id).await
        }
    }
}

async fn ponto(action: PontoAction, state: AppState) -> ClientResult<()> {
    let surface = state.surface.clone();
    let mut manager = PontoManager::new(state);
    match action {
        PontoAction::Register {
            date,
            arrival,
            departure,
        } => {
            manager.open().await?;
            if let Some(date) = date {
                manager.form.data = date;
            }
            manager.form.entrada = arrival;
            manager.form.saida = departure.unwrap_or_default();
            manager.submit().await
        }
        PontoAction::Export => {
            let path = manager.export().await?;
            surface.alert(&format!("Saved {}", path.display()));
            Ok(())
        }
    }
}
