//! Account commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use diabeto_core::workflow::auth;
use diabeto_core::{Credentials, Registration};

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Create an account and sign in
    Register(RegisterArgs),

    /// Sign in with email and password
    Login(LoginArgs),

    /// Display the signed-in account
    Whoami,

    /// Forget the saved session
    Logout,

    /// Exchange the saved refresh token for a new session
    Refresh,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name shown on the account
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "DIABETO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "DIABETO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn handle(app: &App, cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Register(args) => register(app, args).await,
        AuthSubcommand::Login(args) => login(app, args).await,
        AuthSubcommand::Whoami => whoami(app),
        AuthSubcommand::Logout => logout(app),
        AuthSubcommand::Refresh => refresh(app).await,
    }
}

async fn register(app: &App, args: RegisterArgs) -> Result<()> {
    let registration = Registration::new(args.name, args.email, args.password);

    eprintln!("{}", "Creating account...".dimmed());
    let session = auth::register(&app.context(), &registration)
        .await
        .map_err(output::alert("Registration failed"))?;

    app.save_session(&session).context("Failed to save session")?;

    output::success("Account created");
    output::field("User", session.principal.as_str());
    output::field("Email", &session.email);
    Ok(())
}

async fn login(app: &App, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(args.email, args.password);

    eprintln!("{}", "Signing in...".dimmed());
    let session = auth::sign_in(&app.context(), &credentials)
        .await
        .map_err(output::alert("Login failed"))?;

    app.save_session(&session).context("Failed to save session")?;

    output::success("Logged in successfully");
    output::field("User", session.principal.as_str());
    if let Some(name) = &session.display_name {
        output::field("Name", name);
    }
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    let session = app.require_session()?;

    output::field("User", session.principal.as_str());
    output::field("Email", &session.email);
    if let Some(name) = &session.display_name {
        output::field("Name", name);
    }
    output::field("Backend", app.backend_kind());
    output::field("Data", &app.data_dir().display().to_string());
    Ok(())
}

fn logout(app: &App) -> Result<()> {
    if app.sessions().clear()? {
        output::success("Logged out");
    } else {
        eprintln!("{}", "No active session.".dimmed());
    }
    Ok(())
}

async fn refresh(app: &App) -> Result<()> {
    let session = app.require_session()?;
    let refreshed = auth::refresh(&app.context(), &session)
        .await
        .map_err(output::alert("Refresh failed"))?;

    app.save_session(&refreshed).context("Failed to save session")?;
    output::success("Session refreshed");
    Ok(())
}
