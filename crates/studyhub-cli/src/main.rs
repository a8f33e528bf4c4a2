//! StudyHub CLI — command-line client for the StudyHub backend.
//!
//! Set STUDYHUB_API_URL (or API_URL) to point at the backend. Credentials are
//! kept in the state directory after `studyhub login` until logout or a 401.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

use studyhub_api_client::ApiClient;
use studyhub_cli::{init_tracing, truncate_string};
use studyhub_core::error::ApiError;
use studyhub_core::models::{LocalTask, RegisterRequest};
use studyhub_core::store::{RatingStore, Session, SessionStore, TaskStore};
use studyhub_core::ClientConfig;
use studyhub_services::{Dashboard, ProfileService, SessionManager, Workspace};

#[derive(Parser)]
#[command(name = "studyhub", about = "StudyHub API CLI")]
struct Cli {
    /// Skip confirmation prompts for destructive operations
    #[arg(long, global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login { username: String, password: String },
    /// Register a new account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        username: String,
        password: String,
    },
    /// Drop the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show profile, memberships, and usage statistics
    Profile,
    /// Change the account password
    ChangePassword {
        old_password: String,
        new_password: String,
    },
    /// Organization operations
    Org {
        #[command(subcommand)]
        sub: OrgCommands,
    },
    /// Invitation operations
    Invite {
        #[command(subcommand)]
        sub: InviteCommands,
    },
    /// Channel operations within an organization
    Channel {
        #[command(subcommand)]
        sub: ChannelCommands,
    },
    /// Topic operations within an organization
    Topic {
        #[command(subcommand)]
        sub: TopicCommands,
    },
    /// Note operations within a topic
    Note {
        #[command(subcommand)]
        sub: NoteCommands,
    },
    /// Upload a file attachment; prints the stored file URL
    Upload {
        /// Organization the attachment belongs to
        #[arg(long)]
        org: String,
        file: std::path::PathBuf,
    },
    /// Local per-organization task list (never sent to the backend)
    Task {
        #[command(subcommand)]
        sub: TaskCommands,
    },
}

#[derive(Subcommand)]
enum OrgCommands {
    /// List organizations with member and channel counts
    List,
    /// Create an organization (the creator becomes its owner)
    Create { name: String },
    /// Delete an organization and everything in it
    Delete { id: String },
    /// Leave an organization
    Leave { id: String },
}

#[derive(Subcommand)]
enum InviteCommands {
    /// List pending invitations
    List,
    Accept { id: String },
    Decline { id: String },
}

#[derive(Subcommand)]
enum ChannelCommands {
    List {
        #[arg(long)]
        org: String,
    },
    Create {
        #[arg(long)]
        org: String,
        name: String,
    },
    /// Delete a channel and its topics
    Delete {
        #[arg(long)]
        org: String,
        id: String,
    },
}

#[derive(Subcommand)]
enum TopicCommands {
    List {
        #[arg(long)]
        org: String,
        #[arg(long)]
        channel: String,
    },
    Create {
        #[arg(long)]
        org: String,
        #[arg(long)]
        channel: String,
        name: String,
    },
    Delete {
        #[arg(long)]
        org: String,
        id: String,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    List {
        #[arg(long)]
        org: String,
        #[arg(long)]
        topic: String,
    },
    /// Send a message into a topic
    Send {
        #[arg(long)]
        org: String,
        #[arg(long)]
        topic: String,
        content: String,
    },
    Delete {
        #[arg(long)]
        org: String,
        #[arg(long)]
        topic: String,
        id: String,
    },
    Like {
        #[arg(long)]
        org: String,
        #[arg(long)]
        topic: String,
        id: String,
    },
    Dislike {
        #[arg(long)]
        org: String,
        #[arg(long)]
        topic: String,
        id: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    List {
        #[arg(long)]
        org: String,
    },
    Add {
        #[arg(long)]
        org: String,
        title: String,
        #[arg(long)]
        due: Option<String>,
    },
    Remove {
        #[arg(long)]
        org: String,
        index: usize,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn confirm(prompt: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    print!("{} [y/N] ", prompt);
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

struct App {
    api: ApiClient,
    session: SessionManager,
    state_dir: std::path::PathBuf,
}

impl App {
    fn require_session(&self) -> anyhow::Result<Session> {
        self.session
            .current()
            .context("Not logged in. Run `studyhub login <username> <password>` first")
    }

    fn workspace(&self, org_id: &str) -> Workspace {
        Workspace::new(
            self.api.clone(),
            RatingStore::new(&self.state_dir),
            org_id,
        )
    }

    fn dashboard(&self) -> anyhow::Result<Dashboard> {
        let session = self.require_session()?;
        Ok(Dashboard::new(self.api.clone(), session.user))
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(2);
        }
    };
    let api = match ApiClient::new(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Failed to create API client: {:#}", e);
            std::process::exit(2);
        }
    };
    let session = SessionManager::new(api.clone(), SessionStore::new(&config.state_dir));
    let _ = session.restore();

    let app = App {
        api,
        session,
        state_dir: config.state_dir.clone(),
    };

    if let Err(err) = run(&app, cli).await {
        if let Some(ApiError::Unauthorized { .. }) = err.downcast_ref::<ApiError>() {
            app.session.invalidate();
            eprintln!("Session expired. Run `studyhub login` to sign in again.");
        } else {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(1);
    }
}

async fn run(app: &App, cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Login { username, password } => {
            let session = app.session.login(&username, &password).await?;
            println!("Logged in as {}", session.user.display_name());
        }
        Commands::Register {
            first_name,
            last_name,
            email,
            username,
            password,
        } => {
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                username: username.clone(),
                password: password.clone(),
            };
            app.session.register(&request).await?;
            let session = app.session.login(&username, &password).await?;
            println!("Registered and logged in as {}", session.user.display_name());
        }
        Commands::Logout => {
            app.session.logout();
            println!("Logged out");
        }
        Commands::Whoami => {
            let session = app.require_session()?;
            print_json(&session.user)?;
        }
        Commands::Profile => {
            let session = app.require_session()?;
            let profile = ProfileService::new(app.api.clone());
            let user = profile.get_profile(&session).await;
            let memberships = profile.memberships().await.unwrap_or_default();
            let stats = profile.usage_stats().await;
            print_json(&serde_json::json!({
                "user": user,
                "memberships": memberships,
                "stats": stats,
            }))?;
        }
        Commands::ChangePassword {
            old_password,
            new_password,
        } => {
            let dashboard = app.dashboard()?;
            let user_id = dashboard.resolve_user_id().await?;
            ProfileService::new(app.api.clone())
                .change_password(&user_id, &old_password, &new_password)
                .await?;
            println!("Password changed");
        }
        Commands::Org { sub } => run_org(app, sub, cli.yes).await?,
        Commands::Invite { sub } => run_invite(app, sub).await?,
        Commands::Channel { sub } => run_channel(app, sub, cli.yes).await?,
        Commands::Topic { sub } => run_topic(app, sub, cli.yes).await?,
        Commands::Note { sub } => run_note(app, sub, cli.yes).await?,
        Commands::Upload { org, file } => {
            app.require_session()?;
            let bytes = std::fs::read(&file)
                .with_context(|| format!("Failed to read file: {}", file.display()))?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("attachment")
                .to_string();
            let mut workspace = app.workspace(&org);
            workspace.stage_attachment(filename, bytes);
            let url = workspace.upload_attachment().await?;
            print_json(&serde_json::json!({ "file_url": url }))?;
        }
        Commands::Task { sub } => run_task(app, sub)?,
    }
    Ok(())
}

async fn run_org(app: &App, sub: OrgCommands, yes: bool) -> anyhow::Result<()> {
    let mut dashboard = app.dashboard()?;
    match sub {
        OrgCommands::List => {
            dashboard.load().await;
            print_json(&dashboard.organizations)?;
        }
        OrgCommands::Create { name } => {
            let (id, warning) = dashboard.create_organization(&name).await?;
            if let Some(warning) = warning {
                eprintln!("Warning: {}", warning);
            }
            println!("Created organization {} (id {})", name, id);
        }
        OrgCommands::Delete { id } => {
            if !confirm(
                &format!("Delete organization {} and everything in it?", id),
                yes,
            ) {
                println!("Cancelled");
                return Ok(());
            }
            let report = dashboard.delete_organization(&id).await;
            if !report.is_clean() {
                eprintln!(
                    "Warning: {} of {} cleanup steps failed",
                    report.failed(),
                    report.steps.len()
                );
            }
            print_json(&report)?;
        }
        OrgCommands::Leave { id } => {
            dashboard.leave_organization(&id).await?;
            println!("Left organization {}", id);
        }
    }
    Ok(())
}

async fn run_invite(app: &App, sub: InviteCommands) -> anyhow::Result<()> {
    let mut dashboard = app.dashboard()?;
    match sub {
        InviteCommands::List => {
            dashboard.load().await;
            print_json(&dashboard.invitations)?;
        }
        InviteCommands::Accept { id } => {
            dashboard.accept_invitation(&id).await?;
            println!("Invitation {} accepted", id);
        }
        InviteCommands::Decline { id } => {
            dashboard.decline_invitation(&id).await?;
            println!("Invitation {} declined", id);
        }
    }
    Ok(())
}

async fn run_channel(app: &App, sub: ChannelCommands, yes: bool) -> anyhow::Result<()> {
    app.require_session()?;
    match sub {
        ChannelCommands::List { org } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            print_json(&workspace.channels)?;
        }
        ChannelCommands::Create { org, name } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            match workspace.create_channel(&name).await {
                Ok(channel) => print_json(&channel)?,
                Err(ApiError::Duplicate { .. }) => anyhow::bail!(
                    "A channel named \"{}\" already exists in this organization",
                    name
                ),
                Err(e) => return Err(e.into()),
            }
        }
        ChannelCommands::Delete { org, id } => {
            if !confirm(&format!("Delete channel {} and its topics?", id), yes) {
                println!("Cancelled");
                return Ok(());
            }
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            let report = workspace.delete_channel(&id).await;
            print_json(&report)?;
        }
    }
    Ok(())
}

async fn run_topic(app: &App, sub: TopicCommands, yes: bool) -> anyhow::Result<()> {
    app.require_session()?;
    match sub {
        TopicCommands::List { org, channel } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            let topics = workspace
                .topics_by_channel
                .get(&channel)
                .cloned()
                .unwrap_or_default();
            print_json(&topics)?;
        }
        TopicCommands::Create { org, channel, name } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            match workspace.create_topic(&channel, &name).await {
                Ok(topic) => print_json(&topic)?,
                Err(ApiError::Duplicate { .. }) => {
                    anyhow::bail!("A topic named \"{}\" already exists in this channel", name)
                }
                Err(e) => return Err(e.into()),
            }
        }
        TopicCommands::Delete { org, id } => {
            if !confirm(&format!("Delete topic {}?", id), yes) {
                println!("Cancelled");
                return Ok(());
            }
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.delete_topic(&id).await?;
            println!("Topic {} deleted", id);
        }
    }
    Ok(())
}

async fn run_note(app: &App, sub: NoteCommands, yes: bool) -> anyhow::Result<()> {
    app.require_session()?;
    match sub {
        NoteCommands::List { org, topic } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.select_topic(&topic).await?;
            for note in &workspace.notes {
                println!(
                    "{:>6}  {:>4} likes  {}",
                    note.id,
                    note.likes,
                    truncate_string(&note.content, 60)
                );
            }
            if workspace.notes.is_empty() {
                println!("(no notes)");
            }
        }
        NoteCommands::Send { org, topic, content } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.select_topic(&topic).await?;
            let note = workspace.send_note(&content).await?;
            print_json(&note)?;
        }
        NoteCommands::Delete { org, topic, id } => {
            if !confirm(&format!("Delete note {}?", id), yes) {
                println!("Cancelled");
                return Ok(());
            }
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.select_topic(&topic).await?;
            workspace.delete_note(&id).await?;
            println!("Note {} deleted", id);
        }
        NoteCommands::Like { org, topic, id } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.select_topic(&topic).await?;
            let likes = workspace.toggle_like(&id).await?;
            println!("Note {} now has {} likes", id, likes);
        }
        NoteCommands::Dislike { org, topic, id } => {
            let mut workspace = app.workspace(&org);
            workspace.load().await;
            workspace.select_topic(&topic).await?;
            let likes = workspace.toggle_dislike(&id).await?;
            println!("Note {} now has {} likes", id, likes);
        }
    }
    Ok(())
}

fn run_task(app: &App, sub: TaskCommands) -> anyhow::Result<()> {
    let store = TaskStore::new(&app.state_dir);
    match sub {
        TaskCommands::List { org } => {
            let tasks = store.list(&org)?;
            print_json(&tasks)?;
        }
        TaskCommands::Add { org, title, due } => {
            store.add(
                &org,
                LocalTask {
                    title,
                    due_date: due,
                },
            )?;
            println!("Task added");
        }
        TaskCommands::Remove { org, index } => {
            store.remove(&org, index)?;
            println!("Task removed");
        }
    }
    Ok(())
}
