//! CLI commands

use anyhow::{Context as _, Result, anyhow};
use clap::Subcommand;
use club_core::{ClientConfig, FileStorage, SessionStore};
use club_frontend_common::{AuthStatus, AuthStore, PaymentForm, RegistrationForm, user_friendly_error};
use club_http::types::{Event, Payment, PaymentStatus, UserProfile};
use club_http::{ApiClient, ApiClientBuilder, ClientError, FilePart};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;
use crate::navigator::TerminalNavigator;

/// Options shared by every command
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub route: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and keep the session in the data directory
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "CLUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "CLUB_PASSWORD", hide_env_values = true)]
        password: String,

        /// Repeat of the password (defaults to the password itself)
        #[arg(long)]
        confirm_password: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        year: Option<u8>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Browse and join events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// List club achievements
    Achievements,

    /// Membership and event payments
    Payments {
        #[command(subcommand)]
        command: PaymentCommands,
    },

    /// Staff-only administration
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// List open registration forms
    Forms,

    /// Inspect or generate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// List events
    List,

    /// Show one event
    Show { id: i64 },

    /// Register for an event
    Register { id: i64 },
}

#[derive(Subcommand)]
pub enum PaymentCommands {
    /// List your payments
    List,

    /// Submit a payment with its receipt
    Submit {
        #[arg(long)]
        purpose: String,

        #[arg(long)]
        amount: String,

        /// Bank or UPI transaction reference
        #[arg(long)]
        transaction_id: String,

        /// Event the payment is for
        #[arg(long)]
        event: Option<i64>,

        /// Receipt image or PDF
        #[arg(long)]
        receipt: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List user accounts
    Users,

    /// List payments awaiting review
    Pending,

    /// Approve a payment
    Approve {
        id: i64,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// Reject a payment
    Reject {
        id: i64,

        #[arg(long)]
        remarks: Option<String>,
    },

    /// List registrations for an event
    Registrations { event: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (defaults to <data-dir>/config.toml)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Everything a command needs to talk to the backend
struct Portal {
    store: AuthStore,
}

impl Portal {
    fn open(config: &ClientConfig, route: &str) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
            format!(
                "Failed to create data directory {}",
                config.storage.data_dir.display()
            )
        })?;

        let storage = FileStorage::in_dir(&config.storage.data_dir);
        debug!(path = %storage.path().display(), "Using session file");
        let session = Arc::new(SessionStore::load(Arc::new(storage)));

        let client = ApiClientBuilder::from_config(config)
            .session(session.clone())
            .navigator(Arc::new(TerminalNavigator::new(
                route,
                config.paths.login_route.clone(),
            )))
            .build()?;

        Ok(Self {
            store: AuthStore::new(client, session),
        })
    }

    fn client(&self) -> &ApiClient {
        self.store.client()
    }

    async fn require_user(&self) -> Result<UserProfile> {
        match self.store.initialize().await {
            AuthStatus::Authenticated(user) => Ok(user),
            AuthStatus::Anonymous => Err(anyhow!("Not signed in. Run `club login` first.")),
        }
    }
}

impl Commands {
    /// Route the command corresponds to in the web portal
    fn route(&self) -> &'static str {
        match self {
            Self::Login { .. } | Self::Logout | Self::Config { .. } => "/login",
            Self::Register { .. } => "/register",
            Self::Whoami => "/profile",
            Self::Events { .. } => "/events",
            Self::Achievements => "/achievements",
            Self::Payments { .. } => "/payments",
            Self::Admin { .. } => "/admin",
            Self::Forms => "/forms",
        }
    }

    pub async fn execute(self, options: GlobalOptions) -> Result<()> {
        let config = config::load_config(options.config.as_deref(), options.data_dir.as_deref())?;

        if let Self::Config { command } = self {
            return command.execute(&config, options.data_dir.as_deref());
        }

        let route = options
            .route
            .unwrap_or_else(|| self.route().to_string());
        let portal = Portal::open(&config, &route)?;

        match self {
            Self::Login { email, password } => login(&portal, &email, &password).await,
            Self::Register {
                first_name,
                last_name,
                email,
                password,
                confirm_password,
                phone,
                department,
                year,
            } => {
                let form = RegistrationForm {
                    first_name,
                    last_name,
                    email,
                    confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                    password,
                    phone,
                    department,
                    year_of_study: year,
                };
                register(&portal, &form).await
            }
            Self::Logout => {
                portal.store.logout();
                println!("Signed out");
                Ok(())
            }
            Self::Whoami => {
                let user = portal.require_user().await?;
                print_user(&user);
                Ok(())
            }
            Self::Events { command } => command.execute(&portal).await,
            Self::Achievements => {
                let achievements = portal.client().list_achievements().await.map_err(friendly)?;
                for achievement in achievements {
                    let date = achievement
                        .date
                        .map(|date| date.to_string())
                        .unwrap_or_default();
                    println!("{:>5}  {:<10}  {}", achievement.id, date, achievement.title);
                }
                Ok(())
            }
            Self::Payments { command } => command.execute(&portal).await,
            Self::Admin { command } => command.execute(&portal).await,
            Self::Forms => {
                let forms = portal.client().list_forms().await.map_err(friendly)?;
                if forms.is_empty() {
                    println!("No open forms");
                }
                for form in forms {
                    println!("{:>5}  {}  {}", form.id, form.title, form.embed_url);
                }
                Ok(())
            }
            Self::Config { .. } => Ok(()),
        }
    }
}

impl EventCommands {
    async fn execute(self, portal: &Portal) -> Result<()> {
        let client = portal.client();
        match self {
            Self::List => {
                for event in client.list_events().await.map_err(friendly)? {
                    print_event_line(&event);
                }
            }
            Self::Show { id } => {
                let event = client.get_event(id).await.map_err(friendly)?;
                println!("{}", event.title);
                println!("  Starts:  {}", event.starts_at);
                if let Some(ends_at) = event.ends_at {
                    println!("  Ends:    {ends_at}");
                }
                if let Some(venue) = &event.venue {
                    println!("  Venue:   {venue}");
                }
                println!("  Fee:     {}", event.fee.as_deref().unwrap_or("free"));
                println!(
                    "  Open:    {}",
                    if event.registration_open { "yes" } else { "no" }
                );
                if !event.description.is_empty() {
                    println!("\n{}", event.description);
                }
            }
            Self::Register { id } => {
                portal.require_user().await?;
                let registration = client.register_for_event(id).await.map_err(friendly)?;
                info!(event = id, registration = registration.id, "Registered for event");
                println!("Registered for event {id}");
            }
        }
        Ok(())
    }
}

impl PaymentCommands {
    async fn execute(self, portal: &Portal) -> Result<()> {
        match self {
            Self::List => {
                for payment in portal.client().list_payments().await.map_err(friendly)? {
                    print_payment_line(&payment);
                }
            }
            Self::Submit {
                purpose,
                amount,
                transaction_id,
                event,
                receipt,
            } => {
                let form = PaymentForm {
                    purpose,
                    amount,
                    transaction_id,
                    event,
                    receipt: Some(read_receipt(&receipt).await?),
                };
                let submission = form.validate()?;
                let payment = portal
                    .client()
                    .submit_payment(submission)
                    .await
                    .map_err(friendly)?;
                println!("Submitted payment {} for review", payment.id);
            }
        }
        Ok(())
    }
}

impl AdminCommands {
    async fn execute(self, portal: &Portal) -> Result<()> {
        portal.require_user().await?;
        if !portal.store.is_staff() {
            anyhow::bail!("Admin commands need a staff account");
        }

        let client = portal.client();
        match self {
            Self::Users => {
                for user in client.list_users().await.map_err(friendly)? {
                    println!(
                        "{:>5}  {:<30}  {:<24}  {}",
                        user.id,
                        user.email,
                        user.full_name(),
                        if user.is_staff { "staff" } else { "member" }
                    );
                }
            }
            Self::Pending => {
                for payment in client.list_pending_payments().await.map_err(friendly)? {
                    print_payment_line(&payment);
                }
            }
            Self::Approve { id, remarks } => {
                client
                    .review_payment(id, PaymentStatus::Approved, remarks)
                    .await
                    .map_err(friendly)?;
                println!("Approved payment {id}");
            }
            Self::Reject { id, remarks } => {
                client
                    .review_payment(id, PaymentStatus::Rejected, remarks)
                    .await
                    .map_err(friendly)?;
                println!("Rejected payment {id}");
            }
            Self::Registrations { event } => {
                for registration in client.list_registrations(event).await.map_err(friendly)? {
                    println!(
                        "{:>5}  user {:<6}  {}",
                        registration.id,
                        registration
                            .user
                            .map(|user| user.to_string())
                            .unwrap_or_default(),
                        registration.registered_at
                    );
                }
            }
        }
        Ok(())
    }
}

impl ConfigCommands {
    fn execute(self, config: &ClientConfig, data_dir: Option<&Path>) -> Result<()> {
        match self {
            Self::Show => {
                print!("{}", config::render_config(config)?);
            }
            Self::Init { output, force } => {
                let config_path = output.unwrap_or_else(|| config::default_config_path(data_dir));
                config::generate_default_config(&config_path, force)?;
                println!("Generated configuration at: {}", config_path.display());
            }
        }
        Ok(())
    }
}

async fn login(portal: &Portal, email: &str, password: &str) -> Result<()> {
    let user = portal
        .store
        .login(email, password)
        .await
        .map_err(friendly)?;
    println!("Signed in as {} <{}>", user.full_name(), user.email);
    Ok(())
}

async fn register(portal: &Portal, form: &RegistrationForm) -> Result<()> {
    let request = form.validate()?;
    let user = portal.store.register(&request).await.map_err(friendly)?;
    println!("Welcome, {}!", user.full_name());
    Ok(())
}

fn friendly(error: ClientError) -> anyhow::Error {
    debug!(error = %error, "Request failed");
    anyhow!(user_friendly_error(&error))
}

async fn read_receipt(path: &Path) -> Result<FilePart> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read receipt {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "receipt".to_string());
    Ok(FilePart::new(file_name, content_type_for(path), bytes))
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

fn print_user(user: &UserProfile) {
    println!("{} <{}>", user.full_name(), user.email);
    if let Some(department) = &user.department {
        println!("  Department: {department}");
    }
    println!(
        "  Membership: {}",
        match (user.is_member, user.membership_expires) {
            (true, Some(expires)) => format!("active until {expires}"),
            (true, None) => "active".to_string(),
            (false, _) => "none".to_string(),
        }
    );
    if user.is_staff {
        println!("  Role:       staff");
    }
}

fn print_event_line(event: &Event) {
    println!(
        "{:>5}  {}  {:<40}  {}",
        event.id,
        event.starts_at.format("%Y-%m-%d %H:%M"),
        event.title,
        if event.registration_open { "open" } else { "closed" }
    );
}

fn print_payment_line(payment: &Payment) {
    println!(
        "{:>5}  {:<12}  {:>10}  {:<9}  {}",
        payment.id,
        payment.purpose,
        payment.amount,
        format!("{:?}", payment.status).to_lowercase(),
        payment.transaction_id
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_receipts() {
        assert_eq!(content_type_for(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("bill.pdf")), "application/pdf");
        assert_eq!(
            content_type_for(Path::new("notes")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_commands_map_to_portal_routes() {
        assert_eq!(Commands::Whoami.route(), "/profile");
        assert_eq!(
            Commands::Payments {
                command: PaymentCommands::List
            }
            .route(),
            "/payments"
        );
    }
}
