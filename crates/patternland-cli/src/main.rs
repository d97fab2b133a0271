//! Patternland CLI, a command-line client for the Patternland API.
//!
//! Set PATTERNLAND_API_URL (or API_URL) and PATTERNLAND_TOKEN. `login` prints a
//! token to export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use patternland_api_client::ApiClient;
use patternland_cli::{
    files_table, init_tracing, pattern_details, pattern_table, print_json, users_table,
    ConsoleNotifier,
};
use patternland_core::forms::{
    AddUserForm, ChangePasswordForm, EditUserForm, ResetPasswordForm, SignUpForm,
};
use patternland_core::models::{
    FileSlot, FileUpload, LoginCredentials, PatternFiles, PatternFilter, UserUpdateMe,
};
use patternland_core::{AddPatternForm, AppError, ClientConfig, Page, PatternForm};
use patternland_services::{
    pattern_files, AuthService, MutationContext, PatternService, QueryCache, UserService,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "patternland", about = "Patternland API CLI")]
struct Cli {
    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print an access token
    Login {
        email: String,
        #[arg(long, env = "PATTERNLAND_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "PATTERNLAND_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Send a password recovery email
    RecoverPassword { email: String },
    /// Set a new password with the token from the recovery email
    ResetPassword {
        token: String,
        #[arg(long, env = "PATTERNLAND_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
    /// Your own account
    Me {
        #[command(subcommand)]
        sub: MeCommands,
    },
    /// User administration (superusers only)
    Users {
        #[command(subcommand)]
        sub: UserCommands,
    },
    /// Patterns and their files
    Patterns {
        #[command(subcommand)]
        sub: PatternCommands,
    },
}

#[derive(Subcommand)]
enum MeCommands {
    /// Show the logged-in user
    Show,
    /// Update name or email
    Update {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    /// Delete your account
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    List {
        #[arg(long, default_value = "1")]
        page: u32,
    },
    Add {
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        full_name: String,
        #[arg(long)]
        superuser: bool,
        #[arg(long)]
        inactive: bool,
    },
    Edit {
        id: Uuid,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        full_name: String,
        /// Leave empty to keep the current password
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long)]
        superuser: bool,
        #[arg(long)]
        inactive: bool,
    },
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum PatternCommands {
    /// List patterns, one page at a time
    List {
        #[arg(long, default_value = "1")]
        page: u32,
        /// Only your own patterns
        #[arg(long)]
        mine: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one pattern
    Get { id: Uuid },
    /// Create a pattern and upload its files
    Add {
        #[command(flatten)]
        fields: PatternFields,
        #[command(flatten)]
        files: FileArgs,
    },
    /// Upload files to an existing pattern
    Attach {
        id: Uuid,
        #[command(flatten)]
        files: FileArgs,
    },
    /// Change a pattern; an empty value clears an optional field
    Edit {
        id: Uuid,
        #[command(flatten)]
        changes: PatternChanges,
    },
    Delete { id: Uuid },
    /// List the files of a pattern
    Files { id: Uuid },
    /// Download a stored file
    Download {
        filename: String,
        #[arg(long, default_value = ".")]
        dest: PathBuf,
    },
}

#[derive(Args)]
struct PatternFields {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// Fibre Mood, Other or Seamwork
    #[arg(long)]
    brand: String,
    #[arg(long, default_value = "Digital")]
    version: String,
    #[arg(long, default_value = "Women")]
    for_who: String,
    #[arg(long, default_value = "")]
    category: String,
    /// 1 to 5
    #[arg(long)]
    difficulty: String,
    #[arg(long, default_value = "")]
    fabric: String,
    /// Metres of fabric
    #[arg(long, default_value = "")]
    fabric_amount: String,
    #[arg(long, default_value = "")]
    url: String,
}

impl PatternFields {
    fn into_form(self) -> PatternForm {
        PatternForm {
            title: self.title,
            description: self.description,
            brand: self.brand,
            version: self.version,
            for_who: self.for_who,
            category: self.category,
            difficulty: self.difficulty,
            fabric: self.fabric,
            fabric_amount: self.fabric_amount,
            pattern_url: self.url,
        }
    }
}

#[derive(Args)]
struct PatternChanges {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    version: Option<String>,
    #[arg(long)]
    for_who: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    fabric: Option<String>,
    #[arg(long)]
    fabric_amount: Option<String>,
    #[arg(long)]
    url: Option<String>,
}

impl PatternChanges {
    fn apply(self, form: &mut PatternForm) {
        let fields = [
            (self.title, &mut form.title),
            (self.description, &mut form.description),
            (self.brand, &mut form.brand),
            (self.version, &mut form.version),
            (self.for_who, &mut form.for_who),
            (self.category, &mut form.category),
            (self.difficulty, &mut form.difficulty),
            (self.fabric, &mut form.fabric),
            (self.fabric_amount, &mut form.fabric_amount),
            (self.url, &mut form.pattern_url),
        ];
        for (change, field) in fields {
            if let Some(value) = change {
                *field = value;
            }
        }
    }
}

#[derive(Args)]
struct FileArgs {
    #[arg(long)]
    icon: Option<PathBuf>,
    #[arg(long)]
    a0: Option<PathBuf>,
    #[arg(long)]
    a0_sa: Option<PathBuf>,
    #[arg(long)]
    a0_sa_projector: Option<PathBuf>,
    #[arg(long)]
    a0_projector: Option<PathBuf>,
    #[arg(long)]
    a4: Option<PathBuf>,
    #[arg(long)]
    a4_sa: Option<PathBuf>,
    #[arg(long)]
    instructions: Option<PathBuf>,
}

impl FileArgs {
    fn read(&self) -> Result<PatternFiles, AppError> {
        let paths = [
            (FileSlot::Icon, &self.icon),
            (FileSlot::A0, &self.a0),
            (FileSlot::A0Sa, &self.a0_sa),
            (FileSlot::A0SaProjector, &self.a0_sa_projector),
            (FileSlot::A0Projector, &self.a0_projector),
            (FileSlot::A4, &self.a4),
            (FileSlot::A4Sa, &self.a4_sa),
            (FileSlot::Instructables, &self.instructions),
        ];

        let mut files = PatternFiles::new();
        for (slot, path) in paths {
            if let Some(path) = path {
                files.set(slot, Some(FileUpload::from_path(path)?));
            }
        }
        Ok(files)
    }
}

struct App {
    json: bool,
    page_size: u32,
    patterns: PatternService<ApiClient>,
    users: UserService<ApiClient>,
    auth: AuthService<ApiClient>,
}

impl App {
    fn new(config: &ClientConfig, json: bool) -> anyhow::Result<Self> {
        let client = Arc::new(ApiClient::new(config).context(
            "Failed to create API client. Check PATTERNLAND_API_URL (or API_URL)",
        )?);
        let ctx = MutationContext::new(QueryCache::new(), Arc::new(ConsoleNotifier));
        Ok(Self {
            json,
            page_size: config.page_size,
            patterns: PatternService::new(client.clone(), ctx.clone()),
            users: UserService::new(client.clone(), ctx.clone()),
            auth: AuthService::new(client, ctx),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env().context("Invalid Patternland configuration")?;
    let cli = Cli::parse();
    let app = App::new(&config, cli.json)?;

    match cli.command {
        Commands::Login { email, password } => {
            let token = app
                .auth
                .login(&LoginCredentials {
                    username: email,
                    password,
                })
                .await?;
            if app.json {
                print_json(&token)?;
            } else {
                println!("export PATTERNLAND_TOKEN={}", token.access_token);
            }
        }
        Commands::Signup {
            email,
            full_name,
            password,
        } => {
            let form = SignUpForm {
                email,
                full_name,
                confirm_password: password.clone(),
                password,
            };
            let user = app.auth.signup(&form).await?;
            print_json(&user)?;
        }
        Commands::RecoverPassword { email } => {
            app.auth.recover_password(&email).await?;
        }
        Commands::ResetPassword {
            token,
            new_password,
        } => {
            let form = ResetPasswordForm {
                token,
                confirm_password: new_password.clone(),
                new_password,
            };
            app.auth.reset_password(&form).await?;
        }
        Commands::Me { sub } => run_me(&app, sub).await?,
        Commands::Users { sub } => run_users(&app, sub).await?,
        Commands::Patterns { sub } => run_patterns(&app, sub).await?,
    }

    Ok(())
}

async fn run_me(app: &App, sub: MeCommands) -> anyhow::Result<()> {
    match sub {
        MeCommands::Show => {
            let me = app.users.current_user().await?;
            print_json(&me)?;
        }
        MeCommands::Update { full_name, email } => {
            let body = UserUpdateMe { full_name, email };
            let me = app.users.update_me(&body).await?;
            print_json(&me)?;
        }
        MeCommands::Password { current, new } => {
            let form = ChangePasswordForm {
                current_password: current,
                confirm_password: new.clone(),
                new_password: new,
            };
            app.users.update_password(&form).await?;
        }
        MeCommands::Delete { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete your account without --yes");
            }
            app.users.delete_account().await?;
            app.auth.logout().await;
        }
    }
    Ok(())
}

async fn run_users(app: &App, sub: UserCommands) -> anyhow::Result<()> {
    match sub {
        UserCommands::List { page } => {
            let list = app.users.list(Page::new(page, app.page_size)).await?;
            if app.json {
                print_json(&list)?;
            } else {
                print!("{}", users_table(&list));
            }
        }
        UserCommands::Add {
            email,
            password,
            full_name,
            superuser,
            inactive,
        } => {
            let form = AddUserForm {
                email,
                full_name,
                confirm_password: password.clone(),
                password,
                is_superuser: superuser,
                is_active: !inactive,
            };
            let user = app.users.add(&form).await?;
            print_json(&user)?;
        }
        UserCommands::Edit {
            id,
            email,
            full_name,
            password,
            superuser,
            inactive,
        } => {
            let form = EditUserForm {
                email,
                full_name,
                confirm_password: password.clone(),
                password,
                is_superuser: superuser,
                is_active: !inactive,
            };
            let user = app.users.edit(id, &form).await?;
            print_json(&user)?;
        }
        UserCommands::Delete { id } => {
            app.users.delete(id).await?;
        }
    }
    Ok(())
}

async fn run_patterns(app: &App, sub: PatternCommands) -> anyhow::Result<()> {
    match sub {
        PatternCommands::List {
            page,
            mine,
            title,
            brand,
            category,
        } => {
            let filter = PatternFilter {
                title,
                brand: brand.map(|b| b.parse()).transpose()?,
                category: category.map(|c| c.parse()).transpose()?,
                self_patterns: mine,
                ..Default::default()
            };
            let page = Page::new(page, app.page_size);
            let list = app.patterns.list(page, &filter).await?;
            if app.json {
                print_json(&list)?;
                return Ok(());
            }

            // The badge needs the current user; an anonymous listing just has none.
            if app.users.current_user().await.is_err() {
                tracing::debug!("Current user unavailable, listing without ownership");
            }
            let mut owned = Vec::with_capacity(list.data.len());
            for pattern in &list.data {
                owned.push(app.patterns.is_mine(pattern).await);
            }
            print!("{}", pattern_table(&list, page, &owned));
        }
        PatternCommands::Get { id } => {
            let pattern = app.patterns.get(id).await?;
            if app.json {
                print_json(&pattern)?;
            } else {
                print!("{}", pattern_details(&pattern));
            }
        }
        PatternCommands::Add { fields, files } => {
            let mut form = AddPatternForm::new(fields.into_form(), files.read()?);
            let pattern = app.patterns.create_with_files(&mut form).await?;
            print_json(&pattern)?;
        }
        PatternCommands::Attach { id, files } => {
            let mut files = files.read()?;
            if files.is_empty() {
                anyhow::bail!("Select at least one file to upload");
            }
            let pattern = app.patterns.attach_files(id, &mut files).await?;
            print_json(&pattern)?;
        }
        PatternCommands::Edit { id, changes } => {
            let stored = app.patterns.get(id).await?;
            let mut form = PatternForm::from_pattern(&stored);
            changes.apply(&mut form);
            let pattern = app.patterns.edit(id, &form).await?;
            print_json(&pattern)?;
        }
        PatternCommands::Delete { id } => {
            app.patterns.delete(id).await?;
        }
        PatternCommands::Files { id } => {
            let pattern = app.patterns.get(id).await?;
            let entries = pattern_files(&pattern);
            if app.json {
                let rows: Vec<_> = entries
                    .iter()
                    .map(|e| serde_json::json!({ "label": e.label, "file": e.file_id }))
                    .collect();
                print_json(&rows)?;
            } else {
                print!("{}", files_table(&entries));
            }
        }
        PatternCommands::Download { filename, dest } => {
            let path = app.patterns.download(&filename, &dest).await?;
            print_saved(&path);
        }
    }
    Ok(())
}

fn print_saved(path: &Path) {
    println!("Saved {}", path.display());
}
