//! Command-line frontend for the Pasteor API.

mod browse;
mod output;

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use pasteor_client::{ApiClient, AuthSession, TokenStore};
use pasteor_core::composer::{Composer, ComposerForm};
use pasteor_core::{ApiError, Config, QueryController, SortKey};

#[derive(Parser)]
#[command(name = "pasteor", about = "Pasteor CLI", version)]
struct Cli {
    /// Server URL (can also be set via PASTEOR_SERVER env var)
    #[arg(short, long, env = "PASTEOR_SERVER")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Save an auth token handed off by the web login flow
    Login {
        /// Token value; read from stdin when omitted
        token: Option<String>,
    },
    /// Forget the saved auth token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create a paste from a file or stdin
    New {
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        language: Option<String>,
        /// One of: never, 1h, 24h, 7d, 30d
        #[arg(short, long, default_value = "never")]
        expires: String,
    },
    /// Print a paste with its metadata
    Get { id: String },
    /// Print raw paste content only
    Raw { id: String },
    /// Edit one of your pastes
    Edit {
        id: String,
        /// New content file; the current content is kept when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Delete one of your pastes
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List your pastes with filters
    List {
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// Language tag, or "all"
        #[arg(short, long)]
        language: Option<String>,
        /// date, views, or title
        #[arg(short = 'o', long, default_value = "date")]
        sort: String,
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// List recent public pastes
    Recent {
        #[arg(short, long, default_value = "10")]
        limit: u32,
    },
    /// Show your stats, or site-wide stats when logged out
    Stats,
    /// List the languages you have used
    Languages,
    /// Interactive dashboard over your pastes
    Browse,
}

/// Route to the login entry point instead of rendering an error.
fn redirect_to_login() -> ! {
    eprintln!("You are not logged in. Run: pasteor login");
    std::process::exit(2);
}

fn exit_for(err: ApiError, action: &str) -> ! {
    match err {
        ApiError::AuthRequired => redirect_to_login(),
        ApiError::NotFound => {
            eprintln!("{action} failed: paste not found (it may have expired)");
            std::process::exit(1);
        }
        err => {
            eprintln!("{action} failed: {err}");
            std::process::exit(1);
        }
    }
}

fn ok_or_exit<T>(result: Result<T, ApiError>, action: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => exit_for(err, action),
    }
}

fn require_token(auth: &AuthSession) -> String {
    match auth.token() {
        Some(token) => token.to_string(),
        None => redirect_to_login(),
    }
}

fn read_content(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        server,
        json,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let mut config = Config::from_env();
    if let Some(server) = server {
        config.server_url = server.trim().trim_end_matches('/').to_string();
    }
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }

    let api = ApiClient::from_config(&config)?;
    let store = TokenStore::new(config.token_path.clone());
    let mut auth = AuthSession::hydrate(&store);

    match command {
        Commands::Completions { .. } => unreachable!("completions handled before client setup"),
        Commands::Login { token } => {
            let token = match token {
                Some(token) => token,
                None => {
                    print!("Token: ");
                    io::stdout().flush()?;
                    let mut line = String::new();
                    io::stdin().lock().read_line(&mut line)?;
                    line.trim().to_string()
                }
            };
            if token.is_empty() {
                eprintln!("Login failed: no token provided");
                std::process::exit(1);
            }
            let user = ok_or_exit(auth.login(&api, &store, token).await, "Login");
            println!("Logged in as {}", user.display_name());
        }
        Commands::Logout => {
            auth.logout(&store)?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let token = require_token(&auth);
            let user = ok_or_exit(api.me(&token).await, "Whoami");
            if json {
                print_json(&user)?;
            } else {
                println!("{} ({} via {})", user.display_name(), user.email, user.provider);
            }
        }
        Commands::New {
            file,
            title,
            language,
            expires,
        } => {
            let mut form = ComposerForm {
                content: read_content(file)?,
                expires_in: expires,
                ..ComposerForm::default()
            };
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(language) = language {
                form.language = language;
            }

            let mut composer = Composer::with_form(form);
            let request = match composer.begin_create() {
                Ok(request) => request,
                Err(err) => {
                    eprintln!("New failed: {err}");
                    std::process::exit(1);
                }
            };
            let created = ok_or_exit(api.create_paste(auth.token(), &request).await, "New");
            composer.finish(Ok(()));
            if json {
                print_json(&created)?;
            } else {
                println!("{}", output::format_created(&created));
            }
        }
        Commands::Get { id } => {
            let paste = ok_or_exit(api.get_paste(&id, auth.token()).await, "Get");
            if json {
                print_json(&paste)?;
            } else {
                println!("{}", output::format_paste(&paste));
            }
        }
        Commands::Raw { id } => {
            let content = ok_or_exit(api.get_raw(&id).await, "Raw");
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
        }
        Commands::Edit {
            id,
            file,
            title,
            language,
        } => {
            let token = require_token(&auth);
            let paste = ok_or_exit(api.get_paste(&id, Some(token.as_str())).await, "Edit");
            // Mirror the server-side ownership check before any work is done.
            if !paste.is_owner {
                eprintln!("Edit failed: you can only edit your own pastes");
                std::process::exit(1);
            }

            let content = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => paste.content.clone(),
            };
            let form = ComposerForm {
                content,
                title: title
                    .or_else(|| paste.title.clone())
                    .unwrap_or_default(),
                language: language.unwrap_or_else(|| paste.language.clone()),
                ..ComposerForm::default()
            };

            let mut composer = Composer::with_form(form);
            let request = match composer.begin_update() {
                Ok(request) => request,
                Err(err) => {
                    eprintln!("Edit failed: {err}");
                    std::process::exit(1);
                }
            };
            let updated = ok_or_exit(api.update_paste(&token, &id, &request).await, "Edit");
            composer.finish(Ok(()));
            if json {
                print_json(&updated)?;
            } else {
                println!("Updated paste: {}", updated.id);
            }
        }
        Commands::Delete { id, yes } => {
            let token = require_token(&auth);
            if !yes && !confirm(&format!("Delete paste {id}? This cannot be undone."))? {
                println!("Cancelled");
                return Ok(());
            }
            ok_or_exit(api.delete_paste(&token, &id).await, "Delete");
            println!("Deleted paste: {id}");
        }
        Commands::List {
            search,
            language,
            sort,
            page,
        } => {
            let token = require_token(&auth);
            let sort: SortKey = match sort.parse() {
                Ok(sort) => sort,
                Err(message) => {
                    eprintln!("List failed: {message}");
                    std::process::exit(1);
                }
            };

            let mut ctl = QueryController::new();
            if let Some(search) = search {
                ctl.set_search(&search);
            }
            ctl.set_language(language.as_deref());
            ctl.set_sort(sort);
            ctl.set_page(page);

            let result = ok_or_exit(api.my_pastes(&token, ctl.query()).await, "List");
            if json {
                print_json(&result)?;
            } else {
                println!("{}", output::format_list(&result));
            }
        }
        Commands::Recent { limit } => {
            let items = ok_or_exit(api.recent_pastes(limit).await, "Recent");
            if json {
                print_json(&items)?;
            } else if items.is_empty() {
                println!("No public pastes yet");
            } else {
                println!("{}", output::format_summary_rows(&items));
            }
        }
        Commands::Stats => {
            if let Some(token) = auth.token() {
                let stats = ok_or_exit(api.user_stats(token).await, "Stats");
                if json {
                    print_json(&stats)?;
                } else {
                    println!("{}", output::format_user_stats(&stats));
                }
            } else {
                let stats = ok_or_exit(api.public_stats().await, "Stats");
                if json {
                    print_json(&stats)?;
                } else {
                    println!("{}", output::format_public_stats(&stats));
                }
            }
        }
        Commands::Languages => {
            let token = require_token(&auth);
            let languages = ok_or_exit(api.user_languages(&token).await, "Languages");
            if json {
                print_json(&languages)?;
            } else if languages.is_empty() {
                println!("No pastes yet");
            } else {
                for language in languages {
                    println!("{language}");
                }
            }
        }
        Commands::Browse => {
            browse::run(api, &auth)?;
        }
    }

    Ok(())
}
