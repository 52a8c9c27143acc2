mod commands;
mod config;
mod editor;
mod format;
mod id;
mod query;
mod render;
mod storage;
mod store;
mod types;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::Usage;
use config::Config;
use editor::ExternalEditor;
use query::ListArgs;
use std::io::IsTerminal;
use std::path::PathBuf;
use storage::FileStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ti")]
#[command(about = "A distributed issue tracker that keeps its tickets next to your code")]
#[command(
    long_about = "Tickets live in .tickets/ as Markdown files with YAML frontmatter,
so they travel with the repository and merge like any other file.

Commands that take an optional <ticket-id> act on the checked-out ticket
when it is omitted. Ticket ids may be shortened to any unique prefix, or
given as the row number from the last `ti list`.

Workflow:
  1. ti init                        # Create .tickets/
  2. ti new --title \"Fix login\"     # Open a ticket (omit --title for $EDITOR)
  3. ti list                        # See what's open
  4. ti checkout 1                  # Work on the first ticket
  5. ti comment -m \"Found it\"       # Leave a note
  6. ti state resolved              # Close it out"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ticket tracking in current directory
    Init,

    /// Recent ticket activity
    Recent {
        /// Only show activity for this ticket
        ticket_id: Option<String>,
    },

    /// Add or remove ticket tags
    #[command(override_usage = "ti tag [OPTIONS] [TICKET_ID] <TAG1,TAG2...>")]
    Tag {
        /// [ticket-id] tag1,tag2...
        args: Vec<String>,
        /// Remove the tags instead of adding them
        #[arg(short = 'd', long)]
        remove: bool,
    },

    /// Comment on a ticket (opens $EDITOR without --message or --file)
    Comment {
        ticket_id: Option<String>,
        /// Comment text
        #[arg(short, long)]
        message: Option<String>,
        /// Read the comment from a file (at most 2048 bytes)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check out a ticket so later commands can omit its id
    Checkout { ticket_id: String },

    /// Change the state of a ticket
    #[command(override_usage = "ti state [TICKET_ID] <STATE>")]
    State {
        /// Ticket id, or the new state for the checked-out ticket
        id_or_state: String,
        /// New state
        state: Option<String>,
    },

    /// Assign a ticket to a user
    Assign {
        ticket_id: Option<String>,
        /// Assign to this user instead of yourself
        #[arg(short, long)]
        user: Option<String>,
        /// Check out this ticket first
        #[arg(short, long, value_name = "TICKET_ID")]
        checkout: Option<String>,
    },

    /// Show existing tickets
    #[command(alias = "ls")]
    List {
        /// Name of a saved query
        saved_query: Option<String>,
        #[command(flatten)]
        args: ListArgs,
    },

    /// Show a single ticket
    Show { ticket_id: Option<String> },

    /// Create a new ticket (opens $EDITOR without --title)
    New {
        #[arg(long)]
        title: Option<String>,
    },
}

fn main() {
    init_tracing();
    // bad arguments are a usage message like any other; help and version
    // keep clap's own handling
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            print!("{}", e);
            return;
        }
    };
    let config = Config::from_env();

    if let Err(e) = run(cli, &config) {
        if let Some(usage) = e.downcast_ref::<Usage>() {
            println!("{}", usage);
            return;
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TICKETS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli, config: &Config) -> Result<()> {
    let dir = FileStore::locate(config.tickets_dir.as_deref());
    let mut out = std::io::stdout().lock();

    if let Commands::Init = cli.command {
        return commands::cmd_init(&dir, &mut out);
    }

    let store = FileStore::open(dir, config.user.clone())?;
    let editor = ExternalEditor::new(config.editor.clone());

    match cli.command {
        Commands::Init => Ok(()),
        Commands::Recent { ticket_id } => {
            commands::cmd_recent(&store, &mut out, ticket_id.as_deref())
        }
        Commands::Tag { args, remove } => commands::cmd_tag(&store, &args, remove),
        Commands::Comment {
            ticket_id,
            message,
            file,
        } => commands::cmd_comment(
            &store,
            &editor,
            ticket_id.as_deref(),
            message.as_deref(),
            file.as_deref(),
        ),
        Commands::Checkout { ticket_id } => commands::cmd_checkout(&store, &ticket_id),
        Commands::State { id_or_state, state } => {
            commands::cmd_state(&store, &id_or_state, state.as_deref())
        }
        Commands::Assign {
            ticket_id,
            user,
            checkout,
        } => commands::cmd_assign(
            &store,
            ticket_id.as_deref(),
            user.as_deref(),
            checkout.as_deref(),
        ),
        Commands::List { saved_query, args } => {
            commands::cmd_list(&store, &mut out, args, saved_query)
        }
        Commands::Show { ticket_id } => commands::cmd_show(&store, &mut out, ticket_id.as_deref()),
        Commands::New { title } => commands::cmd_new(&store, &editor, &mut out, title.as_deref()),
    }
}
