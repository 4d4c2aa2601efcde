use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cashmachine")]
#[command(author, version, about = "Personal cash machine: Telegram bot and game API over one SQLite ledger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot and the API in one process (default)
    Run {
        /// Override API_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run only the Telegram bot
    Bot,

    /// Run only the HTTP API
    Api {
        /// Override API_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create or migrate the database and exit
    InitDb {
        /// Override DATABASE_PATH
        #[arg(long)]
        database: Option<String>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
