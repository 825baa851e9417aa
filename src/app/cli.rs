use clap::Parser;

/// Dump the structure of a MySQL/MariaDB schema as JSON.
///
/// Every connection option falls back to an environment variable (a `.env`
/// file is honored) when the flag is omitted.
#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database server host. Falls back to DB_HOST, then "localhost".
    #[arg(long)]
    pub host: Option<String>,

    /// Server port. Falls back to DB_PORT, then 3306.
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Login user. Falls back to DB_USERNAME.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Login password. Falls back to DB_PASSWORD, then empty.
    #[arg(short, long)]
    pub password: Option<String>,

    /// Schema to extract. Falls back to DB_SCHEMA.
    #[arg(short, long)]
    pub schema: Option<String>,

    /// Indent the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Print the databases visible to the user instead of extracting a schema.
    #[arg(long)]
    pub list_databases: bool,
}
