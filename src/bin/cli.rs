//! amiwire CLI Client
//!
//! Command-line interface for querying an Asterisk manager.

use std::process::ExitCode;

use amiwire::{Config, Record, Session};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// amiwire CLI
#[derive(Parser, Debug)]
#[command(name = "amiwire-cli")]
#[command(about = "CLI for the Asterisk Manager Interface")]
#[command(version)]
struct Args {
    /// Manager host
    #[arg(short = 'H', long, env = "AMI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Manager port
    #[arg(short, long, env = "AMI_PORT", default_value_t = amiwire::config::DEFAULT_PORT)]
    port: u16,

    /// Login username
    #[arg(short, long, env = "AMI_USERNAME")]
    username: String,

    /// Login secret
    #[arg(short, long, env = "AMI_SECRET", hide_env_values = true)]
    secret: String,

    /// Read timeout in milliseconds; a reply that stalls this long is complete
    #[arg(short, long, default_value = "1000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show one SIP peer
    Peer {
        /// Peer name
        name: String,
    },

    /// List SIP peers
    Peers,

    /// Show queues with their members
    Queues,

    /// Read an AstDB value
    DbGet { family: String, key: String },

    /// Write an AstDB value
    DbPut {
        family: String,
        key: String,
        value: String,
    },

    /// Delete an AstDB value
    DbDel { family: String, key: String },

    /// Run a CLI command on the server
    Command {
        /// Command words, e.g. `core show version`
        #[arg(required = true, trailing_var_arg = true)]
        words: Vec<String>,
    },

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,amiwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> amiwire::Result<()> {
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .credentials(args.username, args.secret)
        .read_timeout_ms(args.timeout_ms)
        .build();

    let mut session = Session::connect(config)?;
    if let Some(banner) = session.banner() {
        tracing::debug!("Server: {}", banner);
    }

    match args.command {
        Commands::Peer { name } => match session.sip_peer(&name)? {
            Some(peer) => print!("{}", peer),
            None => println!("peer {} not found", name),
        },
        Commands::Peers => {
            for (name, peer) in session.sip_peers()? {
                print_section(&name, &peer);
            }
        }
        Commands::Queues => {
            for (name, queue) in session.queue_status()? {
                print_section(&name, &queue.params);
                for (member, record) in &queue.members {
                    println!("  member {}", member);
                    for (key, value) in record.iter() {
                        println!("    {}: {}", key, value);
                    }
                }
                for entry in &queue.entries {
                    println!(
                        "  caller {} at position {}",
                        entry.get("callerid").or(entry.get("calleridnum")).unwrap_or("?"),
                        entry.get("position").unwrap_or("?")
                    );
                }
            }
        }
        Commands::DbGet { family, key } => match session.db_get(&family, &key)? {
            Some(value) => println!("{}", value),
            None => println!("{}/{} not set", family, key),
        },
        Commands::DbPut { family, key, value } => {
            session.db_put(&family, &key, &value)?;
            println!("ok");
        }
        Commands::DbDel { family, key } => {
            session.db_del(&family, &key)?;
            println!("ok");
        }
        Commands::Command { words } => {
            print!("{}", session.command(&words.join(" "))?);
        }
        Commands::Ping => {
            session.ping()?;
            println!("pong");
        }
    }

    Ok(())
}

fn print_section(name: &str, record: &Record) {
    println!("[{}]", name);
    for (key, value) in record.iter() {
        println!("  {}: {}", key, value);
    }
}
