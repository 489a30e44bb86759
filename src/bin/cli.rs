//! ScopeKV CLI Client
//!
//! Command-line interface for interacting with ScopeKV.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use clap::{Parser, Subcommand};
use scopekv::protocol::{read_response, write_command, Command, Reply, Response};
use scopekv::{OwnerId, Result, StoreError};

/// ScopeKV CLI
#[derive(Parser, Debug)]
#[command(name = "scopekv-cli")]
#[command(about = "CLI for the ScopeKV namespaced key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7171")]
    server: String,

    /// Identity to act as (required for writes and own-namespace reads)
    #[arg(short, long)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a key-value pair in your namespace
    Set { key: String, value: String },

    /// Get a value from your namespace
    Get { key: String },

    /// Get a value from another owner's namespace
    GetFrom { target: String, key: String },

    /// Delete a key from your namespace
    Del { key: String },

    /// Check whether a key exists in your namespace
    Exists { key: String },

    /// Check whether a key exists in another owner's namespace
    ExistsFor { target: String, key: String },

    /// List all keys in your namespace
    Keys,

    /// List all keys in another owner's namespace
    KeysFor { target: String },

    /// Count keys in your namespace
    Count,

    /// Count keys in another owner's namespace
    CountFor { target: String },

    /// Page through your namespace's keys
    Page { offset: u64, limit: u64 },

    /// Page through another owner's keys
    PageFor {
        target: String,
        offset: u64,
        limit: u64,
    },

    /// Ping the server
    Ping,
}

impl Commands {
    fn into_wire(self) -> Command {
        match self {
            Commands::Set { key, value } => Command::Set { key, value },
            Commands::Get { key } => Command::Get { key },
            Commands::GetFrom { target, key } => Command::GetFrom {
                owner: OwnerId::new(target),
                key,
            },
            Commands::Del { key } => Command::Remove { key },
            Commands::Exists { key } => Command::Exists { key },
            Commands::ExistsFor { target, key } => Command::ExistsFor {
                owner: OwnerId::new(target),
                key,
            },
            Commands::Keys => Command::Keys,
            Commands::KeysFor { target } => Command::KeysFor {
                owner: OwnerId::new(target),
            },
            Commands::Count => Command::Count,
            Commands::CountFor { target } => Command::CountFor {
                owner: OwnerId::new(target),
            },
            Commands::Page { offset, limit } => Command::Page { offset, limit },
            Commands::PageFor {
                target,
                offset,
                limit,
            } => Command::PageFor {
                owner: OwnerId::new(target),
                offset,
                limit,
            },
            Commands::Ping => Command::Ping,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let stream = TcpStream::connect(&args.server)
        .map_err(|e| StoreError::Network(format!("Failed to connect to {}: {}", args.server, e)))?;
    stream.set_nodelay(true)?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    // Bind our identity first so writes and own-namespace reads work
    if let Some(owner) = &args.owner {
        let hello = Command::Hello {
            owner: OwnerId::new(owner.clone()),
        };
        write_command(&mut writer, &hello)?;
        into_result(read_response(&mut reader)?)?;
    }

    write_command(&mut writer, &args.command.into_wire())?;
    let reply = into_result(read_response(&mut reader)?)?;
    print_reply(reply);

    Ok(())
}

/// Turn a wire response into a reply or the matching error
fn into_result(response: Response) -> Result<Reply> {
    match response {
        Response::Ok(reply) => Ok(reply),
        Response::NotFound => Err(StoreError::KeyNotFound),
        Response::Unauthorized => Err(StoreError::Unauthorized),
        Response::Error(message) => Err(StoreError::Network(message)),
    }
}

fn print_reply(reply: Reply) {
    match reply {
        Reply::None => println!("OK"),
        Reply::Value(value) => println!("{}", value),
        Reply::Flag(flag) => println!("{}", flag),
        Reply::Count(count) => println!("{}", count),
        Reply::Keys(keys) => {
            for key in keys {
                println!("{}", key);
            }
        }
        Reply::Page(page) => {
            for key in &page.keys {
                println!("{}", key);
            }
            println!("(has more: {})", page.has_more);
        }
        Reply::Pong => println!("PONG"),
    }
}
