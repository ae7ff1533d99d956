//! An interactive RCON console, and a harness for one-off commands.

use std::io::{self, BufRead, Write};

use clap::Parser;
use rcon::{Charset, FragmentStrategy, RconClient, RconClientConfigBuilder};

/// Connect to a Source RCON server and either run one command or start an interactive shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server hostname or IP address.
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server RCON port.
    #[arg(short, long, default_value_t = 25575)]
    port: u16,

    /// RCON password. Prompted for interactively if omitted.
    #[arg(short = 'P', long)]
    password: Option<String>,

    /// Fragment-resolution strategy to use for multi-packet responses.
    #[arg(short, long, value_enum, default_value_t = CliFragmentStrategy::ActiveProbe)]
    strategy: CliFragmentStrategy,

    /// Decode payloads as ISO-8859-1 instead of UTF-8.
    #[arg(long)]
    latin1: bool,

    /// A single command to run non-interactively. Starts an interactive shell if omitted.
    command: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFragmentStrategy {
    PacketSize,
    Timeout,
    ActiveProbe,
}

impl From<CliFragmentStrategy> for FragmentStrategy {
    fn from(value: CliFragmentStrategy) -> Self {
        match value {
            CliFragmentStrategy::PacketSize => FragmentStrategy::PacketSize,
            CliFragmentStrategy::Timeout => FragmentStrategy::Timeout,
            CliFragmentStrategy::ActiveProbe => FragmentStrategy::ActiveProbe,
        }
    }
}

fn main() -> rcon::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let password = match args.password {
        Some(password) => password,
        None => prompt_password()?,
    };

    let config = RconClientConfigBuilder::new(args.host.clone(), args.port, password)
        .charset(if args.latin1 { Charset::Iso8859_1 } else { Charset::default() })
        .fragment_strategy(args.strategy.into())
        .build();

    let mut client = RconClient::new(config);

    match args.command {
        Some(command) => {
            let response = client.send_command(&command)?;
            println!("{response}");
        }
        None => run_shell(&mut client)?,
    }

    client.close()
}

fn run_shell(client: &mut RconClient) -> rcon::Result<()> {
    let stdin = io::stdin();
    loop {
        print!("rcon> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command == "quit" || command == "exit" {
            break;
        }

        match client.send_command(command) {
            Ok(response) => println!("{response}"),
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}

fn prompt_password() -> rcon::Result<String> {
    eprint!("password: ");
    io::stderr().flush().ok();
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
