//! Command-line host for the cliente registry client.

mod config;
mod logging;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use clientes_core::view::render_table;
use clientes_core::{
    format_cpf, format_date_display, ApiClient, Cliente, ClienteFilter, ClienteInput,
    ClienteListView, ClienteService, ClienteStatus, DateInput, Session, UreqTransport,
};

use crate::config::ClientConfig;
use crate::terminal::{TerminalNavigator, TerminalUi};

/// Manage cliente records on the registry API
#[derive(Parser)]
#[command(name = "clientes", version)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List clientes, optionally filtered
    List {
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        status: Option<ClienteStatus>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Show one cliente
    Show { id: u64 },
    /// Find a cliente by CPF (punctuation ignored)
    FindCpf { cpf: String },
    /// Check whether an email is free
    CheckEmail {
        email: String,
        /// Ignore this cliente's own address
        #[arg(long)]
        exclude: Option<u64>,
    },
    /// Create a cliente
    Create {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        status: Option<ClienteStatus>,
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        nascimento: Option<String>,
    },
    /// Create a randomly generated cliente
    CreateSample,
    /// Edit fields of an existing cliente
    Edit {
        id: u64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        cpf: Option<String>,
        #[arg(long)]
        status: Option<ClienteStatus>,
        /// Birth date, YYYY-MM-DD; empty clears it
        #[arg(long)]
        nascimento: Option<String>,
    },
    /// Delete a cliente
    Delete {
        id: u64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Change a cliente's status
    Status { id: u64, status: ClienteStatus },
    /// Store a bearer token for later requests
    Login { token: String },
    /// Forget the stored token
    Logout,
}

type View = ClienteListView<UreqTransport, TerminalUi>;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.base_url);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let command = cli.command.unwrap_or(Commands::List {
        nome: None,
        status: None,
        email: None,
    });
    let ok = run(&config, command)?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run(config: &ClientConfig, command: Commands) -> Result<bool> {
    let assume_yes = matches!(command, Commands::Delete { yes: true, .. });
    match command {
        Commands::Login { token } => {
            let store = config.token_store();
            store
                .save(&token)
                .with_context(|| format!("Failed to write {}", store.path().display()))?;
            println!("Token salvo em {}", store.path().display());
            Ok(true)
        }
        Commands::Logout => {
            let store = config.token_store();
            store
                .clear()
                .with_context(|| format!("Failed to remove {}", store.path().display()))?;
            println!("Sessão encerrada");
            Ok(true)
        }
        Commands::List { nome, status, email } => {
            let filter = ClienteFilter { nome, status, email };
            if filter == ClienteFilter::default() {
                let mut view = view(config, assume_yes)?;
                let ok = view.mount();
                println!("{}", view.render());
                return Ok(ok);
            }
            let clientes = service(config)?.filter(&filter)?;
            println!("{}", render_table(&clientes, None));
            Ok(true)
        }
        Commands::Show { id } => {
            print_cliente(&service(config)?.get_by_id(id)?);
            Ok(true)
        }
        Commands::FindCpf { cpf } => {
            print_cliente(&service(config)?.get_by_cpf(&cpf)?);
            Ok(true)
        }
        Commands::CheckEmail { email, exclude } => {
            let available = service(config)?.check_email_available(&email, exclude)?;
            println!("{email}: {}", if available { "disponível" } else { "em uso" });
            Ok(available)
        }
        Commands::Create {
            nome,
            email,
            cpf,
            status,
            nascimento,
        } => {
            let input = ClienteInput {
                nome,
                email,
                cpf,
                status,
                data_nascimento: nascimento.map(DateInput::from),
            };
            mounted(config, assume_yes, |view| view.create(input))
        }
        Commands::CreateSample => mounted(config, assume_yes, |view| view.create_sample()),
        Commands::Edit {
            id,
            nome,
            email,
            cpf,
            status,
            nascimento,
        } => mounted(config, assume_yes, |view| {
            if !view.begin_edit(id) {
                eprintln!("Cliente {id} não encontrado");
                return false;
            }
            if let Some(buffer) = view.edit_buffer_mut() {
                if let Some(nome) = nome {
                    buffer.nome = nome;
                }
                if let Some(email) = email {
                    buffer.email = email;
                }
                if let Some(cpf) = cpf {
                    buffer.cpf = cpf;
                }
                if let Some(status) = status {
                    buffer.status = status;
                }
                if let Some(nascimento) = nascimento {
                    buffer.data_nascimento = nascimento;
                }
            }
            view.save_edit()
        }),
        Commands::Delete { id, .. } => mounted(config, assume_yes, |view| view.delete(id)),
        Commands::Status { id, status } => {
            mounted(config, assume_yes, |view| view.set_status(id, status))
        }
    }
}

fn session(config: &ClientConfig) -> Result<Session> {
    let store = config.token_store();
    let token = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    Ok(Session::anonymous()
        .token(token)
        .login_route(config.login_route.clone())
        .navigator(Rc::new(TerminalNavigator)))
}

fn service(config: &ClientConfig) -> Result<ClienteService<UreqTransport>> {
    let transport = UreqTransport::new(Duration::from_millis(config.timeout_ms));
    let api = ApiClient::new(&config.base_url, transport, session(config)?);
    Ok(ClienteService::new(api))
}

fn view(config: &ClientConfig, assume_yes: bool) -> Result<View> {
    Ok(ClienteListView::new(
        service(config)?,
        TerminalUi::new(assume_yes),
    ))
}

/// Load the list, run one action, and print the refreshed table.
fn mounted(config: &ClientConfig, assume_yes: bool, action: impl FnOnce(&mut View) -> bool) -> Result<bool> {
    let mut view = view(config, assume_yes)?;
    if !view.mount() {
        bail!("{}", view.render());
    }
    let ok = action(&mut view);
    println!("{}", view.render());
    Ok(ok)
}

fn print_cliente(cliente: &Cliente) {
    println!("ID:            {}", cliente.id);
    println!("Nome:          {}", cliente.nome);
    println!("Email:         {}", cliente.email);
    println!("CPF:           {}", format_cpf(&cliente.cpf));
    println!("Status:        {}", cliente.status);
    println!(
        "Nascimento:    {}",
        format_date_display(cliente.data_nascimento.as_deref())
    );
    println!(
        "Inclusão:      {}",
        format_date_display(cliente.data_inclusao.as_deref())
    );
}
