use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "fiscal",
    version,
    about = "Import Brazilian fiscal documents (NF-e and CT-e) into a local store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Init(InitArgs),
    Process(ProcessArgs),
    SearchClients(SearchArgs),
    SearchProducts(SearchArgs),
    AddClient(AddClientArgs),
    AddProduct(AddProductArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "fiscal.db")]
    pub db_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    #[arg(long, default_value = "fiscal.db")]
    pub db_path: PathBuf,

    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, default_value = "fiscal.db")]
    pub db_path: PathBuf,

    pub query: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddClientArgs {
    #[arg(long, default_value = "fiscal.db")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub cnpj_cpf: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub fantasy_name: String,

    #[arg(long, default_value = "")]
    pub address: String,

    #[arg(long, default_value = "")]
    pub city: String,

    #[arg(long, default_value = "")]
    pub state: String,

    #[arg(long, default_value = "")]
    pub cep: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddProductArgs {
    #[arg(long, default_value = "fiscal.db")]
    pub db_path: PathBuf,

    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub description: String,

    #[arg(long, default_value = "")]
    pub ncm: String,

    #[arg(long, default_value = "")]
    pub unit: String,
}
