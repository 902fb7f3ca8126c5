use anyhow::{Result, bail};
use tracing::info;

use crate::cli::AddClientArgs;
use crate::db::Storage;
use crate::db::repository::ReceiverRepository;
use crate::model::Party;

pub fn run(args: AddClientArgs) -> Result<()> {
    let storage = Storage::open(&args.db_path)?;
    storage.ensure_schema()?;

    let party = Party {
        cnpj_cpf: args.cnpj_cpf.trim().to_string(),
        name: args.name,
        fantasy_name: args.fantasy_name,
        address: args.address,
        city: args.city,
        state: args.state,
        cep: args.cep,
    };

    let Some(id) = ReceiverRepository::new(&storage).upsert(&party)? else {
        bail!("a client requires a CNPJ or CPF");
    };

    info!(id, cnpj_cpf = %party.cnpj_cpf, name = %party.name, "client saved");
    Ok(())
}
