use register_dapp::schema::REGISTER;

use crate::{cli::AbiArgs, error::Result};

pub fn run(args: AbiArgs) -> Result<()> {
    let abi = REGISTER.to_abi_json();

    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&abi)?);
    } else {
        println!("{}", serde_json::to_string(&abi)?);
    }

    Ok(())
}
