use register_dapp::{
    deploy::{self, Artifact, DeployOptions, REGISTER_CAPACITY},
    schema::REGISTER,
};

use crate::{error::Result, ui};

use super::{block_on, load_config, resolver};

pub fn run() -> Result<()> {
    let config = load_config(None)?;
    let artifact = Artifact::load(&config.artifact)?;
    let resolver = resolver(&config);

    ui::status(format!(
        "Deploying {} (capacity {REGISTER_CAPACITY}) via {}",
        REGISTER.name, config.rpc_url
    ));

    let options = DeployOptions {
        capacity: REGISTER_CAPACITY,
        poll_interval: config.poll_interval(),
        timeout: config.confirmation_timeout(),
    };
    let deployment = block_on(deploy::deploy(&resolver, &artifact, options))??;

    println!("Register Contract Address: {}", deployment.address);
    ui::success(format!(
        "Deployed in block {} by {}",
        deployment.block_number, deployment.transaction_hash
    ));
    Ok(())
}
