pub mod abi;
pub mod completions;
pub mod deploy;
pub mod join;
pub mod page;

use std::{env, future::Future, sync::Arc};

use log::debug;
use register_dapp::{
    config::Config,
    provider::Resolver,
    rpc::JsonRpcProvider,
    state::Controller,
};

use crate::{cli::SessionOptions, error::Result, ui};

/// The dapp has a single thread of control.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

fn load_config(options: Option<&SessionOptions>) -> Result<Config> {
    let config = match options.and_then(|o| o.config.as_deref()) {
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };
    debug!("{config:?}");
    Ok(config)
}

fn resolver(config: &Config) -> Resolver<JsonRpcProvider> {
    Resolver::new(JsonRpcProvider::new(config.rpc_url.clone()), config.network())
        .with_alert(Arc::new(ui::TerminalAlert))
}

fn controller(options: &SessionOptions) -> Result<Controller<JsonRpcProvider>> {
    let config = load_config(Some(options))?;
    let provider = JsonRpcProvider::new(config.rpc_url.clone());
    Ok(Controller::from_config(provider, &config, Arc::new(ui::TerminalAlert))?)
}
