use register_dapp::render::Page;

use crate::{cli::SessionOptions, error::Result};

use super::{block_on, controller};

pub fn run(args: SessionOptions) -> Result<()> {
    let mut controller = controller(&args)?;

    block_on(controller.page_ready())??;

    println!("{}", Page::new(&controller.state()));
    Ok(())
}
