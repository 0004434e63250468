use register_dapp::{render::Page, state::Phase};

use crate::{cli::SessionOptions, error::Result, ui};

use super::{block_on, controller};

pub fn run(args: SessionOptions) -> Result<()> {
    let mut controller = controller(&args)?;

    block_on(async {
        controller.page_ready().await?;
        match controller.state().phase() {
            Phase::Unjoined => {
                ui::status("Waiting for the join transaction to be mined");
                controller.join_clicked().await
            }
            Phase::Joined => {
                ui::warn("This wallet already joined the register");
                Ok(())
            }
            phase => {
                ui::warn(format!("Cannot join while {phase:?}"));
                Ok(())
            }
        }
    })??;

    println!("{}", Page::new(&controller.state()));
    Ok(())
}
