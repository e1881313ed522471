use rayon::ThreadPoolBuilder;
use anyhow::{anyhow, Result};
use log::error;
use crate::initialization::init;
use crate::worker::run;

mod initialization;
mod logging;
mod worker;

fn main() -> Result<()> {
    // Load config and set up logging. If initialization fails we can't even log.
    let config = match init() {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("Initialization failed: {}", e));
        }
    };

    ThreadPoolBuilder::new().num_threads(config.run.threads.max(1)).build_global()?;

    if let Err(e) = run(&config) {
        error!("Run failed: {}", e);
        return Err(e)?;
    }

    Ok(())
}
