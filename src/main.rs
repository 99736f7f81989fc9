use anyhow::Result;
use clap::Parser;

mod batch;
mod cli;
mod commands;
mod config;
mod dataverse;
mod deposit;
mod entries;
mod ext;
mod fields;
mod report;
mod util;

use crate::cli::Cli;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  let env = env_logger::Env::default().filter_or("DV_BATCH_LOG", "info");
  env_logger::Builder::from_env(env)
    .format_timestamp(None)
    .format_module_path(false)
    .init();

  commands::run(cli)
}
