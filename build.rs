// Generates the man page and shell completions from the CLI definition.
// src/cli.rs is included verbatim, so it must stay self-contained.

include!("src/cli.rs");

use clap::CommandFactory;
use clap_complete::{generate_to, Shell};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let cmd = Cli::command();

    let man = clap_mangen::Man::new(cmd.clone());
    let mut buffer: Vec<u8> = Vec::new();
    man.render(&mut buffer)?;
    fs::write(out_dir.join("dc-firstboot.1"), buffer)?;

    let mut cmd = cmd;
    for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
        generate_to(shell, &mut cmd, "dc-firstboot", &out_dir)?;
    }

    Ok(())
}
