use std::path::Path;

use anyhow::Result;
use vergen::{vergen, Config};

fn main() -> Result<()> {
    // trigger recompilation when a new migration is added
    println!("cargo:rerun-if-changed=migrations");

    let mut config = Config::default();
    // Builds from a source archive have no git metadata.
    if !Path::new(".git").exists() {
        *config.git_mut().enabled_mut() = false;
    }

    vergen(config)
}
