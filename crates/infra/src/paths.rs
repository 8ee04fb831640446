use std::path::PathBuf;

use anyhow::Context;

const APP_DIR: &str = "shopcart";
const DB_FILE: &str = "cart.db";

/// `{data_dir}/shopcart/cart.db`, falling back to `~/.local/share` when the
/// platform has no data directory.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut home| {
                home.push(".local");
                home.push("share");
                home
            })
        })
        .context("failed to resolve app data directory: tried data_dir() and home_dir()/.local/share")?;

    Ok(base.join(APP_DIR).join(DB_FILE))
}
