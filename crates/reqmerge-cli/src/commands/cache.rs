//! Cache command implementation.

use miette::Result;
use reqmerge_core::config::GlobalConfig;
use reqmerge_core::package::PackageName;
use reqmerge_core::store::CacheStore;

use crate::cli::CacheAction;

pub fn exec(config: &GlobalConfig, action: CacheAction) -> Result<()> {
    let store = CacheStore::new(config.cache.path());
    match action {
        CacheAction::Path => {
            println!("{}", store.root().display());
            Ok(())
        }
        CacheAction::Clear { packages } => {
            let names: Vec<PackageName> = packages.iter().map(PackageName::new).collect();
            let removed = store.clear_registry(&names)?;
            if removed == 0 {
                println!("Nothing to clear");
            } else {
                reqmerge_util::progress::status(
                    "Cleared",
                    &format!("{removed} cached package record(s)"),
                );
            }
            Ok(())
        }
    }
}
