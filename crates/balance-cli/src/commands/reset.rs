use super::{open_store, CmdResult};

pub fn run(yes: bool) -> CmdResult {
    if !yes {
        return Err("refusing to reset without --yes".into());
    }
    let mut store = open_store()?;
    store.reset_all_data()?;
    println!("all data reset");
    Ok(())
}
