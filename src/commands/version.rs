use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("taskpro version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
