use crate::topology::{self, Profile};

pub fn handle(profile: Profile) -> anyhow::Result<()> {
    let config = topology::build(profile)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
