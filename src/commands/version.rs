use anyhow::Result;
use std::io::Write;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const GIT_COMMIT: &str = match option_env!("TINCAN_GIT_COMMIT") {
    Some(commit) => commit,
    None => "unknown",
};

pub const BUILD_DATE: &str = match option_env!("TINCAN_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

pub fn run<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "tincan {}", VERSION)?;
    writeln!(out, "  commit: {}", GIT_COMMIT)?;
    writeln!(out, "  built:  {}", BUILD_DATE)?;
    Ok(())
}
