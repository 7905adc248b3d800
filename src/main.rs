use anyhow::Result;

fn main() -> Result<()> {
    loglens::run().map_err(|err| anyhow::anyhow!("{err}"))
}
