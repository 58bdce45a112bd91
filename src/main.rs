use anyhow::Result;

fn main() -> Result<()> {
    districtor::cli::entry()
}
