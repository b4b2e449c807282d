use anyhow::Result;

fn main() -> Result<()> {
    ease_cli::main_entry()
}
