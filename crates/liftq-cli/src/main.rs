mod command;
mod model;

fn main() -> anyhow::Result<()> {
    command::run()
}
