use hello_cube::{ViewerConfig, flow};

fn main() -> anyhow::Result<()> {
    flow::init_logging();
    // e.g. HELLO_CUBE="clear=%23000000&spin=0.01,0.01"
    let config = ViewerConfig::from_env()?;
    flow::run(config)
}
