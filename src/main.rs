use lightbox::{config::DemoConfig, flow, logging};

fn main() -> anyhow::Result<()> {
    logging::init();
    let config = DemoConfig::from_args(std::env::args().skip(1))?;
    log::info!("starting with {config:?}");
    flow::run(config)
}
