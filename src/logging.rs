/// Installs `env_logger`. `RUST_LOG` wins when set; otherwise this crate logs
/// at `info` and wgpu at `warn`. Calling it twice only prints a warning.
pub fn init() {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    );
    if let Err(e) = builder.try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
