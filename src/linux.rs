use crate::{cli, headless};

fn init_platform() {
    env_logger::init();
}

/// Native entry point: replay a click script offscreen and save a PNG
pub fn app_main() {
    init_platform();

    let args = cli::parse_cli();
    log::debug!("shapegl::app_main: {args:?}");

    if let Err(e) = pollster::block_on(headless::run(args)) {
        log::error!("shapegl::app_main: {e:?}");
        std::process::exit(1);
    }
}
