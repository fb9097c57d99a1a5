mod app;
mod config;
mod decode;
mod error;
mod library;
mod outbox;
mod preview;
mod processing;
mod state;
mod submit;

use app::ImagePostApp;
use config::AppConfig;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    tracing::info!(
        library = %config.library_dir().display(),
        jpeg_quality = config.jpeg_quality(),
        "starting photopost"
    );

    let width = config.window_width.unwrap_or(1000.0);
    let height = config.window_height.unwrap_or(760.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Photopost")
            .with_app_id("photopost")
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "photopost",
        native_options,
        Box::new(|cc| Ok(Box::new(ImagePostApp::new(cc, config)))),
    )
}
