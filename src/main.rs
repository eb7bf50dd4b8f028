use eframe::egui;

mod api;
mod app;
mod geometry;
mod overlay;
mod presentation;
mod upload;
mod workflow;

use crate::api::DEFAULT_ENDPOINT;
use crate::app::DamageCheckApp;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: damage-check [assess-endpoint-url]");
        std::process::exit(1);
    }
    let endpoint = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    log::info!("starting damage-check against {endpoint}");

    let title = "damage-check — Vehicle Damage Assessment";
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(DamageCheckApp::new(endpoint)))),
    )
    .expect("Failed to run eframe");
}
