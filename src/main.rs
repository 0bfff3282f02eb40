mod app;
mod config;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;


use env_logger::Env;

use crate::app::App;
use crate::config::default_webview_data_dir;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView2 data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(dioxus::desktop::WindowBuilder::new().with_title("Master Data"))
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}
