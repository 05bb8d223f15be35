use android_activity::AndroidApp;
use eframe::NativeOptions;

use crate::dialer_app::{self, DialerApp};
use crate::log_capture;

// Android entry point
#[no_mangle]
pub fn android_main(app: AndroidApp) {
    let log_level = log_capture::configured_log_level();
    log_capture::init_tracing(&log_level);

    dialer_app::init_common();

    // Max level here, filtering is done by tracing
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Trace)
            .with_tag("DialerMigrate"),
    );

    log::info!("Android logger initialized");

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC OCCURRED: {}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic location: {}:{}", location.file(), location.line());
        }
    }));

    let options = NativeOptions {
        android_app: Some(app),
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    };

    match eframe::run_native(
        "Dialer",
        options,
        Box::new(|cc| {
            dialer_app::init_egui(&cc.egui_ctx);
            Ok(Box::<DialerApp>::default())
        }),
    ) {
        Ok(_) => log::info!("DialerApp exited successfully"),
        Err(e) => log::error!("DialerApp failed: {}", e),
    }
}
