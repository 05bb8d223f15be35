use dialer_migrate::dialer_app::{self, DialerApp};
use dialer_migrate::log_capture;
use eframe::egui;

fn main() -> eframe::Result<()> {
    let log_level = log_capture::configured_log_level();
    log_capture::init_tracing(&log_level);

    dialer_app::init_common();

    // Phone-sized window so resizing behaves like a rotation
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 760.0])
            .with_min_inner_size([320.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Dialer",
        options,
        Box::new(|cc| {
            dialer_app::init_egui(&cc.egui_ctx);
            Ok(Box::<DialerApp>::default())
        }),
    )
}
