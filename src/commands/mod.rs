pub mod backup;
pub mod clean;
pub mod import;
pub mod migrate;
pub mod validate;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while an external tool runs.
pub(crate) fn stage_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("static template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
