use std::io::{stderr, Stderr};

pub(crate) type ProgressBar = pbr::ProgressBar<Stderr>;

/// Progress over trained tree nodes, reported on stderr.
pub(crate) fn create_progress_bar(total: u64) -> ProgressBar {
    let mut bar = ProgressBar::on(stderr(), total);
    bar.show_speed = false;
    bar
}
