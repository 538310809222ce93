// Touch/pinch gesture state shared by the globe view's touch handlers.
#[derive(Debug, Clone, Default)]
pub struct TouchState {
    pub single_active: bool,
    pub pinch: bool,
    pub start_pinch_dist: f64,
    pub start_zoom: f64,
}
