pub(super) fn default_position() -> String {
    "top-center".to_string()
}

pub(super) const fn default_gutter() -> f32 {
    8.0
}
