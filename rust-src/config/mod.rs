//! Configuration and settings for ccheat30.

mod settings;

#[allow(unused_imports)]
pub use settings::{
    default_output_path,
    parse_timezone,
    resolve_color_support,
    today_in,
    ColorChoice,
    ColorEnv,
    ColorSupport,
    HeatmapConfig,
    DEFAULT_SVG_NAME,
    PALETTE,
};
