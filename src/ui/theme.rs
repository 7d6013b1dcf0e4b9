use ratatui::style::Color;

// Deep-space palette: near-black surfaces, cyan for what the visitor typed,
// neon green for the prompt and status dot.
//
// Keep roles here instead of sprinkling colors through the renderer.
pub const BG: Color = Color::Rgb(10, 14, 23);
pub const SURFACE: Color = Color::Rgb(20, 27, 43);
pub const BAR_BG: Color = Color::Rgb(30, 42, 69);

pub const FG: Color = Color::Rgb(241, 241, 243);
pub const MUTED: Color = Color::Rgb(168, 169, 188);
pub const DIM: Color = Color::Rgb(104, 105, 120);
pub const BORDER: Color = Color::Rgb(75, 42, 183);

pub const SECONDARY: Color = Color::Rgb(18, 216, 250);
pub const PROMPT: Color = Color::Rgb(0, 233, 128);

// Window-control dots and semantic colors (keep minimal).
pub const DOT_CLOSE: Color = Color::Rgb(255, 84, 112);
pub const DOT_WAIT: Color = Color::Rgb(247, 181, 56);
pub const ERROR: Color = DOT_CLOSE;
