//! Dark - the default theme

pub const THEME: &str = r##"# Dark theme for chatline

[meta]
name = "Dark"
version = 1

[background]
primary = "#0F0F0F"
secondary = "#1A1A1A"
sidebar = "#0A0A0A"
message_user = "#2D5BFF"
message_bot = "#252525"
hover = "#2A2A2A"
input = "#1F1F1F"

[text]
primary = "#FFFFFF"
secondary = "#B0B0B0"
tertiary = "#808080"
muted = "#606060"

[border]
primary = "#2A2A2A"
secondary = "#1F1F1F"
active = "#3D3D3D"

[accent]
primary = "#2D5BFF"
hover = "#4169FF"
danger = "#FF4444"
danger_hover = "#FF6666"

[ui]
border_type = "rounded"
"##;
