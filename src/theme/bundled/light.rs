//! Light

pub const THEME: &str = r##"# Light theme for chatline

[meta]
name = "Light"
version = 1

[background]
primary = "#FFFFFF"
secondary = "#F5F5F5"
sidebar = "#FAFAFA"
message_user = "#2D5BFF"
message_bot = "#F0F0F0"
hover = "#E8E8E8"
input = "#FFFFFF"

[text]
primary = "#1A1A1A"
secondary = "#666666"
tertiary = "#999999"
muted = "#AAAAAA"

[border]
primary = "#E0E0E0"
secondary = "#EEEEEE"
active = "#CCCCCC"

[accent]
primary = "#2D5BFF"
hover = "#4169FF"
danger = "#DC3545"
danger_hover = "#E55561"

[ui]
border_type = "rounded"
"##;
