//! Ocean - deep blue branded palette

pub const THEME: &str = r##"# Ocean theme for chatline
# Deep navy surfaces with a cyan accent

[meta]
name = "Ocean"
version = 1

[background]
primary = "#0A1929"
secondary = "#132F4C"
sidebar = "#001E3C"
message_user = "#00B4D8"
message_bot = "#1A3A52"
hover = "#1E4976"
input = "#0F2942"

[text]
primary = "#E3F2FD"
secondary = "#90CAF9"
tertiary = "#64B5F6"
muted = "#42A5F5"

[border]
primary = "#1E4976"
secondary = "#132F4C"
active = "#2A5B8C"

[accent]
primary = "#00B4D8"
hover = "#00D9FF"
danger = "#FF6B6B"
danger_hover = "#FF8787"

[ui]
border_type = "rounded"
"##;
