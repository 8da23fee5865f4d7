//! Terminal styling shared by the one-shot commands

use std::path::Path;

// ANSI color codes from design system
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const PRIMARY: &str = "\x1b[38;2;100;181;246m";      // #64B5F6
    pub const SUCCESS: &str = "\x1b[38;2;165;214;167m";      // #A5D6A7
    pub const WARNING: &str = "\x1b[38;2;255;245;157m";      // #FFF59D
    pub const ERROR: &str = "\x1b[38;2;239;154;154m";        // #EF9A9A
    pub const MUTED: &str = "\x1b[38;2;84;110;122m";         // #546E7A
    pub const FG: &str = "\x1b[38;2;212;212;215m";           // #D4D4D7
    pub const HIGHLIGHT: &str = "\x1b[38;2;255;183;77m";     // Orange highlight
}

pub mod symbols {
    pub const SEARCH: &str = "󰍉";
    pub const FILE: &str = "󰈙";
    pub const SUCCESS: &str = "󰄂";
    pub const WARNING: &str = "⚠";
}

pub fn print_warning(message: &str) {
    println!(
        "\n{}  {} {}{}",
        colors::WARNING, symbols::WARNING, message, colors::RESET
    );
}

/// Truncate a path for display
pub fn truncate_path(path: &Path, max_len: usize) -> String {
    let s = path.display().to_string();
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
