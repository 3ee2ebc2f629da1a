use std::io::{self, IsTerminal};

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// ANSI color wrapper for terminal output.
#[derive(Clone, Copy)]
pub struct Colors {
    enabled: bool,
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Priority: --no-color > NO_COLOR env > TTY detection
pub fn should_use_colors(no_color: bool) -> bool {
    if no_color {
        return false;
    }
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_colors_pass_text_through() {
        let colors = Colors::new(false);
        assert_eq!(colors.error("boom"), "boom");
        assert_eq!(colors.success("ok"), "ok");
    }

    #[test]
    fn test_enabled_colors_wrap_with_reset() {
        let colors = Colors::new(true);
        let painted = colors.warning("careful");
        assert!(painted.starts_with("\x1b[33m"));
        assert!(painted.ends_with(RESET));
    }
}
