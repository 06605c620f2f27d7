//! Line-oriented command parsing for the terminal host.

use super::messages::Message;
use interlinear_core::SessionCommand;

pub const HELP: &str = "\
commands:
  n, next          next page
  p, prev          previous page
  g N              go to page N
  o                toggle overlay
  esc              close overlay
  + / -            font size up / down
  m+ / m-          margin up / down
  font N           set font size
  margin N         set margin
  resize W H       viewport resized to W x H
  s                show status
  h                this help
  q                save and quit";

/// Parse one input line. Blank lines produce nothing.
pub fn parse_line(line: &str) -> Option<Message> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("n" | "next", []) => SessionCommand::NextPage,
        ("p" | "prev", []) => SessionCommand::PrevPage,
        ("g" | "goto", [page]) => match page.parse::<usize>() {
            Ok(page) if page >= 1 => SessionCommand::GoToPage { page: page - 1 },
            _ => return Some(invalid(line, "page numbers start at 1")),
        },
        ("o" | "overlay", []) => SessionCommand::ToggleOverlay,
        ("esc" | "escape", []) => SessionCommand::HideOverlay,
        ("+", []) => SessionCommand::AdjustFontSize { steps: 1 },
        ("-", []) => SessionCommand::AdjustFontSize { steps: -1 },
        ("m+", []) => SessionCommand::AdjustMargin { steps: 1 },
        ("m-", []) => SessionCommand::AdjustMargin { steps: -1 },
        ("font", [size]) => match size.parse::<u32>() {
            Ok(size) => SessionCommand::SetFontSize { size },
            Err(_) => return Some(invalid(line, "font size must be a whole number")),
        },
        ("margin", [margin]) => match margin.parse::<u32>() {
            Ok(margin) => SessionCommand::SetMargin { margin },
            Err(_) => return Some(invalid(line, "margin must be a whole number")),
        },
        ("resize", [width, height]) => match (width.parse::<f32>(), height.parse::<f32>()) {
            (Ok(width), Ok(height)) => SessionCommand::ViewportResize { width, height },
            _ => return Some(invalid(line, "resize takes a width and a height")),
        },
        ("s" | "status", []) => SessionCommand::GetSnapshot,
        ("h" | "help" | "?", []) => return Some(Message::Help),
        ("q" | "quit", []) => return Some(Message::Quit),
        _ => return Some(invalid(line, "unknown command; type h for help")),
    };
    Some(Message::Command(command))
}

fn invalid(line: &str, reason: &str) -> Message {
    Message::Invalid {
        line: line.trim().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> SessionCommand {
        match parse_line(line) {
            Some(Message::Command(command)) => command,
            other => panic!("expected a command for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn navigation_commands() {
        assert!(matches!(command("n"), SessionCommand::NextPage));
        assert!(matches!(command("  PREV "), SessionCommand::PrevPage));
        assert!(matches!(command("g 3"), SessionCommand::GoToPage { page: 2 }));
    }

    #[test]
    fn display_commands() {
        assert!(matches!(command("+"), SessionCommand::AdjustFontSize { steps: 1 }));
        assert!(matches!(command("m-"), SessionCommand::AdjustMargin { steps: -1 }));
        assert!(matches!(command("font 24"), SessionCommand::SetFontSize { size: 24 }));
        assert!(matches!(command("margin 40"), SessionCommand::SetMargin { margin: 40 }));
        assert!(matches!(command("esc"), SessionCommand::HideOverlay));
        match command("resize 800 600.5") {
            SessionCommand::ViewportResize { width, height } => {
                assert_eq!((width, height), (800.0, 600.5));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(matches!(parse_line("g 0"), Some(Message::Invalid { .. })));
        assert!(matches!(parse_line("font big"), Some(Message::Invalid { .. })));
        assert!(matches!(parse_line("dance"), Some(Message::Invalid { .. })));
        assert!(matches!(parse_line("n 2"), Some(Message::Invalid { .. })));
    }

    #[test]
    fn quit_and_help() {
        assert!(matches!(parse_line("q"), Some(Message::Quit)));
        assert!(matches!(parse_line("?"), Some(Message::Help)));
    }
}
