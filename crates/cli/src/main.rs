//! Carousel CLI
//!
//! Command-line interface for driving a carousel host.
//!
//! Each invocation prints one protocol signal line on stdout, so commands can
//! be piped straight into `carousel-host` or collected into a script.

use anyhow::Result;
use carousel_protocol::{encode_line, KeyName, Signal, Target};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;

#[derive(Parser)]
#[command(name = "carousel-cli")]
#[command(author, version, about = "Emit carousel host signals")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Click an arrow
    Click {
        #[arg(value_enum)]
        arrow: Arrow,
    },
    /// Press a key inside the wrapper
    Key {
        #[arg(value_enum)]
        key: KeyArg,
    },
    /// Move focus to an element
    Focus {
        #[command(subcommand)]
        target: TargetArg,
    },
    /// Take focus away from an element
    Blur {
        #[command(subcommand)]
        target: TargetArg,
    },
    /// Resize the wrapper
    Resize {
        /// New wrapper width in pixels
        width: f64,
    },
    /// Report that the running transition has finished
    TransitionEnd,
    /// Query carousel state
    Query,
    /// Detach the carousel
    Dispose,
    /// Stop the host
    Stop,
}

#[derive(Clone, Copy, ValueEnum)]
enum Arrow {
    /// The arrow revealing earlier items
    Left,
    /// The arrow revealing later items
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum KeyArg {
    Enter,
    Escape,
    Left,
    Right,
    Other,
}

#[derive(Subcommand)]
enum TargetArg {
    /// The carousel wrapper
    Wrapper,
    /// A link or input inside an item
    Control {
        /// Item position, starting at 0
        #[arg(short, long)]
        item: usize,
        /// Control position within the item (0 = link, 1 = input)
        #[arg(short = 'n', long, default_value = "1")]
        index: usize,
    },
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Wrapper => Target::Wrapper,
            TargetArg::Control { item, index } => Target::Control { item, index },
        }
    }
}

fn to_signal(command: Commands) -> Signal {
    match command {
        Commands::Click { arrow } => Signal::Click {
            target: match arrow {
                Arrow::Left => Target::LeftArrow,
                Arrow::Right => Target::RightArrow,
            },
        },
        Commands::Key { key } => Signal::Key {
            key: match key {
                KeyArg::Enter => KeyName::Enter,
                KeyArg::Escape => KeyName::Escape,
                KeyArg::Left => KeyName::ArrowLeft,
                KeyArg::Right => KeyName::ArrowRight,
                KeyArg::Other => KeyName::Other,
            },
        },
        Commands::Focus { target } => Signal::Focus {
            target: target.into(),
        },
        Commands::Blur { target } => Signal::Blur {
            target: target.into(),
        },
        Commands::Resize { width } => Signal::Resize { width },
        Commands::TransitionEnd => Signal::TransitionEnd,
        Commands::Query => Signal::Query,
        Commands::Dispose => Signal::Dispose,
        Commands::Stop => Signal::Stop,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let line = encode_line(&to_signal(cli.command))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Signal {
        let cli = Cli::try_parse_from(std::iter::once("carousel-cli").chain(args.iter().copied()))
            .unwrap();
        to_signal(cli.command)
    }

    #[test]
    fn test_click_commands() {
        assert_eq!(
            parse(&["click", "left"]),
            Signal::Click {
                target: Target::LeftArrow
            }
        );
        assert_eq!(
            parse(&["click", "right"]),
            Signal::Click {
                target: Target::RightArrow
            }
        );
    }

    #[test]
    fn test_key_commands() {
        assert_eq!(
            parse(&["key", "right"]),
            Signal::Key {
                key: KeyName::ArrowRight
            }
        );
        assert_eq!(
            parse(&["key", "escape"]),
            Signal::Key {
                key: KeyName::Escape
            }
        );
    }

    #[test]
    fn test_focus_control_defaults_to_input() {
        assert_eq!(
            parse(&["focus", "control", "--item", "5"]),
            Signal::Focus {
                target: Target::Control { item: 5, index: 1 }
            }
        );
        assert_eq!(
            parse(&["blur", "control", "-i", "2", "-n", "0"]),
            Signal::Blur {
                target: Target::Control { item: 2, index: 0 }
            }
        );
        assert_eq!(
            parse(&["focus", "wrapper"]),
            Signal::Focus {
                target: Target::Wrapper
            }
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse(&["resize", "698"]), Signal::Resize { width: 698.0 });
        assert_eq!(parse(&["transition-end"]), Signal::TransitionEnd);
        assert_eq!(parse(&["query"]), Signal::Query);
        assert_eq!(parse(&["dispose"]), Signal::Dispose);
        assert_eq!(parse(&["stop"]), Signal::Stop);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Cli::try_parse_from(["carousel-cli", "click", "up"]).is_err());
        assert!(Cli::try_parse_from(["carousel-cli", "focus", "control"]).is_err());
    }

    #[test]
    fn test_emitted_line() {
        let line = encode_line(&parse(&["click", "right"])).unwrap();
        assert_eq!(line, "{\"type\":\"click\",\"target\":{\"kind\":\"right_arrow\"}}\n");
    }
}
