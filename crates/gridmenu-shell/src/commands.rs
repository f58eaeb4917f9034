use std::path::PathBuf;

use anyhow::{anyhow, bail};
use gridmenu_core::{ClickKind, Slot, ViewerId};

/// One line of host input
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Open a registered menu
    Open { viewer: ViewerId, menu: String },
    /// Open the built-in paginated gallery
    Browse { viewer: ViewerId },
    /// Click a slot, or outside the grid when `slot` is `None`
    Click {
        viewer: ViewerId,
        slot: Option<Slot>,
        kind: ClickKind,
    },
    /// The viewer closed their surface
    Close { viewer: ViewerId },
    /// Print the viewer's surface
    Show { viewer: ViewerId },
    /// Store the viewer's open menu as a menu document
    Save { viewer: ViewerId, path: PathBuf },
    Status,
    Menus,
    /// Reload menu documents from the menus directory
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open <viewer> <menu>          open a registered menu
  browse <viewer>               open the paginated gallery
  click <viewer> <slot|out> [kind]
  close <viewer>                close the viewer's surface
  show <viewer>                 print the viewer's surface
  save <viewer> <file>          save the open menu as JSON
  status | menus | reload | help | quit";

impl ShellCommand {
    /// Parse a command line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = words.collect();
        let viewer = || -> anyhow::Result<ViewerId> {
            args.first()
                .map(|v| ViewerId::from(*v))
                .ok_or_else(|| anyhow!("'{}' needs a viewer", name))
        };

        let command = match name.as_str() {
            "open" => {
                let menu = args.get(1).ok_or_else(|| anyhow!("usage: open <viewer> <menu>"))?;
                Self::Open {
                    viewer: viewer()?,
                    menu: menu.to_string(),
                }
            }
            "browse" => Self::Browse { viewer: viewer()? },
            "click" => {
                let slot = match args.get(1).copied() {
                    Some("out") | Some("-") => None,
                    Some(index) => Some(Slot::new(index.parse()?)),
                    None => bail!("usage: click <viewer> <slot|out> [kind]"),
                };
                let kind = match args.get(2) {
                    Some(kind) => {
                        ClickKind::from_str(kind).ok_or_else(|| anyhow!("unknown click kind: {}", kind))?
                    }
                    None => ClickKind::Left,
                };
                Self::Click {
                    viewer: viewer()?,
                    slot,
                    kind,
                }
            }
            "close" => Self::Close { viewer: viewer()? },
            "show" => Self::Show { viewer: viewer()? },
            "save" => {
                let path = args.get(1).ok_or_else(|| anyhow!("usage: save <viewer> <file>"))?;
                Self::Save {
                    viewer: viewer()?,
                    path: PathBuf::from(path),
                }
            }
            "status" => Self::Status,
            "menus" => Self::Menus,
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command: {}", other),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_click() {
        let command = ShellCommand::parse("click alex 13 right").unwrap();
        assert_eq!(
            command,
            Some(ShellCommand::Click {
                viewer: ViewerId::from("alex"),
                slot: Some(Slot::new(13)),
                kind: ClickKind::Right,
            })
        );

        let outside = ShellCommand::parse("CLICK sam out").unwrap();
        assert!(matches!(outside, Some(ShellCommand::Click { slot: None, kind: ClickKind::Left, .. })));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("open alex").is_err());
        assert!(ShellCommand::parse("click alex nine").is_err());
        assert!(ShellCommand::parse("click alex 3 sideways").is_err());
        assert!(ShellCommand::parse("dance").is_err());
        assert!(ShellCommand::parse("show").is_err());
    }

    #[test]
    fn test_blank_and_comments() {
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
        assert_eq!(ShellCommand::parse("# open alex warps").unwrap(), None);
        assert_eq!(ShellCommand::parse("menus").unwrap(), Some(ShellCommand::Menus));
    }
}
