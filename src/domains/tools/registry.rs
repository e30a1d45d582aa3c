//! Server registry - the catalogue of adapters this binary can serve.

use std::fmt;
use std::str::FromStr;

use super::ToolError;

/// An adapter that can be selected with `--server`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerKind {
    /// Hand-written tools for the Skyvern browser-automation API.
    Skyvern,
    /// Tools generated from the Skyvern OpenAPI document.
    SkyvernOpenapi,
}

impl ServerKind {
    /// Every adapter, in listing order.
    pub const ALL: [ServerKind; 2] = [ServerKind::Skyvern, ServerKind::SkyvernOpenapi];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Skyvern => "skyvern",
            Self::SkyvernOpenapi => "skyvern_openapi",
        }
    }

    /// One-line description for `--list-servers`.
    pub fn description(self) -> &'static str {
        match self {
            Self::Skyvern => {
                "Skyvern browser automation: initiate, inspect and cancel tasks"
            }
            Self::SkyvernOpenapi => {
                "Skyvern browser automation: every API operation, generated from its OpenAPI document"
            }
        }
    }

    /// Instructions reported to MCP clients on initialize.
    pub fn instructions(self) -> &'static str {
        match self {
            Self::Skyvern => {
                "Skyvern drives a real browser to accomplish goals on websites. \
                 Use initiate_task to start a run, get_task_details with the returned \
                 run_id to follow its progress and cancel_task to stop it."
            }
            Self::SkyvernOpenapi => {
                "Each tool maps to one Skyvern API operation. Path, query and body \
                 fields are passed as top-level arguments."
            }
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServerKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| {
                let available: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
                ToolError::not_found(format!(
                    "server '{}' (available: {})",
                    s,
                    available.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_names() {
        assert_eq!("skyvern".parse::<ServerKind>().unwrap(), ServerKind::Skyvern);
        assert_eq!(
            "skyvern_openapi".parse::<ServerKind>().unwrap(),
            ServerKind::SkyvernOpenapi
        );
        assert_eq!(
            "Skyvern-OpenAPI".parse::<ServerKind>().unwrap(),
            ServerKind::SkyvernOpenapi
        );
    }

    #[test]
    fn test_parse_unknown_server() {
        let err = "weather".parse::<ServerKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("weather"));
        assert!(message.contains("skyvern_openapi"));
    }

    #[test]
    fn test_display_round_trips() {
        for kind in ServerKind::ALL {
            assert_eq!(kind.to_string().parse::<ServerKind>().unwrap(), kind);
        }
    }
}
