//! Command types and resolved command specifications

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for a command type outside the supported set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown command type '{0}'")]
pub struct CommandTypeError(pub String);

/// The transport action a configured command maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CommandType {
    Get,
    Post,
    Patch,
    Put,
    Delete,
    Head,
    Wol,
    TcpText,
}

impl CommandType {
    /// Every supported command type, in configuration order
    pub const ALL: [CommandType; 8] = [
        CommandType::Get,
        CommandType::Post,
        CommandType::Patch,
        CommandType::Put,
        CommandType::Delete,
        CommandType::Head,
        CommandType::Wol,
        CommandType::TcpText,
    ];

    /// Name as written in the configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Get => "get",
            CommandType::Post => "post",
            CommandType::Patch => "patch",
            CommandType::Put => "put",
            CommandType::Delete => "delete",
            CommandType::Head => "head",
            CommandType::Wol => "wol",
            CommandType::TcpText => "tcp-text",
        }
    }

    /// Whether the command is carried out as an HTTP request
    pub fn is_http(&self) -> bool {
        !matches!(self, CommandType::Wol | CommandType::TcpText)
    }
}

impl FromStr for CommandType {
    type Err = CommandTypeError;

    /// Parse a command type, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| CommandTypeError(s.to_string()))
    }
}

impl TryFrom<String> for CommandType {
    type Error = CommandTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CommandType> for String {
    fn from(t: CommandType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured command: what to do and with which transport-specific parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    #[serde(rename = "type")]
    pub command_type: CommandType,

    /// Transport-specific parameter (URL, MAC address, `host:port,text`, ...)
    #[serde(default)]
    pub parameter: String,
}

impl CommandSpec {
    pub fn new(command_type: CommandType, parameter: impl Into<String>) -> Self {
        Self {
            command_type,
            parameter: parameter.into(),
        }
    }
}

/// Commands the remote platform sends to a remote entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    On,
    Off,
    Toggle,
    SendCmd,
    SendCmdSequence,
}

impl RemoteCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteCommand::On => "on",
            RemoteCommand::Off => "off",
            RemoteCommand::Toggle => "toggle",
            RemoteCommand::SendCmd => "send_cmd",
            RemoteCommand::SendCmdSequence => "send_cmd_sequence",
        }
    }
}

impl FromStr for RemoteCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(RemoteCommand::On),
            "off" => Ok(RemoteCommand::Off),
            "toggle" => Ok(RemoteCommand::Toggle),
            "send_cmd" => Ok(RemoteCommand::SendCmd),
            "send_cmd_sequence" => Ok(RemoteCommand::SendCmdSequence),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
