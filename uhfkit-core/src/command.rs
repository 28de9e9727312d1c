//! Reader command definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol command codes
///
/// Commands from the UHF reader communication protocol (V2.16) that this
/// library issues or recognizes in responses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    // Device information
    ReadFirmware = 0x10,

    // Tag operations
    StartInventory = 0x20,
    ReadTid = 0x2D,
    StopInventory = 0x2F,

    // Device control
    Reset = 0x40,
    SetWorkMode = 0x51,
    QueryWorkMode = 0x52,
}

impl Command {
    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::ReadFirmware => "CMD_READ_FIRMWARE",
            Self::StartInventory => "CMD_START_INVENTORY",
            Self::ReadTid => "CMD_READ_TID",
            Self::StopInventory => "CMD_STOP_INVENTORY",
            Self::Reset => "CMD_RESET",
            Self::SetWorkMode => "CMD_SET_WORK_MODE",
            Self::QueryWorkMode => "CMD_QUERY_WORK_MODE",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x10 => Ok(Self::ReadFirmware),
            0x20 => Ok(Self::StartInventory),
            0x2D => Ok(Self::ReadTid),
            0x2F => Ok(Self::StopInventory),
            0x40 => Ok(Self::Reset),
            0x51 => Ok(Self::SetWorkMode),
            0x52 => Ok(Self::QueryWorkMode),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
