//! bridge 侧 ASCII 命令
//!
//! 单独的 `$$$` 让 bridge 进入命令模式；之后每条参数命令都是以回车结尾的一行。

use std::fmt;

use serde::{Deserialize, Serialize};

/// Baud rates the bridge's UART accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BridgeBaud {
    B1200,
    B2400,
    B4800,
    B9600,
    B19200,
    B28800,
    B38400,
    B57600,
    B115200,
    B230400,
    B460800,
    B921600,
}

impl BridgeBaud {
    pub fn bps(self) -> u32 {
        match self {
            BridgeBaud::B1200 => 1_200,
            BridgeBaud::B2400 => 2_400,
            BridgeBaud::B4800 => 4_800,
            BridgeBaud::B9600 => 9_600,
            BridgeBaud::B19200 => 19_200,
            BridgeBaud::B28800 => 28_800,
            BridgeBaud::B38400 => 38_400,
            BridgeBaud::B57600 => 57_600,
            BridgeBaud::B115200 => 115_200,
            BridgeBaud::B230400 => 230_400,
            BridgeBaud::B460800 => 460_800,
            BridgeBaud::B921600 => 921_600,
        }
    }

    /// Rate token used by the temporary-baud (`U`) command.
    pub fn rate_token(self) -> &'static str {
        match self {
            BridgeBaud::B1200 => "1200",
            BridgeBaud::B2400 => "2400",
            BridgeBaud::B4800 => "4800",
            BridgeBaud::B9600 => "9600",
            BridgeBaud::B19200 => "19.2",
            BridgeBaud::B28800 => "28.8",
            BridgeBaud::B38400 => "38.4",
            BridgeBaud::B57600 => "57.6",
            BridgeBaud::B115200 => "115K",
            BridgeBaud::B230400 => "230K",
            BridgeBaud::B460800 => "460K",
            BridgeBaud::B921600 => "921K",
        }
    }
}

impl TryFrom<u32> for BridgeBaud {
    type Error = String;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Ok(match bps {
            1_200 => BridgeBaud::B1200,
            2_400 => BridgeBaud::B2400,
            4_800 => BridgeBaud::B4800,
            9_600 => BridgeBaud::B9600,
            19_200 => BridgeBaud::B19200,
            28_800 => BridgeBaud::B28800,
            38_400 => BridgeBaud::B38400,
            57_600 => BridgeBaud::B57600,
            115_200 => BridgeBaud::B115200,
            230_400 => BridgeBaud::B230400,
            460_800 => BridgeBaud::B460800,
            921_600 => BridgeBaud::B921600,
            other => return Err(format!("unsupported bridge baud rate {other}")),
        })
    }
}

impl From<BridgeBaud> for u32 {
    fn from(b: BridgeBaud) -> u32 {
        b.bps()
    }
}

impl fmt::Display for BridgeBaud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bps())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Parity {
    #[default]
    #[serde(rename = "N")]
    None,
    #[serde(rename = "E")]
    Even,
    #[serde(rename = "O")]
    Odd,
}

impl Parity {
    pub fn token(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }
}

/// bridge 能理解的一条命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeCommand {
    /// `$$$`, no line terminator.
    EnterCommandMode,
    /// `---\r`
    ExitCommandMode,
    /// `U,<rate>,<parity>\r`: takes effect immediately, lost on power cycle.
    TemporaryBaud { baud: BridgeBaud, parity: Parity },
    /// `SU,<bps>\r`: stored, applied after reboot.
    PermanentBaud(BridgeBaud),
}

impl BridgeCommand {
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            BridgeCommand::EnterCommandMode => b"$$$".to_vec(),
            BridgeCommand::ExitCommandMode => b"---\r".to_vec(),
            BridgeCommand::TemporaryBaud { baud, parity } => {
                format!("U,{},{}\r", baud.rate_token(), parity.token()).into_bytes()
            }
            BridgeCommand::PermanentBaud(baud) => format!("SU,{}\r", baud.bps()).into_bytes(),
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            BridgeCommand::EnterCommandMode => "Entering command mode on bridge".to_string(),
            BridgeCommand::ExitCommandMode => "Leaving command mode on bridge".to_string(),
            BridgeCommand::TemporaryBaud { baud, parity } => format!(
                "Setting temporary baud rate to {},{} on bridge",
                baud,
                parity.token()
            ),
            BridgeCommand::PermanentBaud(baud) => {
                format!("Setting permanent baud rate to {baud}bps on bridge")
            }
        }
    }
}
