use core::convert::TryFrom;

/// The authenticator API, consisting of commands identified by the first
/// byte of a CTAP2 message.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CommandCode {
    MakeCredential,
    GetAssertion,
    GetInfo,
    ClientPin,
    Reset,
    GetNextAssertion,
    // new in v2.1
    BioEnrollment,
    // new in v2.1
    CredentialManagement,
    // new in v2.1
    PlatformConfig,
    /// vendors are assigned the range 0x40..=0xbf for custom commands
    Vendor(VendorCommand),
}

impl From<CommandCode> for u8 {
    fn from(code: CommandCode) -> u8 {
        match code {
            CommandCode::MakeCredential => 0x01,
            CommandCode::GetAssertion => 0x02,
            CommandCode::GetInfo => 0x04,
            CommandCode::ClientPin => 0x06,
            CommandCode::Reset => 0x07,
            CommandCode::GetNextAssertion => 0x08,
            CommandCode::BioEnrollment => 0x09,
            CommandCode::CredentialManagement => 0x0A,
            CommandCode::PlatformConfig => 0x0C,
            CommandCode::Vendor(command) => command.into(),
        }
    }
}

impl CommandCode {
    pub fn into_u8(self) -> u8 {
        self.into()
    }
}

/// Vendor CTAP2 commands, from 0x40 to 0xbf.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct VendorCommand(u8);

impl VendorCommand {
    pub const FIRST: u8 = 0x40;
    pub const LAST: u8 = 0xBF;
}

impl TryFrom<u8> for VendorCommand {
    type Error = ();

    fn try_from(from: u8) -> core::result::Result<Self, ()> {
        match from {
            code @ Self::FIRST..=Self::LAST => Ok(VendorCommand(code)),
            _ => Err(()),
        }
    }
}

impl From<VendorCommand> for u8 {
    fn from(command: VendorCommand) -> u8 {
        command.0
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = ();

    fn try_from(from: u8) -> core::result::Result<CommandCode, ()> {
        match from {
            0x01 => Ok(CommandCode::MakeCredential),
            0x02 => Ok(CommandCode::GetAssertion),
            0x04 => Ok(CommandCode::GetInfo),
            0x06 => Ok(CommandCode::ClientPin),
            0x07 => Ok(CommandCode::Reset),
            0x08 => Ok(CommandCode::GetNextAssertion),
            0x09 => Ok(CommandCode::BioEnrollment),
            0x0A => Ok(CommandCode::CredentialManagement),
            0x0C => Ok(CommandCode::PlatformConfig),
            code @ VendorCommand::FIRST..=VendorCommand::LAST => {
                Ok(CommandCode::Vendor(VendorCommand::try_from(code)?))
            }
            _ => Err(()),
        }
    }
}

/// Anything that belongs to exactly one command: requests, responses
/// and their parameters.
pub trait Command {
    fn command_code(&self) -> CommandCode;
}
