//! Frame discriminators shared by requests and responses.

use std::fmt;

/// Discriminator written after the length prefix of every frame.
///
/// A request and its response share one code. `Error` only ever travels from
/// daemon to client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Error envelope.
    Error,
    /// Container creation.
    Create,
    /// Container removal.
    Destroy,
    /// Container description.
    Info,
    /// Liveness probe.
    Ping,
    /// Handle enumeration.
    List,
    /// Diagnostic echo.
    Echo,
}

impl MessageType {
    /// Every known discriminator, in code order.
    pub const ALL: [Self; 7] = [
        Self::Error,
        Self::Create,
        Self::Destroy,
        Self::Info,
        Self::Ping,
        Self::List,
        Self::Echo,
    ];

    /// Numeric code written on the wire.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Error => 1,
            Self::Create => 11,
            Self::Destroy => 13,
            Self::Info => 14,
            Self::Ping => 91,
            Self::List => 92,
            Self::Echo => 93,
        }
    }

    /// Resolves a wire code, returning `None` for codes this build does not know.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Error),
            11 => Some(Self::Create),
            13 => Some(Self::Destroy),
            14 => Some(Self::Info),
            91 => Some(Self::Ping),
            92 => Some(Self::List),
            93 => Some(Self::Echo),
            _ => None,
        }
    }

    /// Lowercase name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Create => "create",
            Self::Destroy => "destroy",
            Self::Info => "info",
            Self::Ping => "ping",
            Self::List => "list",
            Self::Echo => "echo",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_resolve_to_their_type() {
        for message_type in MessageType::ALL {
            assert_eq!(MessageType::from_code(message_type.code()), Some(message_type));
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(MessageType::from_code(0), None);
        assert_eq!(MessageType::from_code(2), None);
        assert_eq!(MessageType::from_code(u32::MAX), None);
    }
}
