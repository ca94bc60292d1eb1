//! Session boundary events as delivered by the throughput-test engine.

/// Traffic role of one iperf session.
///
/// Codes the engine may add later are carried as [`TrafficType::Other`] so the
/// hook can still report them instead of dropping the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrafficType {
    TcpServer,
    TcpClient,
    UdpServer,
    UdpClient,
    Other(u8),
}

impl TrafficType {
    pub const ALL: [TrafficType; 4] = [
        TrafficType::TcpServer,
        TrafficType::TcpClient,
        TrafficType::UdpServer,
        TrafficType::UdpClient,
    ];

    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::TcpServer,
            1 => Self::TcpClient,
            2 => Self::UdpServer,
            3 => Self::UdpClient,
            other => Self::Other(other),
        }
    }

    pub const fn as_raw(self) -> u8 {
        match self {
            Self::TcpServer => 0,
            Self::TcpClient => 1,
            Self::UdpServer => 2,
            Self::UdpClient => 3,
            Self::Other(raw) => raw,
        }
    }

    pub const fn protocol_name(self) -> &'static str {
        match self {
            Self::TcpServer | Self::TcpClient => "TCP",
            Self::UdpServer | Self::UdpClient => "UDP",
            Self::Other(_) => "Unknown",
        }
    }

    /// A pure UDP receiver never produces outbound frames worth counting.
    pub const fn tx_relevant(self) -> bool {
        !matches!(self, Self::UdpServer)
    }

    /// A pure UDP sender never receives payload worth counting.
    pub const fn rx_relevant(self) -> bool {
        !matches!(self, Self::UdpClient)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TcpServer => "tcp-server",
            Self::TcpClient => "tcp-client",
            Self::UdpServer => "udp-server",
            Self::UdpClient => "udp-client",
            Self::Other(_) => "other",
        }
    }

    pub(crate) const fn slot(self) -> Option<usize> {
        match self {
            Self::TcpServer => Some(0),
            Self::TcpClient => Some(1),
            Self::UdpServer => Some(2),
            Self::UdpClient => Some(3),
            Self::Other(_) => None,
        }
    }
}

pub fn get_protocol_name(traffic: TrafficType) -> &'static str {
    traffic.protocol_name()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Started,
    Stopped,
    Other(u8),
}

impl SessionStatus {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Started,
            1 => Self::Stopped,
            other => Self::Other(other),
        }
    }

    pub const fn as_raw(self) -> u8 {
        match self {
            Self::Started => 0,
            Self::Stopped => 1,
            Self::Other(raw) => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub traffic: TrafficType,
    pub status: SessionStatus,
}

impl SessionEvent {
    pub const fn new(traffic: TrafficType, status: SessionStatus) -> Self {
        Self { traffic, status }
    }

    pub const fn started(traffic: TrafficType) -> Self {
        Self::new(traffic, SessionStatus::Started)
    }

    pub const fn stopped(traffic: TrafficType) -> Self {
        Self::new(traffic, SessionStatus::Stopped)
    }

    pub const fn from_raw(traffic: u8, status: u8) -> Self {
        Self::new(TrafficType::from_raw(traffic), SessionStatus::from_raw(status))
    }
}
