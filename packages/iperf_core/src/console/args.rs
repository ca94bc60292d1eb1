use core::{fmt, net::Ipv4Addr, str::FromStr};

use crate::session::TrafficType;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_DURATION_S: u32 = 30;
pub const DEFAULT_INTERVAL_S: u32 = 3;
pub const DEFAULT_PING_COUNT: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgError {
    MissingMode,
    ConflictingMode,
    MissingValue(&'static str),
    InvalidValue(&'static str),
    UnknownFlag,
    MissingTarget,
}

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMode => f.write_str("one of -s or -c <ip> is required"),
            Self::ConflictingMode => f.write_str("-s and -c are mutually exclusive"),
            Self::MissingValue(flag) => write!(f, "{} needs a value", flag),
            Self::InvalidValue(flag) => write!(f, "invalid value for {}", flag),
            Self::UnknownFlag => f.write_str("unknown option"),
            Self::MissingTarget => f.write_str("target address required"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IperfMode {
    Server,
    Client(Ipv4Addr),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IperfParams {
    pub mode: IperfMode,
    pub udp: bool,
    pub port: u16,
    pub duration_s: u32,
    pub interval_s: u32,
}

impl IperfParams {
    pub const fn traffic_type(&self) -> TrafficType {
        match (self.mode, self.udp) {
            (IperfMode::Server, false) => TrafficType::TcpServer,
            (IperfMode::Client(_), false) => TrafficType::TcpClient,
            (IperfMode::Server, true) => TrafficType::UdpServer,
            (IperfMode::Client(_), true) => TrafficType::UdpClient,
        }
    }
}

/// Request handed to the throughput engine's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IperfRequest {
    Start(IperfParams),
    Abort,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PingRequest {
    pub target: Ipv4Addr,
    pub count: u32,
}

/// `iperf -s|-c <ip> [-u] [-p port] [-t secs] [-i secs]` or `iperf -a`.
/// `argv[0]` is the command name.
pub fn parse_iperf_args(argv: &[&str]) -> Result<IperfRequest, ArgError> {
    let mut mode = None;
    let mut udp = false;
    let mut port = DEFAULT_PORT;
    let mut duration_s = DEFAULT_DURATION_S;
    let mut interval_s = DEFAULT_INTERVAL_S;

    let mut args = argv.iter().skip(1).copied();
    while let Some(flag) = args.next() {
        match flag {
            "-a" => return Ok(IperfRequest::Abort),
            "-s" => set_mode(&mut mode, IperfMode::Server)?,
            "-c" => {
                let addr = parse_value::<Ipv4Addr>(args.next(), "-c")?;
                set_mode(&mut mode, IperfMode::Client(addr))?;
            }
            "-u" => udp = true,
            "-p" => port = parse_value(args.next(), "-p")?,
            "-t" => duration_s = parse_value(args.next(), "-t")?,
            "-i" => interval_s = parse_value(args.next(), "-i")?,
            _ => return Err(ArgError::UnknownFlag),
        }
    }

    let mode = mode.ok_or(ArgError::MissingMode)?;
    if port == 0 {
        return Err(ArgError::InvalidValue("-p"));
    }
    Ok(IperfRequest::Start(IperfParams {
        mode,
        udp,
        port,
        duration_s,
        interval_s,
    }))
}

/// `ping <ip> [-c count]`.
pub fn parse_ping_args(argv: &[&str]) -> Result<PingRequest, ArgError> {
    let mut target = None;
    let mut count = DEFAULT_PING_COUNT;

    let mut args = argv.iter().skip(1).copied();
    while let Some(arg) = args.next() {
        match arg {
            "-c" => count = parse_value(args.next(), "-c")?,
            _ if arg.starts_with('-') => return Err(ArgError::UnknownFlag),
            _ => target = Some(arg.parse().map_err(|_| ArgError::InvalidValue("target"))?),
        }
    }

    Ok(PingRequest {
        target: target.ok_or(ArgError::MissingTarget)?,
        count,
    })
}

fn set_mode(slot: &mut Option<IperfMode>, mode: IperfMode) -> Result<(), ArgError> {
    if slot.is_some() {
        return Err(ArgError::ConflictingMode);
    }
    *slot = Some(mode);
    Ok(())
}

fn parse_value<T: FromStr>(token: Option<&str>, flag: &'static str) -> Result<T, ArgError> {
    token
        .ok_or(ArgError::MissingValue(flag))?
        .parse()
        .map_err(|_| ArgError::InvalidValue(flag))
}
