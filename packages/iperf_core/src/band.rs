use core::fmt;

/// Highest channel number of the 2.4 GHz plan. 6 GHz channel numbers overlap
/// the 5 GHz range and are reported as 5 GHz.
pub const MAX_2G4_CHANNEL: u8 = 14;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WifiBand {
    Band2G4,
    Band5G,
    Unknown,
}

impl WifiBand {
    pub const fn from_channel(primary: u8) -> Self {
        match primary {
            0 => Self::Unknown,
            1..=MAX_2G4_CHANNEL => Self::Band2G4,
            _ => Self::Band5G,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Band2G4 => "2.4GHz",
            Self::Band5G => "5GHz",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for WifiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Read-only view of the radio's current primary channel.
pub trait ChannelSource {
    type Error: fmt::Debug;

    fn primary_channel(&self) -> Result<u8, Self::Error>;
}

/// Never fails: a driver that is down or not yet initialised reads as
/// [`WifiBand::Unknown`].
pub fn get_wifi_band<S>(source: &S) -> WifiBand
where
    S: ChannelSource + ?Sized,
{
    match source.primary_channel() {
        Ok(primary) => WifiBand::from_channel(primary),
        Err(err) => {
            log::debug!("band: channel query failed err={:?}", err);
            WifiBand::Unknown
        }
    }
}
