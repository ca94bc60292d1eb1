use embedded_hal::{delay::DelayNs, digital::OutputPin};

/// RF switch settle time between enabling the switch and selecting a path.
pub const ANTENNA_SETTLE_MS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntennaPath {
    Internal,
    External,
}

/// Physical antenna fitted to the board's connector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AntennaKind {
    Rod,
    Fpc,
}

impl AntennaKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rod => "ROD",
            Self::Fpc => "FPC",
        }
    }
}

/// Step 1 of bring-up. Implementations must not fail: pin faults are logged
/// and swallowed.
pub trait AntennaControl {
    fn configure_antenna(&mut self);
}

/// Two-line RF switch: an active-low enable and a path select
/// (high = external connector, low = on-board antenna).
pub struct AntennaSwitch<EN, SEL, D> {
    enable: EN,
    select: SEL,
    delay: D,
    path: AntennaPath,
}

impl<EN, SEL, D> AntennaSwitch<EN, SEL, D>
where
    EN: OutputPin,
    SEL: OutputPin,
    D: DelayNs,
{
    pub fn new(enable: EN, select: SEL, delay: D, path: AntennaPath) -> Self {
        Self {
            enable,
            select,
            delay,
            path,
        }
    }

    pub fn path(&self) -> AntennaPath {
        self.path
    }

    pub fn release(self) -> (EN, SEL) {
        (self.enable, self.select)
    }
}

impl<EN, SEL, D> AntennaControl for AntennaSwitch<EN, SEL, D>
where
    EN: OutputPin,
    SEL: OutputPin,
    D: DelayNs,
{
    fn configure_antenna(&mut self) {
        if let Err(err) = self.enable.set_low() {
            log::warn!("antenna: enable line err={:?}", err);
        }

        self.delay.delay_ms(ANTENNA_SETTLE_MS);

        let selected = match self.path {
            AntennaPath::External => self.select.set_high(),
            AntennaPath::Internal => self.select.set_low(),
        };
        match selected {
            Ok(()) => log::info!("antenna: path={:?}", self.path),
            Err(err) => log::warn!("antenna: select line err={:?}", err),
        }
    }
}

/// Boards without an RF switch.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedAntenna;

impl AntennaControl for FixedAntenna {
    fn configure_antenna(&mut self) {}
}
