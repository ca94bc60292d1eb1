//! Instrumentation hook run at iperf session boundaries.
//!
//! On start it prints the test information banner and resets the link
//! statistics relevant to the session's direction; on stop it prints those
//! statistics. The hook holds no mutable state, so the engine may call it from
//! any task.

use core::fmt::Write;

use crate::{
    band::{get_wifi_band, ChannelSource, WifiBand},
    identity::DeviceProfile,
    session::{SessionEvent, SessionStatus, TrafficType},
};

pub const BANNER_CAPACITY: usize = 512;

pub type Banner = heapless::String<BANNER_CAPACITY>;

/// Radio-level tx/rx counters. Every call prints its own report and is
/// best-effort.
pub trait LinkStatistics {
    fn clear_tx_stats(&self);
    fn get_tx_stats(&self);
    fn clear_rx_stats(&self);
    fn get_rx_stats(&self);
}

pub trait ConsoleSink {
    fn print(&self, text: &str);
}

/// Callback the throughput engine invokes at each session boundary.
pub trait SessionHook: Sync {
    fn on_session_event(&self, event: SessionEvent);
}

/// Which statistics subsystems exist in this build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsFeatures {
    pub tx: bool,
    pub rx: bool,
    pub rx_mu: bool,
}

impl StatsFeatures {
    pub const fn none() -> Self {
        Self {
            tx: false,
            rx: false,
            rx_mu: false,
        }
    }

    pub const fn any(self) -> bool {
        self.tx || self.rx
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsOp {
    Clear,
    Fetch,
}

/// At most one operation per subsystem for a single boundary event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsPlan {
    pub tx: Option<StatsOp>,
    pub rx: Option<StatsOp>,
}

impl StatsPlan {
    pub fn for_event(event: SessionEvent, features: StatsFeatures) -> Self {
        let op = match event.status {
            SessionStatus::Started => StatsOp::Clear,
            SessionStatus::Stopped => StatsOp::Fetch,
            SessionStatus::Other(_) => return Self::default(),
        };
        Self {
            tx: (features.tx && event.traffic.tx_relevant()).then_some(op),
            rx: (features.rx && event.traffic.rx_relevant()).then_some(op),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.tx.is_none() && self.rx.is_none()
    }

    pub fn apply<S>(&self, stats: &S)
    where
        S: LinkStatistics + ?Sized,
    {
        match self.tx {
            Some(StatsOp::Clear) => stats.clear_tx_stats(),
            Some(StatsOp::Fetch) => stats.get_tx_stats(),
            None => {}
        }
        match self.rx {
            Some(StatsOp::Clear) => stats.clear_rx_stats(),
            Some(StatsOp::Fetch) => stats.get_rx_stats(),
            None => {}
        }
    }
}

pub fn render_banner(profile: &DeviceProfile, band: WifiBand, traffic: TrafficType) -> Banner {
    let mut banner = Banner::new();
    let _ = write!(
        &mut banner,
        "\n ==================================================\n \
         |                 Test Information               |\n \
         |                                                |\n \
         |  Device : {:<36} |\n \
         |  Antenna: {:<36} |\n \
         |  Band   : {:<36} |\n \
         |  Protocol: {:<35} |\n \
         |                                                |\n \
         ==================================================\n\n",
        profile.device_name(),
        profile.antenna_type(),
        band.label(),
        traffic.protocol_name(),
    );
    banner
}

pub struct StatsHook<'a, C: ?Sized, S: ?Sized, O: ?Sized> {
    profile: DeviceProfile,
    features: StatsFeatures,
    channel: &'a C,
    stats: &'a S,
    console: &'a O,
}

impl<'a, C, S, O> StatsHook<'a, C, S, O>
where
    C: ChannelSource + ?Sized,
    S: LinkStatistics + ?Sized,
    O: ConsoleSink + ?Sized,
{
    pub fn new(
        profile: DeviceProfile,
        features: StatsFeatures,
        channel: &'a C,
        stats: &'a S,
        console: &'a O,
    ) -> Self {
        Self {
            profile,
            features,
            channel,
            stats,
            console,
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn features(&self) -> StatsFeatures {
        self.features
    }

    fn handle(&self, event: SessionEvent) {
        match event.status {
            SessionStatus::Started => {
                let band = get_wifi_band(self.channel);
                let banner = render_banner(&self.profile, band, event.traffic);
                self.console.print(&banner);
            }
            SessionStatus::Stopped => {}
            SessionStatus::Other(raw) => {
                log::debug!("hook: ignoring status={} traffic={:?}", raw, event.traffic);
                return;
            }
        }
        StatsPlan::for_event(event, self.features).apply(self.stats);
    }
}

impl<C, S, O> SessionHook for StatsHook<'_, C, S, O>
where
    C: ChannelSource + Sync + ?Sized,
    S: LinkStatistics + Sync + ?Sized,
    O: ConsoleSink + Sync + ?Sized,
{
    fn on_session_event(&self, event: SessionEvent) {
        self.handle(event);
    }
}
