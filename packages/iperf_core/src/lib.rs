#![no_std]

#[cfg(test)]
extern crate std;

pub mod antenna;
pub mod band;
pub mod bootstrap;
pub mod console;
pub mod hook;
pub mod identity;
pub mod lifecycle;
pub mod queue;
pub mod session;
pub mod storage;

pub use antenna::{
    AntennaControl, AntennaKind, AntennaPath, AntennaSwitch, FixedAntenna, ANTENNA_SETTLE_MS,
};
pub use band::{get_wifi_band, ChannelSource, WifiBand};
pub use bootstrap::{
    bootstrap, BootConfig, BootError, BootStep, Booted, CommandSets, ThroughputEngine, WifiControl,
};
pub use console::{Command, CommandError, CommandTable, ConsoleError, ConsoleHost, ConsoleTransport};
pub use hook::{ConsoleSink, LinkStatistics, SessionHook, StatsFeatures, StatsHook, StatsOp, StatsPlan};
pub use identity::{ChipTarget, DeviceProfile};
pub use lifecycle::{deliver_session_event, Delivery, LifecycleNote, SessionPhase, SessionTracker};
pub use queue::enqueue_latest;
pub use session::{get_protocol_name, SessionEvent, SessionStatus, TrafficType};
pub use storage::{KvStorage, SettingsPartition, StorageFault};
