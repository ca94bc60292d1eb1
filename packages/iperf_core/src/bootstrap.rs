//! Ordered bring-up: antenna, storage, radio, power save, statistics, console,
//! commands, usage banner. Any failure stops the sequence with the step that
//! failed; the caller decides how to halt.

use core::fmt::{self, Write};

use crate::{
    antenna::AntennaControl,
    console::{Command, ConsoleError, ConsoleHost, ConsoleTransport, TransportFlags, USAGE_BANNER},
    hook::{SessionHook, StatsFeatures},
    storage::KvStorage,
};

pub const BOOT_DETAIL_LEN: usize = 96;

/// Radio driver operations bring-up needs.
pub trait WifiControl {
    type Error: fmt::Debug;

    fn init(&mut self) -> Result<(), Self::Error>;
    fn disable_power_save(&mut self) -> Result<(), Self::Error>;
    fn enable_rx_statistics(&mut self, mu: bool) -> Result<(), Self::Error>;
    fn enable_tx_statistics(&mut self) -> Result<(), Self::Error>;
}

/// The throughput-test engine, as far as hook registration goes.
pub trait ThroughputEngine {
    fn register_session_hook(&mut self, hook: &'static dyn SessionHook);
}

/// Command groups in registration order.
#[derive(Clone, Copy, Debug)]
pub struct CommandSets {
    pub system: &'static [Command],
    pub wifi: &'static [Command],
    pub iperf: &'static [Command],
    pub ping: &'static [Command],
}

pub struct BootConfig {
    pub stats: StatsFeatures,
    pub transports: TransportFlags,
    pub commands: CommandSets,
    pub hook: &'static dyn SessionHook,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootStep {
    Storage,
    WifiInit,
    PowerSave,
    Statistics,
    ConsoleTransport,
    Console,
    Commands,
}

impl BootStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Storage => "storage init",
            Self::WifiInit => "wifi init",
            Self::PowerSave => "wifi power save",
            Self::Statistics => "wifi statistics",
            Self::ConsoleTransport => "console transport",
            Self::Console => "console init",
            Self::Commands => "command registration",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootError {
    pub step: BootStep,
    pub detail: heapless::String<BOOT_DETAIL_LEN>,
}

impl BootError {
    fn debug(step: BootStep, cause: impl fmt::Debug) -> Self {
        let mut detail = heapless::String::new();
        let _ = write!(&mut detail, "{:?}", cause);
        Self { step, detail }
    }

    fn display(step: BootStep, cause: impl fmt::Display) -> Self {
        let mut detail = heapless::String::new();
        let _ = write!(&mut detail, "{}", cause);
        Self { step, detail }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step.label(), self.detail)
    }
}

pub struct Booted<C> {
    pub console: C,
    pub transport: ConsoleTransport,
}

pub fn bootstrap<A, K, W, E, C, F>(
    config: &BootConfig,
    antenna: &mut A,
    storage: &mut K,
    wifi: &mut W,
    engine: &mut E,
    open_console: F,
) -> Result<Booted<C>, BootError>
where
    A: AntennaControl + ?Sized,
    K: KvStorage + ?Sized,
    W: WifiControl + ?Sized,
    E: ThroughputEngine + ?Sized,
    C: ConsoleHost,
    F: FnOnce(ConsoleTransport) -> Result<C, ConsoleError>,
{
    antenna.configure_antenna();

    init_storage(storage)?;

    wifi.init().map_err(|err| BootError::debug(BootStep::WifiInit, err))?;
    wifi.disable_power_save()
        .map_err(|err| BootError::debug(BootStep::PowerSave, err))?;

    if config.stats.rx {
        wifi.enable_rx_statistics(config.stats.rx_mu)
            .map_err(|err| BootError::debug(BootStep::Statistics, err))?;
    }
    if config.stats.tx {
        wifi.enable_tx_statistics()
            .map_err(|err| BootError::debug(BootStep::Statistics, err))?;
    }

    let transport = config
        .transports
        .select()
        .map_err(|err| BootError::display(BootStep::ConsoleTransport, err))?;
    let mut console =
        open_console(transport).map_err(|err| BootError::display(BootStep::Console, err))?;
    log::info!("console: transport={}", transport.label());

    register_all(&mut console, config.commands.system)?;
    register_all(&mut console, config.commands.wifi)?;
    register_all(&mut console, config.commands.iperf)?;
    engine.register_session_hook(config.hook);
    register_all(&mut console, config.commands.ping)?;

    console.print(USAGE_BANNER);

    Ok(Booted { console, transport })
}

/// An unusable layout is erased and initialised once more; a second failure
/// is final.
fn init_storage<K: KvStorage + ?Sized>(storage: &mut K) -> Result<(), BootError> {
    match storage.init() {
        Ok(()) => Ok(()),
        Err(fault) if fault.recoverable_by_erase() => {
            log::warn!("storage: {}; erasing", fault);
            storage
                .erase()
                .map_err(|err| BootError::debug(BootStep::Storage, err))?;
            storage
                .init()
                .map_err(|fault| BootError::display(BootStep::Storage, fault))
        }
        Err(fault) => Err(BootError::display(BootStep::Storage, fault)),
    }
}

fn register_all<C: ConsoleHost>(console: &mut C, commands: &[Command]) -> Result<(), BootError> {
    for command in commands {
        console
            .register(*command)
            .map_err(|err| BootError::display(BootStep::Commands, err))?;
    }
    Ok(())
}
