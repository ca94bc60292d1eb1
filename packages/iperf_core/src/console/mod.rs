//! Line-oriented command console: a static command table, whitespace
//! tokenising, and transport selection. Reading bytes and printing are left to
//! the firmware; everything here is host-testable.

mod args;
mod line_reader;

use core::fmt;

use crate::hook::ConsoleSink;

pub use args::{parse_iperf_args, parse_ping_args, ArgError, IperfMode, IperfParams, IperfRequest, PingRequest};
pub use line_reader::{LineEvent, LineReader};

pub const PROMPT: &str = "iperf> ";
pub const LINE_BUF_LEN: usize = 256;
pub const MAX_ARGS: usize = 16;
pub const MAX_COMMANDS: usize = 24;

pub const USAGE_BANNER: &str = "\n ==================================================\n \
|       Steps to test WiFi throughput            |\n \
|                                                |\n \
|  1. Print 'help' to gain overview of commands  |\n \
|  2. Configure device to station or soft-AP     |\n \
|  3. Setup WiFi connection                      |\n \
|  4. Run iperf to test UDP/TCP RX/TX throughput |\n \
|                                                |\n \
=================================================\n\n";

pub type Handler = fn(&[&str], &dyn ConsoleSink) -> Result<(), CommandError>;

#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub hint: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

impl Command {
    pub const fn new(
        name: &'static str,
        hint: &'static str,
        help: &'static str,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            hint,
            help,
            handler,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandError {
    Usage(&'static str),
    InvalidArgument(ArgError),
    /// Downstream queue full; the request was dropped.
    Busy,
    Unsupported,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "usage: {}", usage),
            Self::InvalidArgument(err) => write!(f, "{}", err),
            Self::Busy => f.write_str("busy, try again"),
            Self::Unsupported => f.write_str("not supported in this build"),
        }
    }
}

impl From<ArgError> for CommandError {
    fn from(err: ArgError) -> Self {
        Self::InvalidArgument(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleTransport {
    Uart,
    UsbCdc,
    UsbSerialJtag,
}

impl ConsoleTransport {
    /// USB-CDC (TinyUSB) has no driver on these boards.
    pub const fn has_driver(self) -> bool {
        !matches!(self, Self::UsbCdc)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Uart => "UART",
            Self::UsbCdc => "USB-CDC",
            Self::UsbSerialJtag => "USB-Serial-JTAG",
        }
    }
}

/// Transports enabled at build time. Exactly one must be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransportFlags {
    pub uart: bool,
    pub usb_cdc: bool,
    pub usb_serial_jtag: bool,
}

impl TransportFlags {
    pub const fn select(self) -> Result<ConsoleTransport, ConsoleError> {
        match (self.uart, self.usb_cdc, self.usb_serial_jtag) {
            (true, false, false) => Ok(ConsoleTransport::Uart),
            (false, true, false) => Ok(ConsoleTransport::UsbCdc),
            (false, false, true) => Ok(ConsoleTransport::UsbSerialJtag),
            (false, false, false) => Err(ConsoleError::NoTransport),
            _ => Err(ConsoleError::MultipleTransports),
        }
    }

    /// Whether these flags select a transport the firmware can drive. Usable
    /// in const context so a build that could never open a console fails to
    /// compile.
    pub const fn bootable(self) -> bool {
        match self.select() {
            Ok(transport) => transport.has_driver(),
            Err(_) => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleError {
    NoTransport,
    MultipleTransports,
    TransportUnavailable(ConsoleTransport),
    TransportInit(ConsoleTransport),
    DuplicateCommand(&'static str),
    ReservedName(&'static str),
    TableFull,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransport => f.write_str("no console transport enabled"),
            Self::MultipleTransports => f.write_str("more than one console transport enabled"),
            Self::TransportUnavailable(transport) => {
                write!(f, "{} console not available on this target", transport.label())
            }
            Self::TransportInit(transport) => write!(f, "{} console failed to start", transport.label()),
            Self::DuplicateCommand(name) => write!(f, "command '{}' registered twice", name),
            Self::ReservedName(name) => write!(f, "command name '{}' is reserved", name),
            Self::TableFull => f.write_str("command table full"),
        }
    }
}

/// A console that commands can be registered with and printed to.
pub trait ConsoleHost: ConsoleSink {
    fn register(&mut self, command: Command) -> Result<(), ConsoleError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Empty,
    Ran,
    Help,
    Unknown,
    TooManyArgs,
    Failed(CommandError),
}

const HELP_NAME: &str = "help";

pub struct CommandTable<const N: usize = MAX_COMMANDS> {
    commands: heapless::Vec<Command, N>,
}

impl<const N: usize> CommandTable<N> {
    pub const fn new() -> Self {
        Self {
            commands: heapless::Vec::new(),
        }
    }

    pub fn register(&mut self, command: Command) -> Result<(), ConsoleError> {
        if command.name == HELP_NAME {
            return Err(ConsoleError::ReservedName(command.name));
        }
        if self.find(command.name).is_some() {
            return Err(ConsoleError::DuplicateCommand(command.name));
        }
        self.commands
            .push(command)
            .map_err(|_| ConsoleError::TableFull)
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name)
    }

    pub fn dispatch(&self, line: &str, sink: &dyn ConsoleSink) -> Dispatch {
        let mut argv = heapless::Vec::<&str, MAX_ARGS>::new();
        if split_args(line, &mut argv).is_err() {
            return Dispatch::TooManyArgs;
        }
        let Some(&name) = argv.first() else {
            return Dispatch::Empty;
        };
        if name == HELP_NAME {
            self.write_help(argv.get(1).copied(), sink);
            return Dispatch::Help;
        }
        let Some(command) = self.find(name) else {
            return Dispatch::Unknown;
        };
        match (command.handler)(&argv, sink) {
            Ok(()) => Dispatch::Ran,
            Err(err) => Dispatch::Failed(err),
        }
    }

    /// `help` lists every command; `help <name>` narrows to one.
    pub fn write_help(&self, only: Option<&str>, sink: &dyn ConsoleSink) {
        let mut line = heapless::String::<192>::new();
        for command in self.commands.iter() {
            if only.is_some_and(|name| name != command.name) {
                continue;
            }
            line.clear();
            let _ = fmt::Write::write_fmt(
                &mut line,
                format_args!("{} {}\n  {}\n\n", command.name, command.hint, command.help),
            );
            sink.print(&line);
        }
        if only.is_none() {
            sink.print("help [<command>]\n  Print the list of registered commands\n\n");
        }
    }
}

impl<const N: usize> Default for CommandTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits on ASCII whitespace. A token wrapped in double quotes may contain
/// spaces; the quotes are stripped.
pub fn split_args<'a, const N: usize>(
    line: &'a str,
    argv: &mut heapless::Vec<&'a str, N>,
) -> Result<(), ()> {
    let bytes = line.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let (start, end, next) = if bytes[i] == b'"' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end] != b'"' {
                end += 1;
            }
            (start, end, (end + 1).min(bytes.len()))
        } else {
            let start = i;
            let mut end = start;
            while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
                end += 1;
            }
            (start, end, end)
        };
        argv.push(&line[start..end]).map_err(|_| ())?;
        i = next;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;
    use std::string::String;

    use super::*;

    #[derive(Default)]
    struct Captured(RefCell<String>);

    impl ConsoleSink for Captured {
        fn print(&self, text: &str) {
            self.0.borrow_mut().push_str(text);
        }
    }

    fn echo(argv: &[&str], sink: &dyn ConsoleSink) -> Result<(), CommandError> {
        for arg in &argv[1..] {
            sink.print(arg);
            sink.print(";");
        }
        Ok(())
    }

    fn refuse(_: &[&str], _: &dyn ConsoleSink) -> Result<(), CommandError> {
        Err(CommandError::Usage("refuse"))
    }

    const ECHO: Command = Command::new("echo", "<text>...", "Print arguments", echo);
    const REFUSE: Command = Command::new("refuse", "", "Always fails", refuse);

    #[test]
    fn usage_banner_rows_keep_their_width() {
        let rows: std::vec::Vec<&str> = USAGE_BANNER.lines().filter(|row| row.starts_with(" |")).collect();
        assert_eq!(rows.len(), 7);
        assert!(rows.iter().all(|row| row.len() == 51));
        assert!(USAGE_BANNER.contains("Steps to test WiFi throughput"));
        assert!(USAGE_BANNER.ends_with("\n\n"));
    }

    #[test]
    fn transport_selection_requires_exactly_one() {
        let uart = TransportFlags {
            uart: true,
            ..TransportFlags::default()
        };
        assert_eq!(uart.select(), Ok(ConsoleTransport::Uart));
        assert_eq!(TransportFlags::default().select(), Err(ConsoleError::NoTransport));
        let both = TransportFlags {
            uart: true,
            usb_serial_jtag: true,
            ..TransportFlags::default()
        };
        assert_eq!(both.select(), Err(ConsoleError::MultipleTransports));
    }

    #[test]
    fn only_single_driven_transport_is_bootable() {
        const JTAG: TransportFlags = TransportFlags {
            uart: false,
            usb_cdc: false,
            usb_serial_jtag: true,
        };
        const CDC: TransportFlags = TransportFlags {
            uart: false,
            usb_cdc: true,
            usb_serial_jtag: false,
        };
        const JTAG_BOOTS: bool = JTAG.bootable();
        assert!(JTAG_BOOTS);
        assert!(!CDC.bootable());
        assert_eq!(CDC.select(), Ok(ConsoleTransport::UsbCdc));
        assert!(!TransportFlags::default().bootable());
        assert!(!TransportFlags {
            uart: true,
            usb_serial_jtag: true,
            ..TransportFlags::default()
        }
        .bootable());
    }

    #[test]
    fn dispatch_runs_registered_handler_with_argv() {
        let mut table = CommandTable::<4>::new();
        table.register(ECHO).unwrap();
        let out = Captured::default();
        assert_eq!(table.dispatch("  echo a  \"b c\" d", &out), Dispatch::Ran);
        assert_eq!(out.0.borrow().as_str(), "a;b c;d;");
    }

    #[test]
    fn dispatch_reports_empty_unknown_and_failures() {
        let mut table = CommandTable::<4>::new();
        table.register(REFUSE).unwrap();
        let out = Captured::default();
        assert_eq!(table.dispatch("   ", &out), Dispatch::Empty);
        assert_eq!(table.dispatch("nope", &out), Dispatch::Unknown);
        assert_eq!(
            table.dispatch("refuse", &out),
            Dispatch::Failed(CommandError::Usage("refuse"))
        );
    }

    #[test]
    fn registration_rejects_duplicates_reserved_names_and_overflow() {
        let mut table = CommandTable::<1>::new();
        assert_eq!(
            table.register(Command::new("help", "", "", echo)),
            Err(ConsoleError::ReservedName("help"))
        );
        table.register(ECHO).unwrap();
        assert_eq!(table.register(ECHO), Err(ConsoleError::DuplicateCommand("echo")));
        assert_eq!(table.register(REFUSE), Err(ConsoleError::TableFull));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let mut table = CommandTable::<4>::new();
        table.register(REFUSE).unwrap();
        table.register(ECHO).unwrap();
        let out = Captured::default();
        assert_eq!(table.dispatch("help", &out), Dispatch::Help);
        let text = out.0.borrow();
        let refuse_at = text.find("refuse").unwrap();
        let echo_at = text.find("echo <text>...").unwrap();
        assert!(refuse_at < echo_at);
        assert!(text.contains("help [<command>]"));
    }

    #[test]
    fn help_for_one_command() {
        let mut table = CommandTable::<4>::new();
        table.register(REFUSE).unwrap();
        table.register(ECHO).unwrap();
        let out = Captured::default();
        table.dispatch("help echo", &out);
        let text = out.0.borrow();
        assert!(text.contains("Print arguments"));
        assert!(!text.contains("Always fails"));
    }

    #[test]
    fn too_many_tokens_are_rejected() {
        let mut argv = heapless::Vec::<&str, 2>::new();
        assert!(split_args("a b c", &mut argv).is_err());
        let table = CommandTable::<1>::new();
        let line = "x x x x x x x x x x x x x x x x x";
        assert_eq!(table.dispatch(line, &Captured::default()), Dispatch::TooManyArgs);
    }

    #[test]
    fn unterminated_quote_takes_rest_of_line() {
        let mut argv = heapless::Vec::<&str, 4>::new();
        split_args("sta \"my net", &mut argv).unwrap();
        assert_eq!(argv.as_slice(), &["sta", "my net"]);
    }
}
