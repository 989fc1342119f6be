#[macro_use]
extern crate log;

use std::fs;
use std::process;
use std::thread;

use chrono::{Duration, Local};
use getopts::{Matches, Options};
use simplelog::{Config, LevelFilter, SimpleLogger};

use pathfinder::config::{NavigatorConfig, BAUD_RATE};
use pathfinder::geometry::Point;
use pathfinder::navigation::{Mode, Navigator};
use pathfinder::simulation::Simulation;
use pathfinder::termios::BaudRate;
use pathfinder::transport::{BufferedTransport, SerialTransport};

const TICK_PERIOD_MS: i64 = 50;

enum Link {
    Serial { device: String, speed: BaudRate },
    Script(String),
}

struct Settings {
    link: Link,
    start: Point,
    max_ticks: Option<u64>,
}


fn main() {
    let settings = match handle_opts() {
        Some(settings) => settings,
        None => return,
    };
    info!("Starting up at {}", settings.start);

    // There is no motor driver on this side of the link, the car is simulated
    let simulation = Simulation::new(settings.start, 0.0);
    let mut hardware = simulation.hardware();
    let config = NavigatorConfig::default();

    match settings.link {
        Link::Serial { device, speed } => {
            let mut transport = match SerialTransport::open(&device, speed) {
                Ok(transport) => transport,
                Err(e) => {
                    error!("Unable to open {}: {}", device, e);
                    process::exit(1);
                }
            };
            let mut navigator = Navigator::new(hardware.lend(&mut transport), settings.start, config);
            let period = Duration::milliseconds(TICK_PERIOD_MS).to_std().ok();
            run(&mut navigator, settings.max_ticks, period, |_| false);
        },
        Link::Script(file_name) => {
            let script = match fs::read(&file_name) {
                Ok(script) => script,
                Err(e) => {
                    error!("Unable to read {}: {}", file_name, e);
                    process::exit(1);
                }
            };
            let transport = BufferedTransport::new();
            transport.inject(&script);
            let mut link = transport.clone();
            let mut navigator = Navigator::new(hardware.lend(&mut link), settings.start, config);
            run(&mut navigator, settings.max_ticks, None, |navigator| {
                for line in transport.take_sent().lines() {
                    info!("Reported {}", line);
                }
                navigator.mode() == Mode::Idle
                    && !navigator.path().has_pending()
                    && transport.pending_input() == 0
            });
        },
    }

    let state = simulation.state();
    info!(
        "Shutting down, simulated car at {} heading {:.0} after {} steps",
        state.position,
        state.heading,
        state.steps);
}


/**
 * Ticks the navigator until `finished` says so or the tick limit is reached.
 */
fn run<F>(
    navigator: &mut Navigator,
    max_ticks: Option<u64>,
    period: Option<std::time::Duration>,
    mut finished: F,
) where F: FnMut(&Navigator) -> bool {
    let started = Local::now();
    let mut ticks: u64 = 0;
    loop {
        if let Some(limit) = max_ticks {
            if ticks >= limit {
                warn!("Stopping after {} ticks", limit);
                break;
            }
        }
        navigator.tick();
        ticks += 1;
        if finished(&*navigator) {
            break;
        }
        if let Some(period) = period {
            thread::sleep(period);
        }
    }
    let elapsed = Local::now().signed_duration_since(started);
    info!(
        "Ran {} ticks in {} ms, estimated position {} while {:?}",
        ticks,
        elapsed.num_milliseconds(),
        navigator.position(),
        navigator.mode());
}


fn handle_opts() -> Option<Settings> {
    let mut opts = Options::new();
    opts.optopt("d", "device", "Serial device carrying the command link.", "PATH");
    opts.optopt("b", "baud", &format!("Baud rate of the serial device, default {}.", BAUD_RATE), "RATE");
    opts.optopt("s", "script", "Read commands from a file instead of a device.", "PATH");
    opts.optopt("x", "start-x", "Starting x coordinate, default 0.", "X");
    opts.optopt("y", "start-y", "Starting y coordinate, default 0.", "Y");
    opts.optopt("t", "ticks", "Stop after this many ticks.", "COUNT");
    opts.optflag("v", "verbose", "Prints extra logging.");
    opts.optflag("h", "help", "Print this help menu.");
    let mut args = std::env::args();
    args.next();  // Skip the program name
    let matches = match opts.parse(args) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Unable to parse options: {}", e);
            print_usage(&opts);
            return None;
        }
    };
    if matches.opt_present("h") {
        print_usage(&opts);
        return None;
    }

    let level = if matches.opt_present("v") {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        };
    if let Err(e) = SimpleLogger::init(level, Config::default()) {
        panic!("Unable to initialize logger: {}", e);
    }

    let link = match (matches.opt_str("d"), matches.opt_str("s")) {
        (Some(device), None) => {
            let rate = parse_opt(&matches, "b", BAUD_RATE)?;
            let speed = match BaudRate::from_bits_per_second(rate) {
                Some(speed) => speed,
                None => {
                    error!("Unsupported baud rate {}", rate);
                    return None;
                }
            };
            Link::Serial { device, speed }
        },
        (None, Some(script)) => Link::Script(script),
        _ => {
            error!("Exactly one of --device and --script is required");
            print_usage(&opts);
            return None;
        }
    };

    let start = Point::new(parse_opt(&matches, "x", 0.0)?, parse_opt(&matches, "y", 0.0)?);
    let max_ticks = match matches.opt_str("t") {
        Some(_) => Some(parse_opt(&matches, "t", 0)?),
        None => None,
    };
    Some(Settings { link, start, max_ticks })
}


fn parse_opt<T: std::str::FromStr>(matches: &Matches, name: &str, default: T) -> Option<T> {
    match matches.opt_str(name) {
        None => Some(default),
        Some(value) => match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                error!("Invalid value for -{}: {}", name, value);
                None
            }
        },
    }
}


fn print_usage(opts: &Options) {
    let brief = "Usage: pathfinder (--device PATH | --script PATH) [options]";
    print!("{}", opts.usage(brief));
}
