// Macropad CLI
// Attach to a dedicated keyboard and run user-defined commands per keystroke

use std::ffi::CStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use macropad_core::{key_release, ActionMap, DeviceError, InputDevice, InputEvent};

const INPUT_BY_ID_DIR: &str = "/dev/input/by-id";

/// Turn a dedicated keyboard into a macro keypad
#[derive(Parser, Debug)]
#[command(name = "macropad")]
#[command(about = "Turn a dedicated keyboard into a macro keypad", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the devices under /dev/input/by-id/
    List,

    /// Attach to a keyboard device and handle keystrokes
    Run {
        /// The device path to connect to
        #[arg(short, long)]
        device: PathBuf,

        #[command(flatten)]
        mode: Mode,
    },
}

#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
struct Mode {
    /// Interactively print the user keystrokes
    #[arg(short, long)]
    print_keystrokes: bool,

    /// Execute macros with the given configuration file
    #[arg(short = 'm', long = "macro", value_name = "CONFIG_FILE")]
    macro_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::List => list_devices(),
        Command::Run { device, mode } => {
            if let Some(config) = mode.macro_config {
                let map = ActionMap::from_json_path(&config)
                    .with_context(|| format!("loading action mapping from {}", config.display()))?;
                info!("loaded {} key mapping(s)", map.len());
                run(&device, true, macro_handler(map))
            } else {
                run(&device, false, print_handler)
            }
        }
    }
}

/// List connected input devices by their stable by-id names
fn list_devices() -> Result<()> {
    let entries = fs::read_dir(INPUT_BY_ID_DIR)
        .with_context(|| format!("listing {}", INPUT_BY_ID_DIR))?;

    println!("The following devices are connected:");
    for entry in entries {
        let entry = entry.with_context(|| format!("listing {}", INPUT_BY_ID_DIR))?;
        println!(" (-) {}", entry.file_name().to_string_lossy());
    }
    Ok(())
}

/// Handler for print mode: report each completed keystroke
fn print_handler(event: InputEvent) {
    if let Some(key) = key_release(&event) {
        println!("Received keystroke: {}", key);
    }
}

/// Handler for macro mode: run the mapped command for each completed
/// keystroke. Unmapped keys are a no-op. The command runs synchronously,
/// so no further events are consumed until it finishes; the kernel
/// buffers a bounded number of pending events meanwhile.
fn macro_handler(map: ActionMap) -> impl FnMut(InputEvent) {
    move |event| {
        let Some(key) = key_release(&event) else {
            return;
        };
        let Some(command) = map.lookup(key) else {
            return;
        };

        info!("{} -> running {:?}", key, command);
        match process::Command::new(&command[0]).args(&command[1..]).status() {
            Ok(status) if status.success() => {}
            Ok(status) => warn!("command {:?} exited with {}", command, status),
            Err(e) => error!("failed to run {:?}: {}", command, e),
        }
    }
}

/// Attach to the device and feed every event to `handler` until the
/// stream ends or a termination signal arrives.
fn run<F>(device_path: &Path, grab: bool, handler: F) -> Result<()>
where
    F: FnMut(InputEvent),
{
    // First signal sets the flag and lets the dispatch loop wind down if
    // the read surfaces EINTR; a second one terminates outright (the
    // kernel releases the grab with the fd). signal-hook installs its
    // handlers with SA_RESTART, so the read is not guaranteed to return
    // on the first signal.
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 130, Arc::clone(&shutdown))
            .context("registering shutdown handler")?;
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("registering shutdown handler")?;
    }

    let mut device = match InputDevice::open(device_path) {
        Err(DeviceError::DeviceUnavailable { path, source })
            if source.kind() == std::io::ErrorKind::PermissionDenied =>
        {
            bail!(
                "permission denied opening {}: are you running as root?",
                path.display()
            );
        }
        other => other?,
    };

    // Opening the device needs root; nothing after this point does
    drop_privileges().context("dropping privileges")?;

    info!("connected to device '{}'", device.name()?);

    if grab {
        device.grab(true).context("grabbing device for exclusive use")?;
        info!("device grabbed for exclusive use");
    }

    device.read_events(handler)?;

    if shutdown.load(Ordering::SeqCst) {
        info!("received termination signal, quitting");
    } else {
        info!("device stream ended");
    }

    // The session's Drop ungrabs and closes on every path; dropping here
    // just makes the release explicit before exit.
    drop(device);
    Ok(())
}

/// Drop root privileges to nobody/nogroup.
///
/// One-time, irreversible process-wide transition: runs strictly after
/// the device is opened and strictly before any mapped command executes.
/// No-op when not running as root.
fn drop_privileges() -> Result<()> {
    if unsafe { libc::getuid() } != 0 {
        return Ok(());
    }

    const NOBODY: &CStr = c"nobody";
    const NOGROUP: &CStr = c"nogroup";

    let pw = unsafe { libc::getpwnam(NOBODY.as_ptr()) };
    if pw.is_null() {
        bail!("user 'nobody' not found");
    }
    let gr = unsafe { libc::getgrnam(NOGROUP.as_ptr()) };
    if gr.is_null() {
        bail!("group 'nogroup' not found");
    }
    let uid = unsafe { (*pw).pw_uid };
    let gid = unsafe { (*gr).gr_gid };

    if unsafe { libc::setgroups(0, std::ptr::null()) } != 0 {
        return Err(std::io::Error::last_os_error()).context("setgroups");
    }
    if unsafe { libc::setgid(gid) } != 0 {
        return Err(std::io::Error::last_os_error()).context("setgid");
    }
    if unsafe { libc::setuid(uid) } != 0 {
        return Err(std::io::Error::last_os_error()).context("setuid");
    }

    unsafe { libc::umask(0o022) };

    info!("dropped privileges to nobody/nogroup");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_run_with_macro_config() {
        let args = Args::parse_from([
            "macropad",
            "run",
            "--device",
            "/dev/input/by-id/my-keypad",
            "--macro",
            "/etc/macropad.json",
        ]);

        match args.command {
            Command::Run { device, mode } => {
                assert_eq!(device, PathBuf::from("/dev/input/by-id/my-keypad"));
                assert!(!mode.print_keystrokes);
                assert_eq!(mode.macro_config, Some(PathBuf::from("/etc/macropad.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_run_with_print_keystrokes() {
        let args = Args::parse_from([
            "macropad",
            "run",
            "--device",
            "/dev/input/event3",
            "--print-keystrokes",
        ]);

        match args.command {
            Command::Run { device, mode } => {
                assert_eq!(device, PathBuf::from("/dev/input/event3"));
                assert!(mode.print_keystrokes);
                assert_eq!(mode.macro_config, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_args_run_requires_exactly_one_mode() {
        // neither mode
        assert!(Args::try_parse_from(["macropad", "run", "--device", "/dev/input/event3"]).is_err());
        // both modes
        assert!(Args::try_parse_from([
            "macropad",
            "run",
            "--device",
            "/dev/input/event3",
            "--print-keystrokes",
            "--macro",
            "/etc/macropad.json",
        ])
        .is_err());
    }

    #[test]
    fn test_args_list() {
        let args = Args::parse_from(["macropad", "list"]);
        assert!(matches!(args.command, Command::List));
    }
}
