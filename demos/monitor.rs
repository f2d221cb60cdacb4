use std::env;
use std::time::Duration;

use inquire::Select;
use serialport::SerialPortType;
use tcm_controller::client::TcmClient;
use tcm_controller::sim::SimulatedTcmClient;
use tcm_controller::transport::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};
use tcm_controller::types::{Channel, TemperatureController};

// How long to watch the actual temperatures before exiting.
const MONITOR_DURATION_SECS: u64 = 15;

fn main() {
    env_logger::init();

    // `monitor --sim` runs against the simulated controller, anything else is
    // treated as the device's USB serial number.
    let selector = env::args().nth(1);

    let mut controller: Box<dyn TemperatureController> = match selector.as_deref() {
        Some("--sim") => {
            println!("Using simulated controller");
            Box::new(SimulatedTcmClient::new())
        }
        Some(serial_number) => open_device(serial_number),
        None => {
            let serial_number = pick_serial_number();
            open_device(&serial_number)
        }
    };

    for channel in [Channel::Ch1, Channel::Ch2] {
        println!(
            "{channel} target temperature: {:.2}",
            controller.cached_target(channel)
        );
    }

    controller.start_polling(Box::new(|t1: f64, t2: f64| {
        println!("actual: TC1 {t1:.2}  TC2 {t2:.2}");
    }));

    std::thread::sleep(Duration::from_secs(MONITOR_DURATION_SECS));
    controller.stop_polling();
}

fn open_device(serial_number: &str) -> Box<dyn TemperatureController> {
    let client = TcmClient::open(serial_number, DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT)
        .expect("Failed to open controller");
    Box::new(client)
}

/// Interactive selection over ports that expose a USB serial number.
fn pick_serial_number() -> String {
    let ports = serialport::available_ports().expect("Failed to enumerate serial ports");

    let serial_numbers: Vec<String> = ports
        .iter()
        .filter_map(|port| match &port.port_type {
            SerialPortType::UsbPort(usb) => usb.serial_number.clone(),
            _ => None,
        })
        .collect();

    if serial_numbers.is_empty() {
        eprintln!("No USB serial ports with a serial number found!");
        std::process::exit(1);
    }

    Select::new("Select a device serial number:", serial_numbers)
        .prompt()
        .expect("Failed to select device")
}
