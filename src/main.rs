use std::process::ExitCode;

use clap::Parser;

use ftdi_serializer::constants::MAX_BUS_POWER_MA;
use ftdi_serializer::serialize::{DEFAULT_MANUFACTURER, DEFAULT_PRODUCT};
use ftdi_serializer::{
    find_serializable_device, Error, FtdiDevice, HardwareConfig, Identity, Patcher, Serializer,
};

/// Serialize a Copilot Lite FT230X EEPROM
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// USB manufacturer string to program
    #[clap(short, long, default_value = DEFAULT_MANUFACTURER)]
    manufacturer: String,
    /// USB product string to program
    #[clap(short, long, default_value = DEFAULT_PRODUCT)]
    product: String,
    /// maximum bus current in mA (ex: 100, 500)
    #[clap(long, default_value_t = MAX_BUS_POWER_MA, value_parser = clap::value_parser!(u16).range(0..=500))]
    max_power: u16,
    /// build the image and print it without writing the EEPROM
    #[clap(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match serialize(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err {
                Error::DeviceNotFound => println!(
                    "No Copilot Lite device was found, please connect one and restart this program."
                ),
                Error::MultipleDevices(_) => println!(
                    "More than one Copilot Lite device was found, please connect only one device and restart this program."
                ),
                err => log::error!("{err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn serialize(cli: &Cli) -> Result<(), Error> {
    println!("Searching for the FTDI device to serialize...");
    let candidate = match find_serializable_device(&Identity::defaults()) {
        Ok(candidate) => {
            println!("Found 1 Copilot Lite device(s).");
            candidate
        }
        Err(Error::MultipleDevices(n)) => {
            println!("Found {n} Copilot Lite device(s).");
            return Err(Error::MultipleDevices(n));
        }
        Err(Error::DeviceNotFound) => {
            println!("Found 0 Copilot Lite device(s).");
            return Err(Error::DeviceNotFound);
        }
        Err(err) => return Err(err),
    };

    let serializer = Serializer::new(
        Patcher::new(cli.manufacturer.as_str(), cli.product.as_str()),
        HardwareConfig::default().max_power(cli.max_power),
    );
    let mut dev = FtdiDevice::from_device_info(candidate.info)?;

    println!(
        "Serializing the device with serial number \"{}\".",
        candidate.serial.as_deref().unwrap_or("")
    );

    if cli.dry_run {
        let report = serializer.dry_run(&mut dev)?;
        let buf = report.image.as_bytes();
        println!("EEPROM image (checksum {:#06x}):", report.checksum);
        for (i, chunk) in buf[..report.placement.end().next_multiple_of(16)]
            .chunks(16)
            .enumerate()
        {
            print!("  {:04X}: ", i * 16);
            for b in chunk {
                print!("{b:02X} ");
            }
            println!();
        }
        return Ok(());
    }

    serializer.run(&mut dev)?;
    println!(
        "\x1b[32mSerialization was successful, please reset the FTDI device by disconnecting it.\x1b[0m"
    );
    Ok(())
}
