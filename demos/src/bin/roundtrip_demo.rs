//! Export a sample inventory, encode it, decode it and import it back.

use clap::{Parser, ValueEnum};
use dict_serializer::{DictEntity, Format, decode, encode};
use dict_serializer_demos::{Inventory, sample_inventory};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Ron,
    #[cfg(feature = "bincode")]
    Bincode,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ron => Format::Ron,
            #[cfg(feature = "bincode")]
            FormatArg::Bincode => Format::Bincode,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Round-trip an inventory through its field mapping")]
struct Args {
    /// Encoding used for the exported mapping.
    #[arg(long, value_enum, default_value = "ron")]
    format: FormatArg,

    /// Number of items in the sample inventory.
    #[arg(long, default_value_t = 3)]
    items: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting dict-serializer round-trip demo");
    log::info!("Library version: {}", dict_serializer::VERSION);
    log::info!("Demos version: {}", dict_serializer_demos::VERSION);

    let inventory = sample_inventory(args.items);
    let mapping = inventory.to_mapping()?;
    log::info!(
        "Exported {} with keys {:?}",
        Inventory::NAME,
        mapping.keys().collect::<Vec<_>>()
    );

    let format = Format::from(args.format);
    let bytes = encode(&mapping, format)?;
    log::info!("Encoded mapping as {:?}: {} bytes", format, bytes.len());
    if format == Format::Ron {
        println!("{}", String::from_utf8_lossy(&bytes));
    }

    let restored = Inventory::from_mapping(decode(&bytes, format)?)?;
    if restored != inventory {
        log::error!("Round trip changed the inventory");
        return Err("round trip mismatch".into());
    }
    log::info!(
        "Round trip OK: {} items worth {} cents",
        restored.items.len(),
        restored.total_cents()
    );
    Ok(())
}
