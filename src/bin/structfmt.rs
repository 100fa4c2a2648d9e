//! Pack and unpack struct-style binary records from the command line.
//!
//! Usage:
//!   structfmt calcsize FORMAT
//!   structfmt pack [--dump] FORMAT [VALUE ...]
//!   structfmt unpack [--offset N] FORMAT HEX
//!   structfmt iter [--thread] FORMAT HEX
//!
//! Packed output is printed as hex (`--dump` for an offset/hex/ASCII listing).
//! Unpacked values are printed one per line; `iter` prints one record per line.
//! Set `RUST_LOG=debug` for codec tracing.

use anyhow::{bail, Context};
use structfmt::dump::{format_values, hex_dump, parse_hex, values_for};
use structfmt::{
    calcsize, iter_unpack, pack, parse, spawn_iter_unpack, unpack_from, CodecError, Value,
};

const USAGE: &str = "usage: structfmt <calcsize|pack|unpack|iter> [OPTIONS] FORMAT [ARGS ...]";

fn take_flag(args: &mut Vec<String>, long: &str, short: &str) -> bool {
    if let Some(pos) = args.iter().position(|a| a == long || a == short) {
        args.remove(pos);
        true
    } else {
        false
    }
}

fn take_option(args: &mut Vec<String>, long: &str) -> anyhow::Result<Option<String>> {
    match args.iter().position(|a| a == long) {
        Some(pos) if pos + 1 < args.len() => {
            let value = args.remove(pos + 1);
            args.remove(pos);
            Ok(Some(value))
        }
        Some(_) => bail!("{} requires a value", long),
        None => Ok(None),
    }
}

fn print_record(values: &[Value]) {
    println!("{}", format_values(values));
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let command = args.remove(0);

    match command.as_str() {
        "calcsize" => {
            let format = args.first().context("missing FORMAT")?;
            println!("{}", calcsize(format)?);
        }
        "pack" => {
            let dump = take_flag(&mut args, "--dump", "-d");
            if args.is_empty() {
                bail!("missing FORMAT");
            }
            let format = args.remove(0);
            let descriptor = parse(&format)?;
            let values = values_for(&descriptor, &args)
                .map_err(anyhow::Error::msg)
                .context("parsing values")?;
            let bytes = pack(&format, &values)?;
            if dump {
                print!("{}", hex_dump(&bytes));
            } else {
                println!("{}", hex::encode(&bytes));
            }
        }
        "unpack" => {
            let offset = match take_option(&mut args, "--offset")? {
                Some(s) => s.parse::<usize>().context("--offset must be a non-negative integer")?,
                None => 0,
            };
            let [format, data] = args.as_slice() else {
                bail!("unpack takes FORMAT HEX");
            };
            let bytes = parse_hex(data).map_err(anyhow::Error::msg)?;
            for v in unpack_from(format, &bytes, offset)? {
                println!("{}", v);
            }
        }
        "iter" => {
            let threaded = take_flag(&mut args, "--thread", "-t");
            let [format, data] = args.as_slice() else {
                bail!("iter takes FORMAT HEX");
            };
            let bytes = parse_hex(data).map_err(anyhow::Error::msg)?;
            let record_len = parse(format)?.value_count();
            let values: Box<dyn Iterator<Item = Result<Value, CodecError>> + '_> = if threaded {
                Box::new(spawn_iter_unpack(format.as_str(), bytes)?)
            } else {
                Box::new(iter_unpack(format, &bytes))
            };
            let mut record = Vec::with_capacity(record_len);
            for v in values {
                record.push(v?);
                if record.len() == record_len {
                    print_record(&record);
                    record.clear();
                }
            }
        }
        other => {
            eprintln!("unknown command '{}'\n{}", other, USAGE);
            std::process::exit(2);
        }
    }
    Ok(())
}
