//! Text rendering of packed buffers and unpacked values, and parsing of textual
//! arguments into [`Value`]s for a given format (used by the `structfmt` binary).

use crate::ast::FormatDescriptor;
use crate::table::{Kind, TypeSpec};
use crate::value::Value;

/// Render values as `[a, b, c]`.
pub fn format_values(values: &[Value]) -> String {
    let parts: Vec<String> = values.iter().map(Value::to_string).collect();
    format!("[{}]", parts.join(", "))
}

/// Classic offset / hex / ASCII dump, 16 bytes per line.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}  {:<47}  |{}|\n", i * 16, hex.join(" "), ascii));
    }
    out
}

/// Decode a hex string, ignoring whitespace and an optional `0x` prefix.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    hex::decode(digits).map_err(|e| format!("invalid hex: {}", e))
}

/// Parse one textual argument as a value for `spec`.
pub fn parse_value(spec: &TypeSpec, text: &str) -> Result<Value, String> {
    let bad = |what: &str| format!("'{}' is not a valid {} for '{}'", text, what, spec.code);
    match spec.kind {
        Kind::Integer { signed: true } => {
            let n = parse_int(text).ok_or_else(|| bad("integer"))?;
            let v = match spec.width {
                1 => i8::try_from(n).map(Value::I8).ok(),
                2 => i16::try_from(n).map(Value::I16).ok(),
                4 => i32::try_from(n).map(Value::I32).ok(),
                _ => i64::try_from(n).map(Value::I64).ok(),
            };
            v.ok_or_else(|| bad("integer in range"))
        }
        Kind::Integer { signed: false } => {
            let n = parse_int(text).ok_or_else(|| bad("integer"))?;
            let v = match spec.width {
                1 => u8::try_from(n).map(Value::U8).ok(),
                2 => u16::try_from(n).map(Value::U16).ok(),
                4 => u32::try_from(n).map(Value::U32).ok(),
                _ => u64::try_from(n).map(Value::U64).ok(),
            };
            v.ok_or_else(|| bad("integer in range"))
        }
        Kind::Float if spec.width == 4 => text.parse().map(Value::Float).map_err(|_| bad("float")),
        Kind::Float => text.parse().map(Value::Double).map_err(|_| bad("float")),
        Kind::Bool => match text {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(bad("bool")),
        },
        Kind::Text => Ok(Value::from(text)),
        Kind::Pad => Err(format!("'{}' takes no value", spec.code)),
    }
}

fn parse_int(text: &str) -> Option<i128> {
    let (neg, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let n = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => body.parse::<i128>().ok()?,
    };
    Some(if neg { -n } else { n })
}

/// Map textual arguments onto the items of `descriptor` in order.
///
/// Arguments beyond what the format consumes are kept as text so that packing
/// reports the surplus; missing arguments simply end the list.
pub fn values_for(descriptor: &FormatDescriptor, args: &[String]) -> Result<Vec<Value>, String> {
    let mut out = Vec::with_capacity(args.len());
    let mut rest = args.iter();
    'items: for item in &descriptor.items {
        for _ in 0..item.value_count() {
            match rest.next() {
                Some(arg) => out.push(parse_value(item.spec, arg)?),
                None => break 'items,
            }
        }
    }
    out.extend(rest.map(|a| Value::from(a.as_str())));
    Ok(out)
}
