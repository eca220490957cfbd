//! JSON text in the layout the annotated datasets use (four-space indent).

use serde::{Serialize, ser::Error as _};
use serde_json::ser::{PrettyFormatter, Serializer};

const INDENT: &[u8] = b"    ";

pub fn to_indented_string<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let mut buffer = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    value.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(serde_json::Error::custom)
}
