use atoi::FromRadix10SignedChecked;
use thiserror::Error;

use crate::error::StoreError;

/// Upper bound on one whole request frame
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;
/// Upper bound on a single bulk string
const MAX_BULK_LEN: usize = MAX_FRAME_LEN;
/// Upper bound on array length
const MAX_ARRAY_LEN: usize = 1024 * 1024;
/// Upper bound on array nesting
const MAX_DEPTH: usize = 32;

/// RESP (REdis Serialization Protocol) data types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// Simple strings, used for simple responses like "OK"
  SimpleString(String),
  /// Errors
  Error(String),
  /// Integers
  Integer(i64),
  /// Bulk strings, used for binary-safe strings (can be null)
  BulkString(Option<Vec<u8>>),
  /// Arrays of other values (can be null)
  Array(Option<Vec<Value>>),
}

impl Value {
  /// Create a simple OK response
  pub fn ok() -> Self {
    Value::SimpleString("OK".to_string())
  }

  /// Create an error response
  pub fn error(msg: impl Into<String>) -> Self {
    Value::Error(msg.into())
  }

  pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
    Value::BulkString(Some(data.into()))
  }

  /// Array of bulk strings
  pub fn bulk_array<I, S>(items: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<Vec<u8>>,
  {
    Value::Array(Some(items.into_iter().map(Value::bulk).collect()))
  }

  /// Raw bytes of a request item
  pub fn as_bytes(&self) -> Option<Vec<u8>> {
    match self {
      Value::BulkString(Some(data)) => Some(data.clone()),
      Value::SimpleString(s) => Some(s.as_bytes().to_vec()),
      _ => None,
    }
  }

  /// Argument text of a request item, invalid utf-8 replaced
  pub fn as_text(&self) -> Option<String> {
    match self {
      Value::BulkString(Some(data)) => Some(String::from_utf8_lossy(data).to_string()),
      Value::SimpleString(s) => Some(s.clone()),
      _ => None,
    }
  }

  /// Encode Value to RESP bytes
  pub fn encode(&self) -> Vec<u8> {
    let mut buf = Vec::new();
    self.encode_to(&mut buf);
    buf
  }

  fn encode_to(&self, buf: &mut Vec<u8>) {
    match self {
      Value::SimpleString(s) => {
        buf.push(b'+');
        buf.extend_from_slice(s.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Error(e) => {
        buf.push(b'-');
        buf.extend_from_slice(e.as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::Integer(i) => {
        buf.push(b':');
        buf.extend_from_slice(i.to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
      }
      Value::BulkString(None) => {
        buf.extend_from_slice(b"$-1\r\n");
      }
      Value::BulkString(Some(data)) => {
        buf.push(b'$');
        buf.extend_from_slice(data.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
      }
      Value::Array(None) => {
        buf.extend_from_slice(b"*-1\r\n");
      }
      Value::Array(Some(items)) => {
        buf.push(b'*');
        buf.extend_from_slice(items.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        for item in items {
          item.encode_to(buf);
        }
      }
    }
  }
}

impl From<StoreError> for Value {
  /// Error reply whose first word is the error code
  fn from(e: StoreError) -> Self {
    Value::Error(format!("{} {}", e.code(), e))
  }
}

/// Input that can never become a valid frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
  #[error("invalid type byte '{0}'")]
  InvalidType(char),
  #[error("invalid length or integer")]
  InvalidInteger,
  #[error("bulk string not terminated by CRLF")]
  MissingTerminator,
  #[error("length {0} exceeds limit")]
  TooLarge(i64),
  #[error("arrays nested deeper than {0}")]
  TooDeep(usize),
  #[error("frame exceeds {0} bytes")]
  FrameTooLarge(usize),
}

/// Parser for RESP protocol
pub struct Parser;

impl Parser {
  /// Parse RESP data from buffer
  ///
  /// Returns `Ok(None)` when the buffer holds only part of a frame, and
  /// `(Value, consumed_bytes)` once a whole frame is available.
  pub fn parse(buffer: &[u8]) -> Result<Option<(Value, usize)>, ProtocolError> {
    if buffer.is_empty() {
      return Ok(None);
    }

    let mut pos = 0;
    let result = Self::parse_value(buffer, &mut pos, 0)?;
    Ok(result.map(|value| (value, pos)))
  }

  fn parse_value(
    buffer: &[u8],
    pos: &mut usize,
    depth: usize,
  ) -> Result<Option<Value>, ProtocolError> {
    if *pos >= buffer.len() {
      return Ok(None);
    }

    let type_byte = buffer[*pos];
    *pos += 1;

    match type_byte {
      b'+' => Ok(Self::parse_simple_string(buffer, pos)),
      b'-' => Ok(Self::parse_error(buffer, pos)),
      b':' => Self::parse_integer(buffer, pos),
      b'$' => Self::parse_bulk_string(buffer, pos),
      b'*' => Self::parse_array(buffer, pos, depth + 1),
      other => Err(ProtocolError::InvalidType(other as char)),
    }
  }

  fn parse_simple_string(buffer: &[u8], pos: &mut usize) -> Option<Value> {
    let line = Self::read_line(buffer, pos)?;
    Some(Value::SimpleString(
      String::from_utf8_lossy(line).to_string(),
    ))
  }

  fn parse_error(buffer: &[u8], pos: &mut usize) -> Option<Value> {
    let line = Self::read_line(buffer, pos)?;
    Some(Value::Error(String::from_utf8_lossy(line).to_string()))
  }

  fn parse_integer(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ProtocolError> {
    match Self::read_line(buffer, pos) {
      Some(line) => Ok(Some(Value::Integer(Self::parse_number(line)?))),
      None => Ok(None),
    }
  }

  fn parse_bulk_string(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ProtocolError> {
    let Some(line) = Self::read_line(buffer, pos) else {
      return Ok(None);
    };
    let len = Self::parse_number(line)?;

    if len == -1 {
      return Ok(Some(Value::BulkString(None)));
    }

    let len = Self::checked_len(len, MAX_BULK_LEN)?;

    // Check if we have enough data (len + \r\n)
    if *pos + len + 2 > buffer.len() {
      return Ok(None);
    }
    if &buffer[*pos + len..*pos + len + 2] != b"\r\n" {
      return Err(ProtocolError::MissingTerminator);
    }

    let data = buffer[*pos..*pos + len].to_vec();
    *pos += len + 2; // +2 for \r\n

    Ok(Some(Value::BulkString(Some(data))))
  }

  fn parse_array(
    buffer: &[u8],
    pos: &mut usize,
    depth: usize,
  ) -> Result<Option<Value>, ProtocolError> {
    if depth > MAX_DEPTH {
      return Err(ProtocolError::TooDeep(MAX_DEPTH));
    }

    let Some(line) = Self::read_line(buffer, pos) else {
      return Ok(None);
    };
    let count = Self::parse_number(line)?;

    if count == -1 {
      return Ok(Some(Value::Array(None)));
    }

    let count = Self::checked_len(count, MAX_ARRAY_LEN)?;
    let mut items = Vec::with_capacity(count.min(64));

    for _ in 0..count {
      match Self::parse_value(buffer, pos, depth)? {
        Some(item) => items.push(item),
        None => return Ok(None),
      }
    }

    Ok(Some(Value::Array(Some(items))))
  }

  fn parse_number(line: &[u8]) -> Result<i64, ProtocolError> {
    match i64::from_radix_10_signed_checked(line) {
      (Some(n), used) if used == line.len() && used > 0 => Ok(n),
      _ => Err(ProtocolError::InvalidInteger),
    }
  }

  fn checked_len(len: i64, max: usize) -> Result<usize, ProtocolError> {
    match usize::try_from(len) {
      Ok(n) if n <= max => Ok(n),
      _ => Err(ProtocolError::TooLarge(len)),
    }
  }

  fn read_line<'a>(buffer: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
    let start = *pos;

    // Find \r\n
    for i in start..buffer.len().saturating_sub(1) {
      if buffer[i] == b'\r' && buffer[i + 1] == b'\n' {
        *pos = i + 2;
        return Some(&buffer[start..i]);
      }
    }

    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_simple_string() {
    let data = b"+OK\r\n";
    let (value, consumed) = Parser::parse(data).unwrap().unwrap();
    assert_eq!(value, Value::SimpleString("OK".to_string()));
    assert_eq!(consumed, 5);
  }

  #[test]
  fn test_parse_bulk_string() {
    let data = b"$5\r\nhello\r\n";
    let (value, consumed) = Parser::parse(data).unwrap().unwrap();
    assert_eq!(value, Value::bulk("hello"));
    assert_eq!(consumed, 11);
  }

  #[test]
  fn test_parse_array() {
    let data = b"*3\r\n$6\r\nUPDATE\r\n$4\r\nbook\r\n$5\r\nvalue\r\n";
    let (value, consumed) = Parser::parse(data).unwrap().unwrap();

    match value {
      Value::Array(Some(arr)) => {
        assert_eq!(arr.len(), 3);
        assert_eq!(arr[0], Value::bulk("UPDATE"));
        assert_eq!(arr[1], Value::bulk("book"));
        assert_eq!(arr[2], Value::bulk("value"));
      }
      _ => panic!("Expected array"),
    }
    assert_eq!(consumed, data.len());
  }

  #[test]
  fn test_parse_incomplete() {
    let data = b"*2\r\n$3\r\nGET\r\n$4\r\nbo";
    for end in 0..data.len() {
      assert_eq!(Parser::parse(&data[..end]).unwrap(), None);
    }
  }

  #[test]
  fn test_parse_leaves_following_frame() {
    let data = b":42\r\n+PONG\r\n";
    let (value, consumed) = Parser::parse(data).unwrap().unwrap();
    assert_eq!(value, Value::Integer(42));
    assert_eq!(consumed, 5);

    let (value, _) = Parser::parse(&data[consumed..]).unwrap().unwrap();
    assert_eq!(value, Value::SimpleString("PONG".to_string()));
  }

  #[test]
  fn test_parse_null_values() {
    assert_eq!(
      Parser::parse(b"$-1\r\n").unwrap(),
      Some((Value::BulkString(None), 5))
    );
    assert_eq!(
      Parser::parse(b"*-1\r\n").unwrap(),
      Some((Value::Array(None), 5))
    );
  }

  #[test]
  fn test_parse_protocol_errors() {
    assert_eq!(Parser::parse(b"?x\r\n"), Err(ProtocolError::InvalidType('?')));
    assert_eq!(Parser::parse(b"$abc\r\n"), Err(ProtocolError::InvalidInteger));
    assert_eq!(Parser::parse(b":12x\r\n"), Err(ProtocolError::InvalidInteger));
    assert_eq!(Parser::parse(b"$-5\r\n"), Err(ProtocolError::TooLarge(-5)));
    assert_eq!(
      Parser::parse(b"$3\r\nabcde\r\n"),
      Err(ProtocolError::MissingTerminator)
    );
  }

  #[test]
  fn test_parse_nesting_limit() {
    let mut data = b"*1\r\n".repeat(MAX_DEPTH);
    data.extend_from_slice(b":7\r\n");
    let (mut value, consumed) = Parser::parse(&data).unwrap().unwrap();
    assert_eq!(consumed, data.len());
    for _ in 0..MAX_DEPTH {
      value = match value {
        Value::Array(Some(mut items)) => items.remove(0),
        other => panic!("Expected array, got {:?}", other),
      };
    }
    assert_eq!(value, Value::Integer(7));

    let mut data = b"*1\r\n".repeat(MAX_DEPTH + 1);
    data.extend_from_slice(b":7\r\n");
    assert_eq!(Parser::parse(&data), Err(ProtocolError::TooDeep(MAX_DEPTH)));
  }

  #[test]
  fn test_parse_deep_nesting_fails_fast() {
    // Far past the limit, must error instead of recursing through it.
    let data = b"*1\r\n".repeat(200_000);
    assert_eq!(Parser::parse(&data), Err(ProtocolError::TooDeep(MAX_DEPTH)));
  }

  #[test]
  fn test_as_bytes_keeps_payload() {
    let value = Value::bulk(vec![b'a', 0xff, b'b']);
    assert_eq!(value.as_bytes(), Some(vec![b'a', 0xff, b'b']));
    assert_eq!(Value::Integer(1).as_bytes(), None);
  }

  #[test]
  fn test_encode_simple_string() {
    let value = Value::SimpleString("OK".to_string());
    assert_eq!(value.encode(), b"+OK\r\n");
  }

  #[test]
  fn test_encode_bulk_string() {
    let value = Value::bulk("hello");
    assert_eq!(value.encode(), b"$5\r\nhello\r\n");
  }

  #[test]
  fn test_encode_bulk_array() {
    let value = Value::bulk_array(["a", "bc"]);
    assert_eq!(value.encode(), b"*2\r\n$1\r\na\r\n$2\r\nbc\r\n");
  }

  #[test]
  fn test_store_error_reply() {
    let value = Value::from(StoreError::UnknownSlot("shelf".to_string()));
    assert_eq!(value, Value::error("UNKNOWNSLOT unknown slot 'shelf'"));
  }
}
