//! # Mapping Database Parser
//!
//! Reads the SDL `gamecontrollerdb.txt` line format into [`DeviceMapping`]
//! records, one record per call to [`MappingParser::parse_next`].
//!
//! ## Line format
//!
//! ```text
//! <uid>,<name>,<binding>,<binding>,...,<platform>,
//! ```
//!
//! Each binding is `<output>[:<input>]`; without a colon the token maps to
//! itself. Blank lines and lines starting with `#` are skipped, a trailing
//! empty field left by a terminal comma is dropped, and the platform field is
//! read but not kept.
//!
//! ## Tolerance
//!
//! Parsing never fails. A token that cannot be decoded becomes an
//! [`BindingInput::Unknown`] / [`BindingOutput::Unknown`] placeholder that
//! never matches raw input, and the rest of the line is still used.
//!
//! ## Usage
//!
//! ```
//! use padmap::mapping::MappingParser;
//!
//! let db = "030000005e0400008e02000010010000,Xbox Wired,a:b0,leftx:a0,platform:Linux,\n";
//! let mut parser = MappingParser::new(db.as_bytes());
//!
//! let mapping = parser.parse_next().unwrap();
//! assert_eq!(mapping.name, "Xbox Wired");
//! assert_eq!(mapping.bindings.len(), 2);
//! assert!(parser.parse_next().is_none());
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::Path;
use tracing::{debug, warn};

use super::binding::{Binding, BindingInput, BindingOutput, DeviceMapping};
use super::symbols::{AxisRange, HatDirection, HatMask, JoyAxis, JoyButton};
use crate::error::Result;

/// Syntactic family of a binding token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Button,
    Axis,
    Hat,
    Unknown,
}

/// Classifies a single side of a binding token.
///
/// Tried in order: bare `a`/`b`, named buttons and `b<N>`, axes
/// (`[+-]name` / `[+-]a<N>`, optional trailing `~`), then hats (`h<N>...`).
///
/// # Examples
///
/// ```
/// use padmap::mapping::{classify, TokenKind};
///
/// assert_eq!(classify("a"), TokenKind::Button);
/// assert_eq!(classify("b3"), TokenKind::Button);
/// assert_eq!(classify("-a1"), TokenKind::Axis);
/// assert_eq!(classify("h0.4"), TokenKind::Hat);
/// assert_eq!(classify("crc"), TokenKind::Unknown);
/// ```
#[must_use]
pub fn classify(token: &str) -> TokenKind {
    // Bare `a` and `b` are buttons, not axis/button ordinals
    if token == "a" || token == "b" {
        return TokenKind::Button;
    }
    if JoyButton::from_name(token).is_some() || indexed(token, 'b').is_some() {
        return TokenKind::Button;
    }
    if is_axis_token(token) {
        return TokenKind::Axis;
    }
    if token
        .strip_prefix('h')
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
    {
        return TokenKind::Hat;
    }
    TokenKind::Unknown
}

/// Digits following `prefix`, when the whole remainder is numeric.
fn indexed(token: &str, prefix: char) -> Option<&str> {
    token
        .strip_prefix(prefix)
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

fn is_axis_token(token: &str) -> bool {
    let (_, body, _) = split_axis_token(token);
    JoyAxis::from_name(body).is_some() || indexed(body, 'a').is_some()
}

/// Splits an axis token into its range sign, body and invert suffix.
fn split_axis_token(token: &str) -> (AxisRange, &str, bool) {
    let (range, rest) = if let Some(rest) = token.strip_prefix('-') {
        (AxisRange::NegativeHalf, rest)
    } else if let Some(rest) = token.strip_prefix('+') {
        (AxisRange::PositiveHalf, rest)
    } else {
        (AxisRange::Full, token)
    };

    match rest.strip_suffix('~') {
        Some(body) => (range, body, true),
        None => (range, rest, false),
    }
}

/// Decodes a button token (`a`, `dpup`, `b12`, ...).
#[must_use]
pub fn decode_button(token: &str) -> Option<JoyButton> {
    if let Some(button) = JoyButton::from_name(token) {
        return Some(button);
    }
    indexed(token, 'b')
        .and_then(|digits| digits.parse::<usize>().ok())
        .and_then(JoyButton::from_index)
}

/// Decodes an axis token into `(axis, range, invert)`.
///
/// A leading `-`/`+` selects the negative/positive half; a trailing `~`
/// inverts the raw value before the range is applied.
#[must_use]
pub fn decode_axis(token: &str) -> Option<(JoyAxis, AxisRange, bool)> {
    let (range, body, invert) = split_axis_token(token);
    let axis = match indexed(body, 'a') {
        Some(digits) => digits.parse::<usize>().ok().and_then(JoyAxis::from_index),
        None => JoyAxis::from_name(body),
    }?;
    Some((axis, range, invert))
}

/// Decodes an `h<hat>.<mask>` token into `(hat, direction)`.
///
/// The mask must be exactly one of 1, 2, 4 or 8; anything else is rejected.
#[must_use]
pub fn decode_hat(token: &str) -> Option<(u8, HatDirection)> {
    let (hat, mask) = token.strip_prefix('h')?.split_once('.')?;
    let hat = hat.parse::<u8>().ok()?;
    let mask = HatMask::from_bits(mask.parse::<u8>().ok()?)?;
    HatDirection::from_mask(mask).map(|direction| (hat, direction))
}

fn decode_input(token: &str) -> BindingInput {
    let decoded = match classify(token) {
        TokenKind::Button => decode_button(token).map(BindingInput::Button),
        TokenKind::Axis => decode_axis(token).map(|(axis, range, invert)| BindingInput::Axis {
            axis,
            range,
            invert,
        }),
        TokenKind::Hat => {
            let hat = decode_hat(token);
            if hat.is_none() {
                warn!("Malformed hat token '{}' (mask must be 1, 2, 4 or 8)", token);
            }
            hat.map(|(hat, direction)| BindingInput::Hat { hat, direction })
        }
        TokenKind::Unknown => None,
    };

    decoded.unwrap_or_else(|| {
        debug!("Unrecognized binding input '{}'", token);
        BindingInput::Unknown
    })
}

fn decode_output(token: &str) -> BindingOutput {
    let decoded = match classify(token) {
        // Hats are never outputs; fall back to a button name
        TokenKind::Button | TokenKind::Hat => decode_button(token).map(BindingOutput::Button),
        TokenKind::Axis => {
            decode_axis(token).map(|(axis, range, _)| BindingOutput::Axis { axis, range })
        }
        TokenKind::Unknown => None,
    };

    decoded.unwrap_or_else(|| {
        debug!("Unrecognized binding output '{}'", token);
        BindingOutput::Unknown
    })
}

/// Parses one `output[:input]` binding token.
///
/// # Examples
///
/// ```
/// use padmap::mapping::{parse_binding, BindingInput, BindingOutput, JoyButton};
///
/// let binding = parse_binding("start:b7");
/// assert_eq!(binding.output, BindingOutput::Button(JoyButton::START));
/// assert_eq!(binding.input, BindingInput::Button(JoyButton::from_index(7).unwrap()));
/// ```
#[must_use]
pub fn parse_binding(token: &str) -> Binding {
    let (output, input) = token.split_once(':').unwrap_or((token, token));
    Binding {
        input: decode_input(input.trim()),
        output: decode_output(output.trim()),
    }
}

/// Parses one non-comment database line.
fn parse_line(line: &str, line_number: usize) -> Option<DeviceMapping> {
    let mut fields: Vec<&str> = line.split(',').collect();

    // A terminal comma leaves an empty last field
    if fields.last().is_some_and(|field| field.trim().is_empty()) {
        fields.pop();
    }

    if fields.len() < 3 {
        warn!(
            "Skipping mapping line {}: expected uid, name and platform fields",
            line_number
        );
        return None;
    }

    let uid = fields[0].trim();
    let name = fields[1].trim();
    let bindings: Vec<Binding> = fields[2..fields.len() - 1]
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .map(parse_binding)
        .collect();

    debug!(
        "Parsed mapping '{}' ({}) with {} binding(s)",
        name,
        uid,
        bindings.len()
    );

    Some(DeviceMapping::new(uid, name, bindings))
}

/// Lazy reader of mapping-database records.
///
/// Also usable as an [`Iterator`] over [`DeviceMapping`].
#[derive(Debug)]
pub struct MappingParser<R> {
    reader: R,
    line_number: usize,
    buffer: Vec<u8>,
}

impl MappingParser<BufReader<File>> {
    /// Opens a database file for parsing.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> MappingParser<R> {
    /// Creates a parser over any buffered reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: Vec::new(),
        }
    }

    /// Number of lines consumed so far.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the next mapping record, or `None` at end of input.
    ///
    /// Read errors end the sequence with a warning; invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn parse_next(&mut self) -> Option<DeviceMapping> {
        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => {
                    warn!("Stopped reading mapping database at line {}: {}", self.line_number, e);
                    return None;
                }
            }

            let line = String::from_utf8_lossy(&self.buffer);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(mapping) = parse_line(line, self.line_number) {
                return Some(mapping);
            }
        }
    }
}

impl<R: BufRead + Seek> MappingParser<R> {
    /// Restarts parsing from the beginning of the input.
    ///
    /// # Errors
    ///
    /// Returns the underlying seek error.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.reader.rewind()?;
        self.line_number = 0;
        Ok(())
    }
}

impl<R: BufRead> Iterator for MappingParser<R> {
    type Item = DeviceMapping;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_next()
    }
}
