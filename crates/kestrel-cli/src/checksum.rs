//! Checksum line format (`b2sum` compatible).
//!
//! Each line is `<hex digest>  <name>`; a `*` in place of the second space
//! marks binary mode and is accepted for compatibility.

use kestrel_blake2b::{Digest, MAX_DIGEST_SIZE};

/// One parsed checksum line
#[derive(Debug, PartialEq, Eq)]
pub struct ChecksumLine<'a> {
    /// Expected digest bytes
    pub expected: Vec<u8>,
    /// File name, `-` for stdin
    pub name: &'a str,
}

/// Format a digest the way `sum` prints it
#[must_use]
pub fn format_line(digest: &Digest, name: &str) -> String {
    format!("{}  {}", digest.to_hex(), name)
}

/// Parse one line; blank lines and `#` comments yield `None`
///
/// # Errors
///
/// Returns an error if the line is malformed or the digest is not 1..=64
/// bytes of hex.
pub fn parse_line(line: &str) -> anyhow::Result<Option<ChecksumLine<'_>>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (hex_part, rest) = line
        .split_once(' ')
        .ok_or_else(|| anyhow::anyhow!("missing file name in '{}'", line))?;
    let name = rest
        .strip_prefix(' ')
        .or_else(|| rest.strip_prefix('*'))
        .ok_or_else(|| anyhow::anyhow!("expected two-space separator in '{}'", line))?;
    if name.is_empty() {
        anyhow::bail!("missing file name in '{}'", line);
    }

    let expected = hex::decode(hex_part)
        .map_err(|e| anyhow::anyhow!("invalid digest '{}': {}", hex_part, e))?;
    if expected.is_empty() || expected.len() > MAX_DIGEST_SIZE {
        anyhow::bail!(
            "digest must be 1 to {} bytes, got {}",
            MAX_DIGEST_SIZE,
            expected.len()
        );
    }

    Ok(Some(ChecksumLine { expected, name }))
}
