//! STL readers, used to verify what the writers and the kernel produced.

use crate::errors::ExportError;

/// One decoded facet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlFacet {
    pub normal: [f32; 3],
    pub vertices: [[f32; 3]; 3],
}

/// Parse an ASCII STL document.
///
/// Accepts the grammar produced by [`crate::write_ascii_stl`]; indentation
/// and blank lines are ignored, but keywords must appear in order.
pub fn parse_ascii_stl(text: &str) -> Result<Vec<StlFacet>, ExportError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    match lines.next() {
        Some((_, l)) if l == "solid" || l.starts_with("solid ") => {}
        Some((n, _)) => return Err(parse_error(n, "expected `solid` header")),
        None => return Err(parse_error(0, "empty document")),
    }

    let mut facets = Vec::new();
    loop {
        let (n, line) = lines
            .next()
            .ok_or_else(|| parse_error(0, "missing `endsolid` footer"))?;

        if line == "endsolid" || line.starts_with("endsolid ") {
            return Ok(facets);
        }

        let normal = match line.strip_prefix("facet normal ") {
            Some(rest) => parse_triple(n, rest)?,
            None => return Err(parse_error(n, "expected `facet normal`")),
        };
        expect_keyword(&mut lines, "outer loop")?;

        let mut vertices = [[0.0f32; 3]; 3];
        for v in &mut vertices {
            let (n, line) = lines
                .next()
                .ok_or_else(|| parse_error(0, "truncated facet"))?;
            let rest = line
                .strip_prefix("vertex ")
                .ok_or_else(|| parse_error(n, "expected `vertex`"))?;
            *v = parse_triple(n, rest)?;
        }

        expect_keyword(&mut lines, "endloop")?;
        expect_keyword(&mut lines, "endfacet")?;
        facets.push(StlFacet { normal, vertices });
    }
}

/// Parse a binary STL buffer.
pub fn parse_binary_stl(bytes: &[u8]) -> Result<Vec<StlFacet>, ExportError> {
    if bytes.len() < 84 {
        return Err(parse_error(0, "binary STL shorter than its header"));
    }
    let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]) as usize;
    let expected = 84 + count * 50;
    if bytes.len() != expected {
        return Err(parse_error(
            0,
            format!(
                "binary STL declares {count} facets ({expected} bytes) but has {} bytes",
                bytes.len()
            ),
        ));
    }

    let read_f32 = |at: usize| {
        f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    };
    let read_vec = |at: usize| [read_f32(at), read_f32(at + 4), read_f32(at + 8)];

    Ok((0..count)
        .map(|i| {
            let base = 84 + i * 50;
            StlFacet {
                normal: read_vec(base),
                vertices: [
                    read_vec(base + 12),
                    read_vec(base + 24),
                    read_vec(base + 36),
                ],
            }
        })
        .collect())
}

fn expect_keyword<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    keyword: &str,
) -> Result<(), ExportError> {
    match lines.next() {
        Some((_, l)) if l == keyword => Ok(()),
        Some((n, _)) => Err(parse_error(n, format!("expected `{keyword}`"))),
        None => Err(parse_error(0, format!("missing `{keyword}`"))),
    }
}

fn parse_triple(line: usize, text: &str) -> Result<[f32; 3], ExportError> {
    let mut out = [0.0f32; 3];
    let mut parts = text.split_whitespace();
    for c in &mut out {
        let token = parts
            .next()
            .ok_or_else(|| parse_error(line, "expected three numbers"))?;
        *c = token
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number `{token}`")))?;
    }
    if parts.next().is_some() {
        return Err(parse_error(line, "expected three numbers"));
    }
    Ok(out)
}

fn parse_error(line: usize, reason: impl Into<String>) -> ExportError {
    ExportError::Parse {
        line,
        reason: reason.into(),
    }
}
