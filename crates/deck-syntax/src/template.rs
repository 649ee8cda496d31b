//! Template source splitting and block parsing.
//!
//! A template is literal text interleaved with `{{ expr }}` outputs,
//! `{% tag %}` blocks and `{# comment #}` comments. A `-` right inside a
//! delimiter (`{{-`, `-%}`) trims whitespace on that side.

use crate::ast::{Expr, Node, Template};
use crate::lexer::TokenKind;
use crate::parser::{parse_expression_at, ParseError, Parser};

/// Opening delimiters that make a string a template.
pub const TEMPLATE_DELIMITERS: [&str; 3] = ["{{", "{%", "{#"];

/// Returns `true` when `source` contains any template delimiter.
#[must_use]
pub fn contains_template(source: &str) -> bool {
    TEMPLATE_DELIMITERS
        .iter()
        .any(|delimiter| source.contains(delimiter))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'src> {
    Text(&'src str),
    Output { source: &'src str, offset: u32 },
    Tag { source: &'src str, offset: u32 },
}

enum BlockTag {
    If(Expr),
    Elif(Expr),
    Else,
    Endif,
}

impl BlockTag {
    fn name(&self) -> &'static str {
        match self {
            Self::If(_) => "if",
            Self::Elif(_) => "elif",
            Self::Else => "else",
            Self::Endif => "endif",
        }
    }
}

struct TagAt {
    tag: BlockTag,
    offset: u32,
}

/// Parses template source into a node tree.
pub fn parse_template(source: &str) -> Result<Template, ParseError> {
    let segments = split_segments(source)?;
    let mut segments = segments.into_iter();
    let (nodes, end) = parse_nodes(&mut segments)?;
    if let Some(stray) = end {
        return Err(unexpected_tag(&stray));
    }
    Ok(Template { nodes })
}

fn offset_of(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn find_open(source: &str, from: usize) -> Option<(usize, u8)> {
    let bytes = source.as_bytes();
    let mut index = from;
    while let Some(found) = source[index..].find('{') {
        let at = index + found;
        match bytes.get(at + 1) {
            Some(kind @ (b'{' | b'%' | b'#')) => return Some((at, *kind)),
            _ => index = at + 1,
        }
    }
    None
}

/// Finds `close` starting at `from`, skipping over quoted strings. Scans
/// bytes, so `from` need not sit on a char boundary.
fn find_close(source: &str, from: usize, close: &str) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut index = from;
    while index < bytes.len() {
        let byte = bytes[index];
        match quote {
            Some(q) => {
                if byte == b'\\' {
                    index += 1;
                } else if byte == q {
                    quote = None;
                }
            }
            None => {
                if byte == b'\'' || byte == b'"' {
                    quote = Some(byte);
                } else if bytes[index..].starts_with(close.as_bytes()) {
                    return Some(index);
                }
            }
        }
        index += 1;
    }
    None
}

fn split_segments(source: &str) -> Result<Vec<Segment<'_>>, ParseError> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut trim_next = false;

    while let Some((open_at, kind)) = find_open(source, cursor) {
        let mut text = &source[cursor..open_at];
        if trim_next {
            text = text.trim_start();
            trim_next = false;
        }
        let mut inner_start = open_at + 2;
        if bytes.get(inner_start) == Some(&b'-') {
            text = text.trim_end();
            inner_start += 1;
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        let found = if kind == b'#' {
            source[inner_start..]
                .find("#}")
                .map(|found| found + inner_start)
        } else {
            let close = if kind == b'{' { "}}" } else { "%}" };
            find_close(source, inner_start, close)
        };
        let close_at = found.ok_or_else(|| {
            ParseError::new(
                format!("unclosed '{{{}' delimiter", kind as char),
                offset_of(open_at),
            )
        })?;

        let mut inner_end = close_at;
        if close_at > inner_start && bytes[close_at - 1] == b'-' {
            inner_end -= 1;
            trim_next = true;
        }
        let inner = &source[inner_start..inner_end];
        let offset = offset_of(inner_start);
        match kind {
            b'{' => segments.push(Segment::Output {
                source: inner,
                offset,
            }),
            b'%' => segments.push(Segment::Tag {
                source: inner,
                offset,
            }),
            _ => {}
        }
        cursor = close_at + 2;
    }

    let mut tail = &source[cursor..];
    if trim_next {
        tail = tail.trim_start();
    }
    if !tail.is_empty() {
        segments.push(Segment::Text(tail));
    }
    Ok(segments)
}

fn parse_tag(source: &str, offset: u32) -> Result<TagAt, ParseError> {
    let mut parser = Parser::new(source, offset);
    let tag = match parser.current() {
        TokenKind::KwIf => {
            parser.bump();
            BlockTag::If(parser.parse_expression()?)
        }
        TokenKind::KwElif => {
            parser.bump();
            BlockTag::Elif(parser.parse_expression()?)
        }
        TokenKind::KwElse => {
            parser.bump();
            BlockTag::Else
        }
        TokenKind::KwEndif => {
            parser.bump();
            BlockTag::Endif
        }
        _ => {
            return Err(parser.error(format!(
                "unknown block tag '{}'",
                parser.current_text()
            )))
        }
    };
    parser.finish()?;
    Ok(TagAt { tag, offset })
}

fn unexpected_tag(stray: &TagAt) -> ParseError {
    ParseError::new(
        format!("unexpected '{}' block tag", stray.tag.name()),
        stray.offset,
    )
}

/// Parses nodes until the input ends or a non-`if` block tag closes the
/// current body; that tag is returned to the caller.
fn parse_nodes<'src>(
    segments: &mut impl Iterator<Item = Segment<'src>>,
) -> Result<(Vec<Node>, Option<TagAt>), ParseError> {
    let mut nodes = Vec::new();
    while let Some(segment) = segments.next() {
        match segment {
            Segment::Text(text) => nodes.push(Node::Text(text.to_string())),
            Segment::Output { source, offset } => {
                nodes.push(Node::Output(parse_expression_at(source, offset)?));
            }
            Segment::Tag { source, offset } => {
                let TagAt { tag, offset } = parse_tag(source, offset)?;
                match tag {
                    BlockTag::If(condition) => {
                        nodes.push(parse_if(segments, condition, offset)?);
                    }
                    other => return Ok((nodes, Some(TagAt { tag: other, offset }))),
                }
            }
        }
    }
    Ok((nodes, None))
}

fn parse_if<'src>(
    segments: &mut impl Iterator<Item = Segment<'src>>,
    condition: Expr,
    offset: u32,
) -> Result<Node, ParseError> {
    let mut branches = Vec::new();
    let mut condition = condition;
    loop {
        let (body, end) = parse_nodes(segments)?;
        branches.push((condition, body));
        match end {
            Some(TagAt {
                tag: BlockTag::Elif(next),
                ..
            }) => condition = next,
            Some(TagAt {
                tag: BlockTag::Else,
                ..
            }) => {
                let (otherwise, end) = parse_nodes(segments)?;
                return match end {
                    Some(TagAt {
                        tag: BlockTag::Endif,
                        ..
                    }) => Ok(Node::If {
                        branches,
                        otherwise,
                    }),
                    Some(stray) => Err(unexpected_tag(&stray)),
                    None => Err(ParseError::new("unclosed 'if' block", offset)),
                };
            }
            Some(TagAt {
                tag: BlockTag::Endif,
                ..
            }) => {
                return Ok(Node::If {
                    branches,
                    otherwise: Vec::new(),
                })
            }
            Some(stray) => return Err(unexpected_tag(&stray)),
            None => return Err(ParseError::new("unclosed 'if' block", offset)),
        }
    }
}
