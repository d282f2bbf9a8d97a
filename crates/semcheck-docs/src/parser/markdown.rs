use std::collections::HashMap;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::anchor::{AnchorAllocator, slugify};

/// One top-level block of the document with its plain text.
#[derive(Debug)]
struct Block {
    heading: Option<HeadingInfo>,
    text: String,
}

#[derive(Debug)]
struct HeadingInfo {
    level: u8,
    base: String,
}

/// Flattens the event stream into top-level blocks, rendering each block's
/// inline content as plain text.
struct BlockCollector {
    blocks: Vec<Block>,
    current: String,
    heading: Option<(u8, Option<String>)>,
    depth: usize,
}

impl BlockCollector {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            current: String::new(),
            heading: None,
            depth: 0,
        }
    }

    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => {
                if self.depth == 0 {
                    self.current.clear();
                    self.heading = match &tag {
                        Tag::Heading { level, id, .. } => Some((
                            *level as u8,
                            id.as_ref()
                                .map(ToString::to_string)
                                .filter(|id| !id.is_empty()),
                        )),
                        _ => None,
                    };
                }
                if self.depth > 0 && matches!(tag, Tag::List(_) | Tag::Item) {
                    self.line_break();
                }
                if matches!(tag, Tag::TableCell)
                    && !self.current.is_empty()
                    && !self.current.ends_with(['\n', ' '])
                {
                    self.current.push(' ');
                }
                self.depth += 1;
            }
            Event::End(tag) => {
                self.depth = self.depth.saturating_sub(1);
                match tag {
                    TagEnd::Paragraph
                    | TagEnd::Item
                    | TagEnd::TableRow
                    | TagEnd::TableHead
                    | TagEnd::CodeBlock
                    | TagEnd::Heading(_)
                        if self.depth > 0 =>
                    {
                        self.line_break();
                    }
                    _ => {}
                }
                if self.depth == 0 {
                    self.finish_block();
                }
            }
            Event::Text(text)
            | Event::Code(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text) => self.current.push_str(&text),
            Event::SoftBreak | Event::HardBreak => self.current.push('\n'),
            Event::Rule if self.depth == 0 => {
                self.current.clear();
                self.heading = None;
                self.finish_block();
            }
            _ => {}
        }
    }

    fn line_break(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with('\n') {
            self.current.push('\n');
        }
    }

    fn finish_block(&mut self) {
        let text = self.current.trim().to_string();
        self.current.clear();
        let heading = self.heading.take().map(|(level, id)| HeadingInfo {
            level,
            base: id.unwrap_or_else(|| slugify(&text)),
        });
        self.blocks.push(Block { heading, text });
    }
}

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    opts
}

fn collect_blocks(source: &str) -> Vec<Block> {
    let mut collector = BlockCollector::new();
    for event in Parser::new_ext(source, options()) {
        collector.push_event(event);
    }
    collector.blocks
}

/// Map every top-level heading's anchor to its section text.
///
/// A section runs until the next heading of the same or a higher level, so
/// deeper sub-sections are absorbed, their heading text included as plain
/// text.
pub(crate) fn parse_anchors(source: &str) -> HashMap<String, String> {
    let blocks = collect_blocks(source);
    let mut allocator = AnchorAllocator::new();
    let mut anchors = HashMap::new();

    for (i, block) in blocks.iter().enumerate() {
        let Some(heading) = &block.heading else {
            continue;
        };
        let anchor = allocator.allocate(&heading.base);

        let section = blocks[i + 1..]
            .iter()
            .take_while(|b| b.heading.as_ref().is_none_or(|h| h.level > heading.level))
            .map(|b| b.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        anchors.insert(anchor, section.trim().to_string());
    }

    tracing::debug!(anchors = anchors.len(), "parsed markdown document");
    anchors
}
