//! Entity parsing over message text.
//!
//! Entity offsets and lengths count UTF-16 code units, so every slice goes through
//! [`utf16_to_byte`]. Entities whose bounds fall outside the text (or inside a surrogate pair)
//! are skipped rather than reported.

use crate::types::{Command, EntityKind, MessageEntity};

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte index of the UTF-16 `offset` in `text`, or `None` when out of range or mid-character.
pub fn utf16_to_byte(text: &str, offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units == offset {
            return Some(byte);
        }
        units += ch.len_utf16();
        if units > offset {
            return None;
        }
    }
    (units == offset).then_some(text.len())
}

/// Substring between two UTF-16 offsets (`start` inclusive, `end` exclusive).
pub fn utf16_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let from = utf16_to_byte(text, start)?;
    let to = utf16_to_byte(text, end)?;
    Some(&text[from..to])
}

/// Every `bot_command` entity turned into a [`Command`], in entity order.
pub fn parse_commands(text: &str, entities: &[MessageEntity]) -> Vec<Command> {
    entities
        .iter()
        .filter(|e| e.kind == EntityKind::BotCommand)
        .filter_map(|e| parse_command(text, e))
        .collect()
}

/// Parses one `bot_command` entity.
///
/// The command token is the entity span extended through any directly following non-whitespace,
/// so `/ban@mybot` is read whole even when the entity length stops inside the suffix.
pub fn parse_command(text: &str, entity: &MessageEntity) -> Option<Command> {
    let start = utf16_to_byte(text, entity.offset)?;
    let entity_end = utf16_to_byte(text, entity.end()?)?;
    if entity_end < start {
        return None;
    }
    let rest = &text[entity_end..];
    let token_end = entity_end + rest.find(char::is_whitespace).unwrap_or(rest.len());
    let token = &text[start..token_end];

    let body = token.strip_prefix('/')?;
    let (name, bot_username) = match body.split_once('@') {
        Some((name, bot)) => (name, Some(bot).filter(|b| !b.is_empty())),
        None => (body, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(Command {
        name: name.to_string(),
        bot_username: bot_username.map(str::to_string),
        start: entity.offset,
        end: entity.offset + utf16_len(token) - 1,
        params: text[token_end..]
            .split_whitespace()
            .map(str::to_string)
            .collect(),
    })
}

/// Username of a `mention` entity (`text[offset+1 .. offset+length)`), `None` for other kinds.
pub fn mention_username(text: &str, entity: &MessageEntity) -> Option<String> {
    if entity.kind != EntityKind::Mention || entity.length < 2 {
        return None;
    }
    utf16_slice(text, entity.offset.checked_add(1)?, entity.end()?).map(str::to_string)
}

/// Usernames of all `mention` entities, in entity order.
pub fn mention_usernames(text: &str, entities: &[MessageEntity]) -> Vec<String> {
    entities
        .iter()
        .filter_map(|e| mention_username(text, e))
        .collect()
}

struct Mark {
    pos: usize,
    closing: bool,
    start: usize,
    len: usize,
    index: usize,
    tag: String,
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn html_tags(entity: &MessageEntity) -> Option<(String, String)> {
    let simple = |name: &str| Some((format!("<{}>", name), format!("</{}>", name)));
    match entity.kind {
        EntityKind::Bold => simple("b"),
        EntityKind::Italic => simple("i"),
        EntityKind::Underline => simple("u"),
        EntityKind::Strikethrough => simple("s"),
        EntityKind::Spoiler => simple("tg-spoiler"),
        EntityKind::Code => simple("code"),
        EntityKind::Blockquote => simple("blockquote"),
        EntityKind::ExpandableBlockquote => Some((
            "<blockquote expandable>".to_string(),
            "</blockquote>".to_string(),
        )),
        EntityKind::Pre => match &entity.language {
            Some(lang) => Some((
                format!("<pre><code class=\"language-{}\">", escape_attr(lang)),
                "</code></pre>".to_string(),
            )),
            None => simple("pre"),
        },
        EntityKind::TextLink => entity
            .url
            .as_ref()
            .map(|url| (format!("<a href=\"{}\">", escape_attr(url)), "</a>".to_string())),
        _ => None,
    }
}

/// Renders formatting entities (bold, italic, underline, strikethrough, spoiler, code, pre,
/// blockquote, text links) as Telegram HTML tags.
///
/// Tags are inserted right to left so earlier byte positions stay valid; text outside the
/// inserted tags is not touched (no escaping). Nested and identical spans close in reverse
/// order of opening. With no formatting entities the text is returned unchanged.
pub fn render_markup(text: &str, entities: &[MessageEntity]) -> String {
    let mut marks = Vec::new();
    for (index, entity) in entities.iter().enumerate() {
        if entity.length == 0 {
            continue;
        }
        let Some((open, close)) = html_tags(entity) else {
            continue;
        };
        let (Some(from), Some(to)) = (
            utf16_to_byte(text, entity.offset),
            entity.end().and_then(|end| utf16_to_byte(text, end)),
        ) else {
            continue;
        };
        marks.push(Mark {
            pos: from,
            closing: false,
            start: entity.offset,
            len: entity.length,
            index,
            tag: open,
        });
        marks.push(Mark {
            pos: to,
            closing: true,
            start: entity.offset,
            len: entity.length,
            index,
            tag: close,
        });
    }
    if marks.is_empty() {
        return text.to_string();
    }

    // Final left-to-right order: by position, closes before opens, inner closes first, outer opens first.
    marks.sort_by(|a, b| {
        a.pos
            .cmp(&b.pos)
            .then_with(|| b.closing.cmp(&a.closing))
            .then_with(|| {
                if a.closing {
                    b.start
                        .cmp(&a.start)
                        .then(a.len.cmp(&b.len))
                        .then(b.index.cmp(&a.index))
                } else {
                    b.len.cmp(&a.len).then(a.index.cmp(&b.index))
                }
            })
    });

    let mut out = text.to_string();
    for mark in marks.iter().rev() {
        out.insert_str(mark.pos, &mark.tag);
    }
    out
}
