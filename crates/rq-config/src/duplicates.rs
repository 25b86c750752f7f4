//! Duplicate name detection on the raw configuration text
//!
//! A YAML mapping cannot hold the same key twice, so duplicate entity and
//! command names have to be found before the text is parsed into a tree.
//! The scan is line based and indentation aware:
//!
//! - a line without leading whitespace that contains a colon names an entity
//! - a `Simple Commands:` line opens a command scope at its indentation
//! - inside that scope, lines indented exactly two columns deeper than the
//!   header name a command
//! - a line indented at or below the header closes the scope
//!
//! Blank lines and comments are ignored. Tabs in the indentation advance to
//! the next multiple of eight columns.

use indexmap::IndexMap;
use std::fmt;

use rq_core::SIMPLE_COMMANDS;

/// Width of a tab stop when measuring indentation
const TAB_WIDTH: usize = 8;

/// Extra indentation of a command name below its section header
const COMMAND_INDENT: usize = 2;

/// A name that occurs more than once, with the lines it occurs on (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    pub name: String,
    pub lines: Vec<usize>,
}

impl fmt::Display for DuplicateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.lines.iter().map(|l| l.to_string()).collect();
        write!(f, "'{}' (lines {})", self.name, lines.join(", "))
    }
}

/// Duplicate entity names and per-entity duplicate command names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Entity names that appear more than once at the top level
    pub entities: Vec<DuplicateName>,
    /// Entity name → command names that appear more than once in its Simple Commands
    pub commands: IndexMap<String, Vec<DuplicateName>>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.commands.is_empty()
    }

    /// Number of duplicated names (entities plus commands)
    pub fn len(&self) -> usize {
        self.entities.len() + self.commands.values().map(Vec::len).sum::<usize>()
    }

    /// Names of the duplicated entities
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|d| d.name.as_str()).collect()
    }

    /// Names of the duplicated commands of an entity
    pub fn command_names(&self, entity: &str) -> Vec<&str> {
        self.commands
            .get(entity)
            .map(|dups| dups.iter().map(|d| d.name.as_str()).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for DuplicateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for dup in &self.entities {
            parts.push(format!("duplicate entity {}", dup));
        }
        for (entity, dups) in &self.commands {
            for dup in dups {
                parts.push(format!("duplicate command {} in entity '{}'", dup, entity));
            }
        }
        f.write_str(&parts.join("; "))
    }
}

/// Scan raw configuration text for duplicate entity and command names
pub fn find_duplicates(text: &str) -> DuplicateReport {
    let mut entity_lines: IndexMap<String, Vec<usize>> = IndexMap::new();
    let mut commands: IndexMap<String, Vec<DuplicateName>> = IndexMap::new();

    let mut scan = EntityScan::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let content = strip_comment(raw_line);
        if content.trim().is_empty() {
            continue;
        }
        let indent = indentation(content);
        let body = content.trim();

        if indent == 0 {
            scan.finish(&mut commands);
            if body.contains(':') {
                let name = key_name(body);
                entity_lines.entry(name.clone()).or_default().push(line_no);
                scan.entity = Some(name);
            }
            continue;
        }

        if let Some(header) = scan.scope {
            if indent <= header {
                scan.scope = None;
            } else if indent == header + COMMAND_INDENT && body.contains(':') {
                let name = key_name(body);
                scan.commands.entry(name).or_default().push(line_no);
                continue;
            } else {
                continue;
            }
        }

        if scan.entity.is_some() && is_commands_header(body) {
            scan.scope = Some(indent);
        }
    }
    scan.finish(&mut commands);

    let entities = entity_lines
        .into_iter()
        .filter(|(_, lines)| lines.len() > 1)
        .map(|(name, lines)| DuplicateName { name, lines })
        .collect();

    DuplicateReport { entities, commands }
}

/// Scan state for the entity block currently being read
#[derive(Default)]
struct EntityScan {
    entity: Option<String>,
    /// Indentation of the open `Simple Commands:` header
    scope: Option<usize>,
    commands: IndexMap<String, Vec<usize>>,
}

impl EntityScan {
    /// Close the current entity block and record its duplicate commands
    fn finish(&mut self, report: &mut IndexMap<String, Vec<DuplicateName>>) {
        let commands = std::mem::take(&mut self.commands);
        self.scope = None;
        let Some(entity) = self.entity.take() else {
            return;
        };

        let dups = report.entry(entity.clone()).or_default();
        for (name, lines) in commands {
            if lines.len() < 2 {
                continue;
            }
            match dups.iter_mut().find(|d| d.name == name) {
                Some(existing) => existing.lines.extend(lines),
                None => dups.push(DuplicateName { name, lines }),
            }
        }
        if dups.is_empty() {
            report.shift_remove(&entity);
        }
    }
}

fn is_commands_header(body: &str) -> bool {
    body.strip_suffix(':')
        .map(|key| strip_quotes(key.trim()).eq_ignore_ascii_case(SIMPLE_COMMANDS))
        .unwrap_or(false)
}

/// Cut a trailing `# comment`, ignoring `#` inside quotes or inside a word
///
/// Quoted scalars end the way YAML ends them: `\"` does not close a double
/// quoted scalar and `''` does not close a single quoted one. A quote inside
/// a plain word such as `don't` opens nothing.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_is_space = true;
    let mut token_start = true;
    let mut chars = line.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') if c == '\\' => {
                chars.next();
            }
            Some('\'') if c == '\'' && matches!(chars.peek(), Some((_, '\''))) => {
                chars.next();
            }
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if (c == '"' || c == '\'') && token_start => quote = Some(c),
            None if c == '#' && prev_is_space => return &line[..i],
            None => {}
        }
        prev_is_space = c.is_whitespace();
        token_start = prev_is_space || matches!(c, '[' | '{' | ',' | ':');
    }
    line
}

/// Width of the leading whitespace in columns
fn indentation(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH - width % TAB_WIDTH,
            _ => break,
        }
    }
    width
}

/// Key of a `key: value` line, unquoted and unescaped like the YAML parser does
fn key_name(body: &str) -> String {
    let quoted = match body.chars().next() {
        Some('"') => double_quoted(&body[1..]),
        Some('\'') => single_quoted(&body[1..]),
        _ => None,
    };
    if let Some(key) = quoted {
        return key;
    }
    let key = body.split(':').next().unwrap_or(body).trim();
    strip_quotes(key).to_string()
}

/// Content of a double quoted scalar up to its closing quote, escapes resolved
fn double_quoted(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = rest.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => return Some(out),
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    '0' => out.push('\0'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    't' | '\t' => out.push('\t'),
                    'n' => out.push('\n'),
                    'v' => out.push('\u{0B}'),
                    'f' => out.push('\u{0C}'),
                    'r' => out.push('\r'),
                    'e' => out.push('\u{1B}'),
                    ' ' => out.push(' '),
                    'N' => out.push('\u{85}'),
                    '_' => out.push('\u{A0}'),
                    'L' => out.push('\u{2028}'),
                    'P' => out.push('\u{2029}'),
                    'x' => out.push(hex_char(&mut chars, 2)?),
                    'u' => out.push(hex_char(&mut chars, 4)?),
                    'U' => out.push(hex_char(&mut chars, 8)?),
                    other => out.push(other),
                }
            }
            other => out.push(other),
        }
    }
    None
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}

/// Content of a single quoted scalar up to its closing quote, `''` read as `'`
fn single_quoted(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
            } else {
                return Some(out);
            }
        } else {
            out.push(c);
        }
    }
    None
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicates() {
        let text = r#"
Light:
  Simple Commands:
    "on cmd":
      type: get
      parameter: "http://x/on"
    off:
      type: get
      parameter: "http://x/off"
TV:
  Features:
    On:
      type: wol
      parameter: "AA:BB:CC:DD:EE:FF"
"#;
        assert!(find_duplicates(text).is_empty());
    }

    #[test]
    fn test_duplicate_entity() {
        let text = "Light:\n  Features: {}\nTV:\n  Features: {}\nLight:\n  Features: {}\n";
        let report = find_duplicates(text);
        assert_eq!(report.entity_names(), vec!["Light"]);
        assert_eq!(report.entities[0].lines, vec![1, 5]);
        assert!(report.commands.is_empty());
    }

    #[test]
    fn test_duplicate_entity_ignores_comments_and_blank_lines() {
        let text = "# Light:\n\nLight:\n  Features: {}\n\n# another\nLight: # again\n";
        let report = find_duplicates(text);
        assert_eq!(report.entity_names(), vec!["Light"]);
        assert_eq!(report.entities[0].lines, vec![3, 7]);
    }

    #[test]
    fn test_duplicate_command() {
        let text = r#"Light:
  Simple Commands:
    dim:
      type: get
      parameter: "http://x/dim"
    'dim':
      type: post
      parameter: "http://x/dim2"
    bright:
      type: get
      parameter: "http://x/bright"
"#;
        let report = find_duplicates(text);
        assert!(report.entities.is_empty());
        assert_eq!(report.command_names("Light"), vec!["dim"]);
        assert_eq!(report.commands["Light"][0].lines, vec![3, 6]);
    }

    #[test]
    fn test_same_command_in_different_entities_is_fine() {
        let text = r#"Light:
  Simple Commands:
    dim:
      type: get
TV:
  Simple Commands:
    dim:
      type: get
"#;
        assert!(find_duplicates(text).is_empty());
    }

    #[test]
    fn test_scope_closes_at_header_indentation() {
        // "dim" under Features sits at the same depth as the simple commands
        // but after the scope has been closed
        let text = r#"Light:
  Simple Commands:
    dim:
      type: get
  Features:
    dim:
      type: get
"#;
        assert!(find_duplicates(text).is_empty());
    }

    #[test]
    fn test_deeper_keys_are_not_commands() {
        let text = r#"Light:
  Simple Commands:
    dim:
      type: get
      parameter: a
    bright:
      type: get
      parameter: b
"#;
        assert!(find_duplicates(text).is_empty());
    }

    #[test]
    fn test_quoted_name_with_colon() {
        let text = "Light:\n  Simple Commands:\n    \"a:b\":\n      type: get\n    \"a:b\":\n      type: get\n";
        let report = find_duplicates(text);
        assert_eq!(report.command_names("Light"), vec!["a:b"]);
    }

    #[test]
    fn test_escaped_double_quotes_in_names() {
        let text = r#"TV:
  Simple Commands:
    "say \"hi\"":
      type: get
      parameter: "http://tv/hi"
    "say \"bye\"":
      type: get
      parameter: "http://tv/bye"
"#;
        assert!(find_duplicates(text).is_empty());

        let tree: serde_yaml::Value = serde_yaml::from_str(text).unwrap();
        assert!(tree["TV"]["Simple Commands"].get("say \"hi\"").is_some());

        let text = "TV:\n  Simple Commands:\n    \"say \\\"hi\\\"\":\n      type: get\n    \"say \\\"hi\\\"\":\n      type: get\n";
        assert_eq!(find_duplicates(text).command_names("TV"), vec!["say \"hi\""]);
    }

    #[test]
    fn test_escaped_single_quotes_in_names() {
        let text = "TV:\n  Simple Commands:\n    'it''s on':\n      type: get\n    'it''s off':\n      type: get\n";
        assert!(find_duplicates(text).is_empty());

        let text = "TV:\n  Simple Commands:\n    'it''s on':\n      type: get\n    \"it's on\":\n      type: get\n";
        let report = find_duplicates(text);
        assert_eq!(report.command_names("TV"), vec!["it's on"]);
        assert_eq!(report.commands["TV"][0].lines, vec![3, 5]);
    }

    #[test]
    fn test_escaped_quote_does_not_start_a_comment() {
        assert_eq!(strip_comment(r#""a \" # b": x # c"#), r#""a \" # b": x "#);
        assert_eq!(strip_comment("'a'' # b': x # c"), "'a'' # b': x ");

        let text = "TV:\n  Simple Commands:\n    \"a \\\" # b\":\n      type: get\n    \"a \\\" # b\":\n      type: get\n";
        assert_eq!(find_duplicates(text).command_names("TV"), vec!["a \" # b"]);
    }

    #[test]
    fn test_quoted_scalar_escapes() {
        assert_eq!(key_name(r#""tab\there": x"#), "tab\there");
        assert_eq!(key_name(r#""\u00e9t\u00e9": x"#), "\u{e9}t\u{e9}");
        assert_eq!(key_name(r#""back\\slash": x"#), "back\\slash");
    }

    #[test]
    fn test_hash_inside_value_is_not_a_comment() {
        assert_eq!(strip_comment("parameter: http://x/#top"), "parameter: http://x/#top");
        assert_eq!(strip_comment("parameter: \"a # b\" # c"), "parameter: \"a # b\" ");
        assert_eq!(strip_comment("don't: [\"x # y\"] # z"), "don't: [\"x # y\"] ");
    }

    #[test]
    fn test_indentation_with_tabs() {
        assert_eq!(indentation("    x"), 4);
        assert_eq!(indentation("\tx"), 8);
        assert_eq!(indentation("  \tx"), 8);
    }

    #[test]
    fn test_report_display_lists_every_name() {
        let text = "A:\n  Simple Commands:\n    x:\n    x:\nA:\n";
        let report = find_duplicates(text);
        let message = report.to_string();
        assert!(message.contains("duplicate entity 'A'"));
        assert!(message.contains("duplicate command 'x'"));
        assert_eq!(report.len(), 2);
    }
}
