//! Lexical cleanup: strips comments, infers colons on bare labels,
//! compacts `.DB`/`.DW` operand lists so quoted spaces survive the later
//! single-space tokenizer, and flattens the source into one ordered token
//! stream.

use crate::reserved::is_reserved;

/// A token plus the one-indexed source line it came from, kept through
/// assembly so diagnostics and the source map can point back at it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub line: u32,
}

fn collapse_spaces(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last_was_space = false;
    for ch in line.chars() {
        let is_space = ch == ' ' || ch == '\t';
        if is_space {
            if !last_was_space {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
        last_was_space = is_space;
    }
    out
}

fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Infers a trailing `:` on a bare label token: a token alone on its
/// line, or one that precedes a reserved word on the same line and is
/// not itself reserved.
fn infer_label_colon(line: &str) -> String {
    let tokens: Vec<&str> = line.split(' ').filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return String::new();
    }

    let first = tokens[0];
    let already_marked = first.ends_with(':');
    let alone = tokens.len() == 1;
    let precedes_reserved = tokens.len() >= 2 && is_reserved(tokens[1]);

    if !already_marked && !is_reserved(first) && (alone || precedes_reserved) {
        let mut rebuilt = String::new();
        rebuilt.push_str(first);
        rebuilt.push(':');
        for tok in &tokens[1..] {
            rebuilt.push(' ');
            rebuilt.push_str(tok);
        }
        rebuilt
    } else {
        tokens.join(" ")
    }
}

fn is_data_directive(line: &str) -> bool {
    let first = line.split(' ').next().unwrap_or("");
    let upper = first.to_uppercase();
    upper == ".DB" || upper == ".DW"
}

/// Compacts a `.DB`/`.DW` operand list: spaces outside quoted string
/// literals are removed; spaces inside a string are replaced
/// with `",32,"` so a later space-delimited split can't split a string in
/// two.
fn compact_data_directive(line: &str) -> String {
    let directive_end = line.find(' ').unwrap_or(line.len());
    let (directive, rest) = line.split_at(directive_end);

    let mut out = String::new();
    let mut in_quote: Option<char> = None;
    for ch in rest.chars() {
        match in_quote {
            Some(q) if ch == q => {
                in_quote = None;
                out.push(ch);
            }
            Some(_) if ch == ' ' => out.push_str(",32,"),
            Some(_) => out.push(ch),
            None if ch == '\'' || ch == '"' => {
                in_quote = Some(ch);
                out.push(ch);
            }
            None if ch == ' ' => {}
            None => out.push(ch),
        }
    }

    if rest.trim().is_empty() {
        directive.to_string()
    } else {
        format!("{} {}", directive, out)
    }
}

/// Runs the full lexical-cleanup pipeline and returns the final flat token
/// stream.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lines: Vec<(u32, String)> = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let stripped = strip_comment(raw_line);
        let collapsed = collapse_spaces(stripped);
        let trimmed = collapsed.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        lines.push((line_no, trimmed));
    }

    for entry in lines.iter_mut() {
        entry.1 = infer_label_colon(&entry.1);
    }

    for entry in lines.iter_mut() {
        if is_data_directive(&entry.1) {
            entry.1 = compact_data_directive(&entry.1);
        }
    }

    let mut tokens = Vec::new();
    for (line_no, line) in lines {
        for piece in line.split(' ') {
            if !piece.is_empty() {
                tokens.push(Token {
                    text: piece.to_string(),
                    line: line_no,
                });
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_collapses_whitespace() {
        let toks = tokenize("LDA   #$05   ; load it\nSTA $10\n");
        let text: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(text, vec!["LDA", "#$05", "STA", "$10"]);
    }

    #[test]
    fn infers_colon_on_bare_loop_label() {
        let toks = tokenize("LOOP\nINX\nCPX #$05\nBNE LOOP\n");
        assert_eq!(toks[0].text, "LOOP:");
    }

    #[test]
    fn infers_colon_on_label_before_mnemonic() {
        let toks = tokenize("START: LDA #$41\n");
        assert_eq!(toks[0].text, "START:");

        let toks2 = tokenize("START LDA #$41\n");
        assert_eq!(toks2[0].text, "START:");
    }

    #[test]
    fn compacts_quoted_strings_in_data_directives() {
        let toks = tokenize(".DB \"HI THERE\", 10\n");
        let text: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(text, vec![".DB", "\"HI,32,THERE\",10"]);
    }
}
