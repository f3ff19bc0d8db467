use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, fail, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{Branch, RuleNode};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Keys -------------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
        }),
    )
        .take()
        .parse_next(input)
}

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = cut_err(any).parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = cut_err(any).parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn key(input: &mut &str) -> ModalResult<String> {
    alt((string_literal, ident.map(str::to_owned)))
        .context(StrContext::Expected(StrContextValue::Description("key")))
        .parse_next(input)
}

// -- Branches ---------------------------------------------------------------

/// Deepest nesting accepted, counting the top level.
pub(crate) const MAX_DEPTH: usize = 128;

fn terminal(input: &mut &str) -> ModalResult<Branch> {
    preceded(("=>", ws), cut_err(key))
        .map(Branch::Terminal)
        .parse_next(input)
}

fn nested(input: &mut &str, depth: usize) -> ModalResult<Branch> {
    '{'.parse_next(input)?;
    if depth >= MAX_DEPTH {
        return cut_err(fail.context(StrContext::Expected(StrContextValue::Description(
            "at most 128 levels of nesting",
        ))))
        .parse_next(input);
    }
    let node = cut_err(|i: &mut &str| block(i, depth + 1)).parse_next(input)?;
    (ws, cut_err('}')).parse_next(input)?;
    Ok(Branch::Nested(node))
}

fn branch(input: &mut &str, depth: usize) -> ModalResult<Branch> {
    ws.parse_next(input)?;
    alt((terminal, |i: &mut &str| nested(i, depth)))
        .context(StrContext::Expected(StrContextValue::StringLiteral("=>")))
        .context(StrContext::Expected(StrContextValue::CharLiteral('{')))
        .parse_next(input)
}

// -- Entries & blocks -------------------------------------------------------

fn entry(input: &mut &str, depth: usize) -> ModalResult<(String, Branch)> {
    ws.parse_next(input)?;
    let k = key.parse_next(input)?;
    let b = cut_err(|i: &mut &str| branch(i, depth)).parse_next(input)?;
    opt((ws, ',')).parse_next(input)?;
    Ok((k, b))
}

fn block(input: &mut &str, depth: usize) -> ModalResult<RuleNode> {
    let entries: Vec<(String, Branch)> =
        repeat(0.., |i: &mut &str| entry(i, depth)).parse_next(input)?;
    let mut node = RuleNode::new();
    for (k, b) in entries {
        node.push(&k, b);
    }
    Ok(node)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_tree(input: &mut &str) -> ModalResult<RuleNode> {
    let node = block(input, 1)?;
    ws.parse_next(input)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::MAX_DEPTH;
    use crate::parse::parse;
    use crate::{Branch, RuleNode};

    fn nested_chain(levels: usize) -> String {
        let mut dsl = "a { ".repeat(levels - 1);
        dsl.push_str("a => t");
        dsl.push_str(&" }".repeat(levels - 1));
        dsl
    }

    #[test]
    fn parse_flat_entries() {
        let node = parse("is_admin => admin_access\ndefault => guest_access").unwrap();
        assert_eq!(
            node,
            RuleNode::new()
                .when("is_admin", "admin_access")
                .otherwise("guest_access")
        );
    }

    #[test]
    fn parse_nested_block() {
        let input = r"
is_human {
    is_kind  => help_me_find_my_book
    is_smart => please_do_my_homework
}
default => please_do_my_homework
";
        let node = parse(input).unwrap();
        let expected = RuleNode::new()
            .nested("is_human", |n| {
                n.when("is_kind", "help_me_find_my_book")
                    .when("is_smart", "please_do_my_homework")
            })
            .otherwise("please_do_my_homework");
        assert_eq!(node, expected);
    }

    #[test]
    fn parse_deeply_nested() {
        let node = parse("default { default { default => done } }").unwrap();
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn parse_commas_and_single_line() {
        let node = parse("a => x, b { c => y, d => z }, default => w").unwrap();
        let keys: Vec<&str> = node.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b", "default"]);
    }

    #[test]
    fn parse_comments_ignored() {
        let node = parse("# header\na => x # trailing\n# between\ndefault => y").unwrap();
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn parse_quoted_keys() {
        let node = parse(r#""has space" => "also \"quoted\"""#).unwrap();
        let (key, branch) = node.entries().next().unwrap();
        assert_eq!(key, "has space");
        assert_eq!(branch, &Branch::Terminal("also \"quoted\"".into()));
    }

    #[test]
    fn parse_keys_with_dots_and_dashes() {
        let node = parse("user.is-admin => grant.full-access").unwrap();
        let (key, branch) = node.entries().next().unwrap();
        assert_eq!(key, "user.is-admin");
        assert_eq!(branch, &Branch::Terminal("grant.full-access".into()));
    }

    #[test]
    fn parse_keeps_duplicates_for_compile_to_reject() {
        let node = parse("a => x\na => y").unwrap();
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse("  # nothing here\n").unwrap().is_empty());
    }

    #[test]
    fn parse_missing_arrow_fails() {
        assert!(parse("a x").is_err());
    }

    #[test]
    fn parse_unclosed_block_fails() {
        let err = parse("a { b => c").unwrap_err();
        assert!(err.offset().is_some());
    }

    #[test]
    fn parse_missing_terminal_fails() {
        assert!(parse("a =>").is_err());
    }

    #[test]
    fn parse_stray_brace_fails() {
        assert!(parse("a => b }").is_err());
    }

    #[test]
    fn parse_unterminated_string_fails() {
        assert!(parse(r#""open => x"#).is_err());
    }

    #[test]
    fn parse_accepts_maximum_depth() {
        let node = parse(&nested_chain(MAX_DEPTH)).unwrap();
        assert_eq!(node.depth(), MAX_DEPTH);
    }

    #[test]
    fn parse_rejects_nesting_past_maximum_depth() {
        let err = parse(&nested_chain(MAX_DEPTH + 1)).unwrap_err();
        assert!(err.offset().is_some());
        assert!(err.to_string().contains("at most 128 levels of nesting"));
    }

    #[test]
    fn parse_very_deep_input_fails_without_overflowing() {
        // far beyond the limit, on a small stack
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| parse(&nested_chain(50_000)).is_err())
            .unwrap();
        assert!(handle.join().unwrap());
    }
}
