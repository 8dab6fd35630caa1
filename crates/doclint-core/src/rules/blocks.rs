//! Rules over the extracted bash blocks.

use super::RuleContext;
use crate::extract::{expansions, is_comment, CodeBlock};
use crate::report::Violation;

/// Visit every line of every block with its document line number.
fn for_each_line<'a>(
    blocks: &[CodeBlock<'a>],
    mut visit: impl FnMut(&CodeBlock<'a>, usize, &'a str),
) {
    for block in blocks {
        for (offset, line) in block.lines().enumerate() {
            visit(block, block.doc_line(offset), line);
        }
    }
}

pub(super) fn inline_comment_spacing(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for_each_line(&ctx.blocks, |_, line_no, line| {
        if is_comment(line) {
            return;
        }
        if let Some((before, _)) = line.split_once('#') {
            if !before.ends_with(' ') {
                violations.push(
                    Violation::new(format!(
                        "Inline comment should be preceded by a space: '{}'",
                        line
                    ))
                    .at_line(line_no)
                    .with_excerpt(line),
                );
            }
        }
    });
    violations
}

/// Scans whole blocks, so an expansion may span lines.
pub(super) fn variable_expansions(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for block in &ctx.blocks {
        for expansion in expansions(block.text) {
            if expansion.content.trim().is_empty() {
                let offset = block.text[..expansion.start].matches('\n').count();
                violations.push(
                    Violation::new(format!(
                        "Variable expansion should contain content: '{}'",
                        expansion.raw
                    ))
                    .at_line(block.doc_line(offset))
                    .with_excerpt(expansion.raw),
                );
            }
        }
    }
    violations
}

pub(super) fn no_tabs(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for_each_line(&ctx.blocks, |block, line_no, line| {
        if line.contains('\t') {
            violations.push(
                Violation::new(format!(
                    "Tabs detected in bash block #{}; prefer spaces for portability",
                    block.index
                ))
                .at_line(line_no),
            );
        }
    });
    violations
}

pub(super) fn curl_protocol(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    for_each_line(&ctx.blocks, |_, line_no, line| {
        if line.contains("curl")
            && !is_comment(line)
            && !line.contains("http://")
            && !line.contains("https://")
        {
            violations.push(
                Violation::new(format!("Curl command missing protocol: '{}'", line))
                    .at_line(line_no)
                    .with_excerpt(line),
            );
        }
    });
    violations
}

pub(super) fn block_line_continuations(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    for block in &ctx.blocks {
        let lines: Vec<&str> = block.lines().collect();

        for (offset, line) in lines.iter().enumerate() {
            let trimmed = line.trim_end();
            if !trimmed.ends_with('\\') {
                continue;
            }
            let line_no = block.doc_line(offset);

            if trimmed.len() != line.len() {
                violations.push(
                    Violation::new(format!(
                        "Only backslash should terminate line continuation: '{}'",
                        line
                    ))
                    .at_line(line_no)
                    .with_excerpt(*line),
                );
            }

            match lines.get(offset + 1) {
                Some(next) if !next.trim().is_empty() => {}
                Some(_) => violations.push(
                    Violation::new("Continuation line should contain content")
                        .at_line(line_no + 1),
                ),
                None => violations.push(
                    Violation::new(format!(
                        "Bash block #{} ends with a dangling line continuation",
                        block.index
                    ))
                    .at_line(line_no)
                    .with_excerpt(*line),
                ),
            }
        }
    }

    violations
}

pub(super) fn long_lines_wrapped(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let max = ctx.profile.max_line_width;
    let mut violations = Vec::new();
    for_each_line(&ctx.blocks, |_, line_no, line| {
        let width = line.chars().count();
        if width > max && !is_comment(line) && !line.contains('\\') {
            violations.push(
                Violation::new(format!(
                    "Long command ({} > {} characters) should use line continuation",
                    width, max
                ))
                .at_line(line_no)
                .with_excerpt(line),
            );
        }
    });
    violations
}

pub(super) fn compose_file_flag(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let pinned = format!("-f {}", ctx.profile.compose_file);
    let mut violations = Vec::new();
    for_each_line(&ctx.blocks, |_, line_no, line| {
        if line.contains("docker-compose") && !is_comment(line) && !line.contains(&pinned) {
            violations.push(
                Violation::new(format!(
                    "docker-compose invocation should pin compose file path '{}': '{}'",
                    ctx.profile.compose_file, line
                ))
                .at_line(line_no)
                .with_excerpt(line),
            );
        }
    });
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::profile::CheckProfile;

    fn run(block: &str, rule: fn(&RuleContext<'_>) -> Vec<Violation>) -> Vec<Violation> {
        let doc = Document::from_text(format!("# Guide\n```bash\n{}\n```\n", block));
        let profile = CheckProfile::dsp();
        let ctx = RuleContext::new(&doc, &profile);
        rule(&ctx)
    }

    #[test]
    fn test_inline_comment_spacing() {
        assert!(run("docker ps  # list containers\n# full-line comment", inline_comment_spacing)
            .is_empty());

        let violations = run("docker ps# list", inline_comment_spacing);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, Some(3));
    }

    #[test]
    fn test_blank_expansion_flagged() {
        assert!(run("echo $(docker ps -q) ${OPENAI_API_KEY:0:8}", variable_expansions).is_empty());

        let violations = run("echo ${ }", variable_expansions);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].excerpt.as_deref(), Some("${ }"));
    }

    #[test]
    fn test_blank_expansion_across_lines() {
        let violations = run("docker ps
echo $(
)", variable_expansions);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].excerpt.as_deref(), Some("$(\n)"));
        assert_eq!(violations[0].line, Some(4));

        assert!(run("echo $(
  docker ps -q
)", variable_expansions).is_empty());
    }

    #[test]
    fn test_tabs_flagged() {
        assert!(run("docker ps", no_tabs).is_empty());

        let violations = run("docker ps\n\tdocker logs dsp-qdrant", no_tabs);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line, Some(4));
    }

    #[test]
    fn test_curl_needs_scheme() {
        assert!(run(
            "curl http://localhost:3002/health\n# curl localhost:3002\ncurl -s https://api.openai.com/v1/models",
            curl_protocol
        )
        .is_empty());

        let violations = run("curl localhost:6333/collections", curl_protocol);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("missing protocol"));
    }

    #[test]
    fn test_continuation_trailing_whitespace() {
        assert!(run(
            "docker run -d \\\n  --name dsp-qdrant \\\n  qdrant/qdrant",
            block_line_continuations
        )
        .is_empty());

        let violations = run("docker run -d \\  \n  qdrant/qdrant", block_line_continuations);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("Only backslash"));
    }

    #[test]
    fn test_continuation_needs_following_content() {
        let violations = run("docker run -d \\\n\nqdrant/qdrant", block_line_continuations);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("should contain content"));
        assert_eq!(violations[0].line, Some(4));

        let dangling = run("docker run -d \\", block_line_continuations);
        assert_eq!(dangling.len(), 1);
        assert!(dangling[0].reason.contains("dangling"));
    }

    #[test]
    fn test_long_line_without_continuation() {
        let long = format!("curl http://localhost:3002/search?query={}", "a".repeat(120));
        let violations = run(&long, long_lines_wrapped);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("line continuation"));

        let wrapped = format!("{} \\\n  -H 'Accept: application/json'", long);
        assert!(run(&wrapped, long_lines_wrapped).is_empty());

        let comment = format!("# {}", "a".repeat(130));
        assert!(run(&comment, long_lines_wrapped).is_empty());
    }

    #[test]
    fn test_compose_file_flag() {
        assert!(run(
            "docker-compose -f docker/docker-compose.yml restart  # restart stack\n# docker-compose up",
            compose_file_flag
        )
        .is_empty());

        let violations = run("docker-compose up -d", compose_file_flag);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].reason.contains("docker/docker-compose.yml"));
    }
}
