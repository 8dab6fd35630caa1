//! Rules over the whole document text.

use super::{require_all, RuleContext};
use crate::document::line_at;
use crate::extract::{compose_paths, continuation_spans, localhost_urls, BASH_FENCE, FENCE};
use crate::report::Violation;
use std::collections::BTreeSet;

pub(super) fn code_blocks_present(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();
    let min = ctx.profile.min_code_blocks;

    if ctx.blocks.is_empty() {
        violations.push(Violation::new(
            "Expected troubleshooting guide to include bash code blocks",
        ));
    } else if ctx.blocks.len() < min {
        violations.push(Violation::new(format!(
            "Expected at least {} bash code blocks for comprehensive coverage, found {}",
            min,
            ctx.blocks.len()
        )));
    }

    for block in ctx.blocks.iter().filter(|b| b.text.is_empty()) {
        violations.push(
            Violation::new(format!("Bash code block #{} is empty", block.index)).at_line(block.line),
        );
    }

    violations
}

pub(super) fn required_sections(ctx: &RuleContext<'_>) -> Vec<Violation> {
    require_all(ctx.text(), &ctx.profile.required_sections, |section| {
        format!("Section '{}' should be documented", section)
    })
}

pub(super) fn service_ports(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let text = ctx.text();
    let mut violations = Vec::new();

    for sp in &ctx.profile.service_ports {
        let port_ref = format!(":{}", sp.port);
        if !text.contains(&port_ref) {
            violations.push(
                Violation::new(format!(
                    "Port {} for {} should be referenced",
                    sp.port, sp.service
                ))
                .with_excerpt(port_ref),
            );
        }

        let comment = format!("# {}", sp.service);
        if !text.contains(&comment) {
            violations.push(
                Violation::new(format!(
                    "Port {} comment should include '{}'",
                    sp.port, comment
                ))
                .with_excerpt(comment),
            );
        }
    }

    violations
}

pub(super) fn containers(ctx: &RuleContext<'_>) -> Vec<Violation> {
    require_all(ctx.text(), &ctx.profile.containers, |name| {
        format!("Expected references to container '{}'", name)
    })
}

pub(super) fn script_paths(ctx: &RuleContext<'_>) -> Vec<Violation> {
    require_all(ctx.text(), &ctx.profile.script_paths, |path| {
        format!("Expected script path '{}' in documentation", path)
    })
}

/// A missing endpoint names the documented URL on the same origin, if any.
pub(super) fn health_endpoints(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let text = ctx.text();
    let mut violations = Vec::new();

    for endpoint in &ctx.profile.health_endpoints {
        if text.contains(endpoint.as_str()) {
            continue;
        }
        let origin = url_origin(endpoint);
        let near_miss = localhost_urls(text).find(|url| url_origin(url) == origin);

        let mut violation = match near_miss {
            Some(url) => Violation::new(format!(
                "Expected health endpoint '{}' to be documented, found '{}'",
                endpoint, url
            )),
            None => Violation::new(format!(
                "Expected health endpoint '{}' to be documented",
                endpoint
            )),
        };
        if let Some(index) = near_miss.and_then(|url| text.find(url)) {
            violation = violation.at_line(line_at(text, index));
        }
        violations.push(violation.with_excerpt(endpoint.clone()));
    }

    violations
}

/// `scheme://host:port` part of a URL.
fn url_origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(i) => &url[..after_scheme + i],
        None => url,
    }
}

pub(super) fn environment_variables(ctx: &RuleContext<'_>) -> Vec<Violation> {
    require_all(ctx.text(), &ctx.profile.environment_variables, |key| {
        format!("Environment variable '{}' should be referenced", key)
    })
}

/// Only the first occurrence of each command is inspected.
pub(super) fn dangerous_command_warnings(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let text = ctx.text();
    // ASCII-only uppercasing keeps byte offsets aligned with `text`.
    let upper = text.to_ascii_uppercase();
    let radius = ctx.profile.caution_window;
    let mut violations = Vec::new();

    for command in &ctx.profile.dangerous_commands {
        let Some(index) = text.find(command.as_str()) else {
            continue;
        };
        let window = char_window(&upper, index, radius, radius);
        let cautioned = ctx
            .profile
            .caution_markers
            .iter()
            .any(|marker| window.contains(marker.to_ascii_uppercase().as_str()));

        if !cautioned {
            violations.push(
                Violation::new(format!(
                    "Dangerous command '{}' should include nearby cautionary text",
                    command
                ))
                .at_line(line_at(text, index))
                .with_excerpt(command.clone()),
            );
        }
    }

    violations
}

pub(super) fn problem_sections_complete(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let profile = ctx.profile;
    let mut violations = Vec::new();

    for section in ctx.document.problem_sections(&profile.problem_marker) {
        if !section.body.contains(profile.diagnosis_marker.as_str()) {
            violations.push(
                Violation::new(format!(
                    "Problem '{}' should detail diagnosis steps ('{}')",
                    section.title, profile.diagnosis_marker
                ))
                .at_line(section.line),
            );
        }
        if !section.body.contains(profile.solutions_marker.as_str()) {
            violations.push(
                Violation::new(format!(
                    "Problem '{}' should list solutions ('{}')",
                    section.title, profile.solutions_marker
                ))
                .at_line(section.line),
            );
        }
    }

    violations
}

/// A backslash that joins lines must be the last character on its line.
///
/// Whitespace after the backslash counts as trailing text: the shell reads
/// `\ ` as an escaped space and the continuation is lost.
pub(super) fn document_line_continuations(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let text = ctx.text();
    let mut violations = Vec::new();

    for (start, span) in continuation_spans(text) {
        let first_line = line_at(text, start);
        let lines: Vec<&str> = span.split('\n').collect();

        for (offset, line) in lines[..lines.len() - 1].iter().enumerate() {
            let Some(pos) = line.rfind('\\') else {
                continue;
            };
            let trailing = line[pos + 1..].trim_end_matches('\r');
            if !trailing.is_empty() {
                violations.push(
                    Violation::new(format!(
                        "No characters should follow backslash in: '{}'",
                        line
                    ))
                    .at_line(first_line + offset)
                    .with_excerpt(*line),
                );
            }
        }
    }

    violations
}

pub(super) fn fences_balanced(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let text = ctx.text();
    let open = text.matches(BASH_FENCE).count();
    let total = text.matches(FENCE).count();
    let mut violations = Vec::new();

    if open != ctx.blocks.len() {
        violations.push(Violation::new(format!(
            "Found {} '{}' fences but extracted {} bash blocks",
            open,
            BASH_FENCE,
            ctx.blocks.len()
        )));
    }
    if total != open * 2 {
        violations.push(Violation::new(format!(
            "Code fences should be balanced: {} fence markers for {} bash blocks (expected {})",
            total,
            open,
            open * 2
        )));
    }

    violations
}

pub(super) fn compose_paths_consistent(ctx: &RuleContext<'_>) -> Vec<Violation> {
    let distinct: BTreeSet<&str> = compose_paths(ctx.text()).collect();
    let mut violations = Vec::new();

    if distinct.len() > 1 {
        violations.push(Violation::new(format!(
            "docker-compose calls should reuse a single compose file path, found: {}",
            distinct.iter().copied().collect::<Vec<_>>().join(", ")
        )));
    }
    for path in distinct
        .iter()
        .filter(|p| !p.starts_with(ctx.profile.compose_root.as_str()))
    {
        violations.push(
            Violation::new(format!(
                "docker-compose path '{}' should be rooted in '{}'",
                path, ctx.profile.compose_root
            ))
            .with_excerpt(*path),
        );
    }

    violations
}

pub(super) fn known_typos(ctx: &RuleContext<'_>) -> Vec<Violation> {
    forbid_all(ctx.text(), &ctx.profile.known_typos, |typo| {
        format!("Typo '{}' detected", typo)
    })
}

pub(super) fn placeholder_text(ctx: &RuleContext<'_>) -> Vec<Violation> {
    forbid_all(ctx.text(), &ctx.profile.placeholder_markers, |marker| {
        format!("Placeholder '{}' should not appear in shipped docs", marker)
    })
}

fn forbid_all(
    text: &str,
    forbidden: &[String],
    describe: impl Fn(&str) -> String,
) -> Vec<Violation> {
    forbidden
        .iter()
        .filter_map(|item| {
            let index = text.find(item.as_str())?;
            Some(
                Violation::new(describe(item.as_str()))
                    .at_line(line_at(text, index))
                    .with_excerpt(item.clone()),
            )
        })
        .collect()
}

/// Up to `before` characters ahead of `index` and `after` characters from it.
fn char_window(text: &str, index: usize, before: usize, after: usize) -> &str {
    let start = text[..index]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(index);
    let end = text[index..]
        .char_indices()
        .nth(after)
        .map(|(i, _)| index + i)
        .unwrap_or(text.len());
    &text[start..end]
}
