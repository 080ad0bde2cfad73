use std::fmt::Display;

use anyhow::bail;
use colored::{Color, Colorize};
use stagekit_diff::{
    apply_changeset, apply_sectioned_changeset, diff_linear_with, sectioned_staged_changeset,
    staged_changeset_with, ApplyResult, DiffConfig, LinearDiff,
};
use stagekit_types::{Changeset, StagedChangeset};
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;
use crate::document::{self, label, Record, SectionRecord};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(config.format);
    let output = match cli.command {
        Command::Diff(args) => cmd_diff(args, &config, format)?,
        Command::Verify(args) => cmd_verify(args, &config, format)?,
    };
    print!("{output}");
    Ok(())
}

fn cmd_diff(args: DiffArgs, config: &CliConfig, format: OutputFormat) -> anyhow::Result<String> {
    if args.sectioned || config.sectioned {
        if args.section.is_some() {
            bail!("--section only applies to flat documents");
        }
        if args.raw {
            bail!("--raw only applies to flat documents");
        }
        let source: Vec<SectionRecord> = document::load(&args.source)?;
        let target: Vec<SectionRecord> = document::load(&args.target)?;
        let staged = sectioned_staged_changeset(&source, &target);
        return render(&staged, format, summarize_section);
    }

    let diff_config = DiffConfig {
        section: args.section.unwrap_or(config.diff.section),
        ..config.diff.clone()
    };
    let source: Vec<Record> = document::load(&args.source)?;
    let target: Vec<Record> = document::load(&args.target)?;
    debug!(
        source = source.len(),
        target = target.len(),
        section = diff_config.section,
        "loaded flat documents"
    );

    if args.raw {
        let diff = diff_linear_with(&source, &target, &diff_config);
        return render_raw(&diff, format);
    }

    let staged = staged_changeset_with(&source, &target, &diff_config);
    render(&staged, format, |record: &Record| label(&record.id))
}

fn cmd_verify(
    args: VerifyArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let stages = if args.sectioned || config.sectioned {
        let source: Vec<SectionRecord> = document::load(&args.source)?;
        let target: Vec<SectionRecord> = document::load(&args.target)?;
        let staged = sectioned_staged_changeset(&source, &target);
        verify_stages(&source, &target, &staged, apply_sectioned_changeset)?
    } else {
        let source: Vec<Record> = document::load(&args.source)?;
        let target: Vec<Record> = document::load(&args.target)?;
        let staged = staged_changeset_with(&source, &target, &config.diff);
        verify_stages(&source, &target, &staged, apply_changeset)?
    };

    Ok(match format {
        OutputFormat::Json => format!(
            "{}\n",
            serde_json::json!({ "verified": true, "stages": stages })
        ),
        OutputFormat::Text => format!(
            "{} {} stage(s) applied; result matches target\n",
            "✓".green().bold(),
            stages
        ),
    })
}

/// Apply every stage in order, checking each against its own data and the
/// last one against `target`. Returns the number of stages.
fn verify_stages<T: PartialEq + Clone>(
    source: &[T],
    target: &[T],
    staged: &StagedChangeset<T>,
    apply: fn(&[T], &Changeset<T>) -> ApplyResult<Vec<T>>,
) -> anyhow::Result<usize> {
    let mut current = source.to_vec();
    for (index, stage) in staged.iter().enumerate() {
        current = apply(&current, stage)?;
        if current != stage.data {
            bail!("stage {} does not reproduce its data", index + 1);
        }
    }
    if current != target {
        bail!("applying {} stage(s) does not reach the target", staged.len());
    }
    debug!(stages = staged.len(), "every stage reproduced its data");
    Ok(staged.len())
}

fn render<T: serde::Serialize>(
    staged: &StagedChangeset<T>,
    format: OutputFormat,
    summarize: impl Fn(&T) -> String,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(staged)?)),
        OutputFormat::Text => Ok(render_text(staged, summarize)),
    }
}

fn render_text<T>(staged: &StagedChangeset<T>, summarize: impl Fn(&T) -> String) -> String {
    if staged.is_empty() {
        return format!("{}\n", "No changes.".green());
    }

    let mut lines = Vec::new();
    for (index, stage) in staged.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format!("Stage {}", index + 1).bold(),
            format!("({} changes)", stage.change_count()).dimmed()
        ));
        lines.extend(
            [
                edit_line("section deleted", &stage.section_deleted, Color::Red),
                edit_line("section inserted", &stage.section_inserted, Color::Green),
                edit_line("section updated", &stage.section_updated, Color::Yellow),
                edit_line("section moved", &stage.section_moved, Color::Cyan),
                edit_line("element deleted", &stage.element_deleted, Color::Red),
                edit_line("element inserted", &stage.element_inserted, Color::Green),
                edit_line("element updated", &stage.element_updated, Color::Yellow),
                edit_line("element moved", &stage.element_moved, Color::Cyan),
            ]
            .into_iter()
            .flatten(),
        );
        let data: Vec<String> = stage.data.iter().map(&summarize).collect();
        lines.push(format!("  {:<17}[{}]", "data", data.join(", ")));
    }

    lines.join("\n") + "\n"
}

fn render_raw(diff: &LinearDiff, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(diff)?));
    }
    if diff.is_empty() {
        return Ok(format!("{}\n", "No changes.".green()));
    }

    let lines: Vec<String> = [
        edit_line("deleted", &diff.deleted, Color::Red),
        edit_line("inserted", &diff.inserted, Color::Green),
        edit_line("updated", &diff.updated, Color::Yellow),
        edit_line("moved", &diff.moved, Color::Cyan),
    ]
    .into_iter()
    .flatten()
    .collect();
    Ok(lines.join("\n") + "\n")
}

fn edit_line<I: Display>(label: &str, items: &[I], color: Color) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
    Some(format!("  {} {}", format!("{label:<16}").color(color), joined.join(", ")))
}

fn summarize_section(section: &SectionRecord) -> String {
    let elements: Vec<String> = section.elements.iter().map(|record| label(&record.id)).collect();
    format!("{}: [{}]", label(&section.id), elements.join(", "))
}
