use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use naturaapp::api::{CmdMessage, DisplayCreation, MessageLevel, StatusReport};
use naturaapp::validate::is_inline_image;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const KIND_WIDTH: usize = 8;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_creations(creations: &[DisplayCreation]) {
    if creations.is_empty() {
        println!("No creations found.");
        return;
    }

    let idx_width = creations
        .iter()
        .map(|d| format!("{}. ", d.index).width())
        .max()
        .unwrap_or(0);

    for dp in creations {
        let c = &dp.creation;
        let idx_str = format!("{:<width$}", format!("{}. ", dp.index), width = idx_width);
        let kind_str = format!("{:<width$}", c.kind.as_str(), width = KIND_WIDTH);

        let label = if c.scientific_name.is_empty() {
            c.common_name.clone()
        } else {
            format!("{} ({})", c.common_name, c.scientific_name)
        };

        let fixed = 2 + idx_width + KIND_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let label = truncate_to_width(&label, available);
        let padding = available.saturating_sub(label.width());

        println!(
            "  {}{}{}{}{}",
            idx_str.yellow(),
            kind_str.dimmed(),
            label,
            " ".repeat(padding),
            format_time_ago(c.created_at).dimmed()
        );
    }
}

pub(super) fn print_full_creations(creations: &[DisplayCreation]) {
    for (i, dp) in creations.iter().enumerate() {
        let c = &dp.creation;
        if i > 0 {
            println!("\n================================\n");
        }
        println!(
            "{} {} {}",
            format!("{}.", dp.index).yellow(),
            c.common_name.bold(),
            format!("[{}]", c.kind).dimmed()
        );
        if !c.scientific_name.is_empty() {
            println!("{}", c.scientific_name.italic());
        }
        println!("--------------------------------");
        if !c.description.is_empty() {
            println!("{}\n", c.description);
        }
        println!("{} {}", "id:     ".dimmed(), c.id);
        println!("{} {}", "created:".dimmed(), format_local(c.created_at));
        println!("{} {}", "image:  ".dimmed(), describe_image(&c.image_uri));
    }
}

pub(super) fn print_status(report: &StatusReport) {
    println!("{} {}", "Environment:".bold(), report.environment);
    println!("{} {}", "Backend:    ".bold(), report.backend);
    println!("{} {}", "Data:       ".bold(), report.data_dir.display());
    println!();
    println!("{} {}", "Creations:  ".bold(), report.total);
    for (kind, count) in &report.by_kind {
        println!("  {:<width$}{}", kind.as_str(), count, width = KIND_WIDTH + 2);
    }
    println!();
    let key = if report.credential_set {
        "set".green()
    } else {
        "not set".yellow()
    };
    println!("{} {}", "API key:    ".bold(), key);

    if let Some(migration) = &report.migration {
        let summary = match &migration.error {
            Some(error) => format!("failed ({})", error).red(),
            None if migration.is_noop() => "nothing to migrate".dimmed(),
            None => format!(
                "{} migrated, {} skipped",
                migration.migrated, migration.skipped
            )
            .normal(),
        };
        println!("{} {}", "Migration:  ".bold(), summary);
    }
}

/// Short human description of an image reference; inline payloads are
/// summarized instead of dumped.
fn describe_image(uri: &str) -> String {
    if !is_inline_image(uri) {
        return uri.to_string();
    }
    let media_type = uri
        .trim_start_matches("data:")
        .split([';', ','])
        .next()
        .unwrap_or("image");
    let payload = uri.split_once(',').map(|(_, p)| p.len()).unwrap_or(0);
    // base64 carries 3 bytes per 4 characters
    let bytes = payload * 3 / 4;
    format!("inline {}, {}", media_type, format_size(bytes))
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

fn format_local(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
