use crate::config::{COUNTRIES, EMPLOYEES, OTHER_LABEL, TOPICS};
use crate::core::Matrix;
use crate::dashboard::Dashboard;
use crate::error::{TallyError, TallyResult};
use crate::excel;
use crate::types::{CountRow, DetailRecord};
use crate::wizard::{validate_submission, FormInput, Wizard, WizardEvent, WizardOutcome};
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Label of the totals row and column in the rendered matrix
const TOTAL_LABEL: &str = "Summe";

/// Sheet name used when exporting the matrix
const MATRIX_SHEET: &str = "Matrix";

/// Fields collected by `tally record`
#[derive(Debug, Clone, Default)]
pub struct RecordArgs {
    pub country: String,
    pub topic: String,
    pub employee: String,
    pub company: String,
    pub contact: String,
    pub ident: String,
    pub remark: String,
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

fn pad_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", " ".repeat(width - len), text)
    }
}

/// Render the matrix as aligned plain-text lines: header, one line per topic, totals line
fn format_matrix(matrix: &Matrix) -> Vec<String> {
    let topic_width = matrix
        .topics
        .iter()
        .map(|t| t.chars().count())
        .chain(std::iter::once(TOTAL_LABEL.len()))
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = matrix
        .countries
        .iter()
        .map(|c| c.chars().count().max(3))
        .collect();
    let total_width = TOTAL_LABEL.len();

    let mut lines = Vec::with_capacity(matrix.topics.len() + 2);

    let mut header = pad("", topic_width);
    for (country, width) in matrix.countries.iter().zip(&widths) {
        header.push_str("  ");
        header.push_str(&pad_left(country, *width));
    }
    header.push_str("  ");
    header.push_str(TOTAL_LABEL);
    lines.push(header);

    for (topic, counts) in matrix.topics.iter().zip(&matrix.counts) {
        let mut line = pad(topic, topic_width);
        for (count, width) in counts.iter().zip(&widths) {
            line.push_str("  ");
            line.push_str(&pad_left(&count.to_string(), *width));
        }
        let row_total: u64 = counts.iter().sum();
        line.push_str("  ");
        line.push_str(&pad_left(&row_total.to_string(), total_width));
        lines.push(line);
    }

    let mut footer = pad(TOTAL_LABEL, topic_width);
    for (country, width) in matrix.countries.iter().zip(&widths) {
        let total = matrix.column_total(country).unwrap_or(0);
        footer.push_str("  ");
        footer.push_str(&pad_left(&total.to_string(), *width));
    }
    footer.push_str("  ");
    footer.push_str(&pad_left(&matrix.grand_total().to_string(), total_width));
    lines.push(footer);

    lines
}

fn format_counts(rows: &[CountRow]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|r| r.country.chars().count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|r| format!("{}  {}", pad(&r.country, width), r.count))
        .collect()
}

fn format_record(record: &DetailRecord) -> String {
    let timestamp = record
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{}  {}  {}  {}",
        timestamp, record.topic, record.employee, record.company_name
    );
    for extra in [&record.contact_name, &record.ident_number, &record.remark] {
        if !extra.is_empty() {
            line.push_str("  | ");
            line.push_str(extra);
        }
    }
    line
}

fn print_matrix(matrix: &Matrix) {
    let lines = format_matrix(matrix);
    let last = lines.len().saturating_sub(1);
    for (idx, line) in lines.iter().enumerate() {
        if idx == 0 || idx == last {
            println!("   {}", line.bold());
        } else {
            println!("   {}", line);
        }
    }
}

/// Print a friendly hint for the error kinds a user can act on
fn report_error(err: &TallyError) {
    match err {
        TallyError::LockedFile { .. } => {
            eprintln!(
                "{} {}",
                "🔒 Excel is open or locked.".bold().red(),
                "Please close the file and try again.".yellow()
            );
        }
        TallyError::Validation(msg) => {
            eprintln!("{} {}", "⚠️ ".yellow(), msg.yellow());
        }
        TallyError::InvalidSheetName { name, reason } => {
            eprintln!(
                "{} '{}' cannot be used as a country: {}",
                "⚠️ ".yellow(),
                name,
                reason.yellow()
            );
        }
        _ => {}
    }
}

/// Execute the init command
pub fn init(workbook: PathBuf) -> TallyResult<()> {
    println!("{}", "📒 Tally - Workbook Setup".bold().green());
    println!("   Workbook: {}\n", workbook.display());

    let dashboard = Dashboard::new(&workbook);
    let existed = workbook.exists();
    dashboard.ensure_workbook().inspect_err(report_error)?;

    if existed {
        println!("{}", "✅ Workbook already exists".bold().green());
    } else {
        println!("{}", "✅ Workbook created".bold().green());
    }
    Ok(())
}

/// Execute the overview command - topic × country matrix
pub fn overview(workbook: PathBuf, output: Option<PathBuf>) -> TallyResult<()> {
    println!(
        "{}",
        "🌍 Tally - Overview (entries: topic × country)".bold().green()
    );
    println!("   Workbook: {}\n", workbook.display());

    let dashboard = Dashboard::new(&workbook);
    let matrix = dashboard.build_matrix();
    print_matrix(&matrix);
    println!();

    if let Some(output) = output {
        excel::export_tables(&output, &[(MATRIX_SHEET.to_string(), matrix.to_table())])
            .inspect_err(report_error)?;
        println!("{}", "✅ Matrix exported".bold().green());
        println!("   Excel file: {}\n", output.display());
    }
    Ok(())
}

/// Execute the counts command - per-country ledger totals
pub fn counts(workbook: PathBuf, json: bool) -> TallyResult<()> {
    let dashboard = Dashboard::new(&workbook);
    let rows = dashboard.read_counts();

    if json {
        let out = serde_json::to_string_pretty(&rows).map_err(|e| TallyError::Io(e.into()))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{}", "📊 Tally - Country Totals".bold().green());
    println!("   Workbook: {}\n", workbook.display());
    if rows.is_empty() {
        println!("{}", "   No countries counted yet".yellow());
    }
    for line in format_counts(&rows) {
        println!("   {}", line);
    }
    let total: u64 = rows.iter().map(|r| r.count).sum();
    println!("\n   {} {}", TOTAL_LABEL.bold(), total.to_string().bold());
    Ok(())
}

/// Execute the sheets command - list detail sheets
pub fn sheets(workbook: PathBuf) -> TallyResult<()> {
    println!("{}", "📑 Tally - Detail Sheets".bold().green());
    println!("   Workbook: {}\n", workbook.display());

    let dashboard = Dashboard::new(&workbook);
    let names = dashboard.list_detail_sheets();
    if names.is_empty() {
        println!("{}", "   No detail data yet".yellow());
    }
    for name in names {
        let marker = if COUNTRIES.contains(&name.as_str()) {
            name.bright_blue()
        } else {
            format!("{} ({})", name, OTHER_LABEL).normal()
        };
        println!("   {}", marker);
    }
    Ok(())
}

/// Execute the entries command - detail records for one country
pub fn entries(workbook: PathBuf, country: String) -> TallyResult<()> {
    println!("{}", "📋 Tally - Entries".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!("   Country:  {}\n", country.bright_blue().bold());

    let dashboard = Dashboard::new(&workbook);
    let records = dashboard.detail_records(&country);
    if records.is_empty() {
        println!("{}", "   No entries".yellow());
    }
    for record in &records {
        println!("   {}", format_record(record));
    }
    Ok(())
}

/// Execute the record command - run the full wizard for one consultation
pub fn record(workbook: PathBuf, args: RecordArgs) -> TallyResult<()> {
    println!("{}", "📝 Tally - New Entry".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!(
        "   Country: {} · Topic: {}\n",
        args.country.bright_blue().bold(),
        args.topic.bright_blue().bold()
    );

    let form = FormInput {
        company_name: args.company,
        contact_name: args.contact,
        ident_number: args.ident,
        remark: args.remark,
    };
    // Check the form before the ledger is touched so a rejected entry is not counted
    validate_submission(Some(args.employee.as_str()), &form).inspect_err(report_error)?;

    let dashboard = Dashboard::new(&workbook);
    let mut wizard = Wizard::new();
    let events = [
        WizardEvent::Start,
        WizardEvent::ChooseCountry(args.country),
        WizardEvent::ChooseTopic(args.topic),
        WizardEvent::Confirm,
        WizardEvent::ChooseEmployee(args.employee),
        WizardEvent::Submit(form),
    ];

    for event in events {
        match wizard.handle(&dashboard, event).inspect_err(report_error)? {
            WizardOutcome::CountryCounted { country, total } => {
                println!("   {} {} = {}", "🔢 Counter updated:".cyan(), country, total);
            }
            WizardOutcome::Saved(record) => {
                println!("{}", "✅ Entry saved".bold().green());
                println!("   {}", format_record(&record));
            }
            WizardOutcome::Moved | WizardOutcome::Discarded => {}
        }
    }
    Ok(())
}

/// Execute the options command - show the recognized lists
pub fn options() -> TallyResult<()> {
    println!("{}", "🧭 Tally - Options".bold().green());
    println!("\n   {}", "Countries:".bold());
    for country in COUNTRIES {
        println!("      {}", country);
    }
    println!("\n   {}", "Topics:".bold());
    for topic in TOPICS {
        println!("      {}", topic);
    }
    println!("\n   {}", "Employees:".bold());
    for employee in EMPLOYEES {
        println!("      {}", employee);
    }
    println!(
        "\n   Anything else is counted under {}",
        OTHER_LABEL.bright_yellow()
    );
    Ok(())
}

/// Execute the watch command - re-render the overview whenever the workbook changes
pub fn watch(workbook: PathBuf) -> TallyResult<()> {
    println!("{}", "👁️  Tally - Watch Mode".bold().green());
    println!("   Watching: {}", workbook.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    let dashboard = Dashboard::new(&workbook);
    dashboard.ensure_workbook().inspect_err(report_error)?;

    let canonical_path = workbook.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| {
            TallyError::Io(std::io::Error::other("Cannot determine parent directory"))
        })?
        .to_path_buf();

    let (tx, rx) = channel();

    // Excel saves in several steps; debounce so one save renders once
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| watch_error("Failed to create file watcher", e))?;

    debouncer
        .watcher()
        .watch(&parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| watch_error("Failed to watch directory", e))?;

    print_matrix(&dashboard.build_matrix());
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any
                        && is_same_file(&event.path, &canonical_path)
                });
                if relevant {
                    println!(
                        "\n{} {}",
                        "🔄 Change detected at".cyan(),
                        chrono::Local::now().format("%H:%M:%S").to_string().cyan()
                    );
                    print_matrix(&dashboard.build_matrix());
                    println!();
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn watch_error(context: &str, err: notify::Error) -> TallyError {
    TallyError::Io(std::io::Error::other(format!("{}: {}", context, err)))
}

fn is_same_file(changed: &Path, workbook: &Path) -> bool {
    if let Ok(canonical) = changed.canonicalize() {
        if canonical == workbook {
            return true;
        }
    }
    changed.file_name().is_some() && changed.file_name() == workbook.file_name()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
