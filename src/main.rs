use clap::{Parser, Subcommand};
use consult_tally::cli::{self, RecordArgs};
use consult_tally::config::{DEFAULT_WORKBOOK, WORKBOOK_ENV};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Consultation tally: record advisory events and show the topic × country matrix.")]
#[command(long_about = "Tally - International consultation dashboard
Records each advisory consultation into an Excel workbook and
summarizes all entries as a topic × country matrix.

WORKBOOK LAYOUT:
  Zaehlungen      - Land | Anzahl (one row per country)
  <country>       - Zeitstempel | Mitarbeiter | Thema | Unternehmensname |
                    Ansprechpartner | Identnummer | Bemerkung

COMMANDS:
  init      - Create the workbook if it does not exist
  overview  - Show the topic × country matrix
  counts    - Show per-country totals
  sheets    - List detail sheets
  entries   - Show the entries recorded for one country
  record    - Record a new consultation
  options   - Show recognized countries, topics and employees
  watch     - Re-render the overview whenever the workbook changes

EXAMPLES:
  tally record --country USA --topic Marktberatung --employee Li --company \"ACME Inc.\"
  tally overview --output matrix.xlsx
  TALLY_WORKBOOK=J:/Statistik/Dashboard.xlsx tally counts

If Excel has the workbook open, writes fail with a lock error.
Close the file and run the command again.")]
#[command(version)]
struct Cli {
    /// Path to the dashboard workbook (.xlsx)
    #[arg(short, long, global = true, env = WORKBOOK_ENV, default_value = DEFAULT_WORKBOOK)]
    workbook: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the workbook with an empty counter sheet
    Init,

    #[command(long_about = "Show the topic × country matrix.

Counts every entry of every detail sheet. Countries and topics outside the
recognized lists are counted under 'Sonstiges'. The matrix is rebuilt from
the workbook on every run.

EXAMPLE:
  tally overview
  tally overview --output matrix.xlsx")]
    /// Show the topic × country matrix
    Overview {
        /// Also write the matrix to this Excel file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show per-country totals from the counter sheet
    Counts {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List detail sheets
    Sheets,

    /// Show the entries recorded for one country
    Entries {
        /// Country (sheet name)
        country: String,
    },

    #[command(long_about = "Record a new consultation.

Runs the entry wizard in one step: the country counter is increased, then the
entry is appended to the country's sheet. The company name and the employee
are required; nothing is written if either is missing.

EXAMPLE:
  tally record --country Schweiz --topic Mitarbeiterentsendung \\
    --employee Wind --company \"Muster AG\" --contact \"Frau Muster\" --ident 4711")]
    /// Record a new consultation
    Record {
        /// Country (a recognized country or free text)
        #[arg(short, long)]
        country: String,

        /// Topic (a recognized topic or free text)
        #[arg(short, long)]
        topic: String,

        /// Employee handling the consultation
        #[arg(short, long)]
        employee: String,

        /// Company name (required)
        #[arg(long)]
        company: String,

        /// Contact person
        #[arg(long, default_value = "")]
        contact: String,

        /// Ident number
        #[arg(long, default_value = "")]
        ident: String,

        /// Remark
        #[arg(long, default_value = "")]
        remark: String,
    },

    /// Show recognized countries, topics and employees
    Options,

    /// Re-render the overview whenever the workbook changes
    Watch,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "consult_tally=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let workbook = cli.workbook;
    match cli.command {
        Commands::Init => cli::init(workbook)?,

        Commands::Overview { output } => cli::overview(workbook, output)?,

        Commands::Counts { json } => cli::counts(workbook, json)?,

        Commands::Sheets => cli::sheets(workbook)?,

        Commands::Entries { country } => cli::entries(workbook, country)?,

        Commands::Record {
            country,
            topic,
            employee,
            company,
            contact,
            ident,
            remark,
        } => cli::record(
            workbook,
            RecordArgs {
                country,
                topic,
                employee,
                company,
                contact,
                ident,
                remark,
            },
        )?,

        Commands::Options => cli::options()?,

        Commands::Watch => cli::watch(workbook)?,
    }
    Ok(())
}
