//! docfill CLI - patient document generator

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfill::{
    find_markers, parse_file, DocumentKind, Docfill, Generator, PatientForm, PlaceholderMap,
    Procedure, Selection, Session, StaticCredentials, TemplateCatalog,
};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(version)]
#[command(about = "Fill DOCX templates with patient and billing data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the selected documents for a patient
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Fill a single template with explicit values
    Fill {
        /// Template file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Replacement as NAME=VALUE (NAME may omit the braces)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        values: Vec<String>,
    },

    /// Show the text statistics and markers of a template
    Inspect {
        /// Template file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List documents, procedures and template availability
    List {
        /// Template directory
        #[arg(short, long, env = "DOCFILL_TEMPLATES", default_value = TemplateCatalog::DEFAULT_ROOT)]
        templates: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct GenerateArgs {
    /// User name
    #[arg(short, long)]
    user: String,

    /// User password
    #[arg(short, long, env = "DOCFILL_PASSWORD", hide_env_values = true)]
    password: String,

    /// Credentials file (JSON object of user names to passwords)
    #[arg(long, env = "DOCFILL_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,

    /// Template directory
    #[arg(short, long, env = "DOCFILL_TEMPLATES", default_value = TemplateCatalog::DEFAULT_ROOT)]
    templates: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Patient full name
    #[arg(short, long)]
    name: String,

    /// Patient RG
    #[arg(long, default_value = "")]
    rg: String,

    /// Patient CPF
    #[arg(long, default_value = "")]
    cpf: String,

    /// Patient mobile phone
    #[arg(long, default_value = "")]
    phone: String,

    /// Patient address
    #[arg(long, default_value = "")]
    address: String,

    /// Document to generate (label or key, e.g. "budget")
    #[arg(short, long = "document", value_name = "DOC", required = true)]
    documents: Vec<DocumentKind>,

    /// Procedure (name or suffix, e.g. "peeling")
    #[arg(long = "procedure", value_name = "PROC")]
    procedures: Vec<Procedure>,

    /// Full price
    #[arg(long, default_value_t = 0.0, value_parser = parse_amount)]
    full_amount: f64,

    /// Discount
    #[arg(long, default_value_t = 0.0, value_parser = parse_amount)]
    discount: f64,

    /// Payment method
    #[arg(long, default_value = "")]
    payment: String,

    /// Prescribed medication
    #[arg(short, long = "medication", value_name = "TEXT")]
    medications: Vec<String>,

    /// Days of leave on the medical certificate
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    days: Option<i64>,

    /// Diagnosis code for the medical certificate
    #[arg(long, default_value = "")]
    cid: String,

    /// Document date as dd/mm/yyyy (defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").map_err(|e| format!("{} (expected dd/mm/yyyy)", e))
}

fn parse_amount(s: &str) -> Result<f64, String> {
    let amount = s.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !amount.is_finite() {
        return Err(format!("{} is not a finite amount", s));
    }
    Ok(amount)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Generate(args)) => cmd_generate(args),
        Some(Commands::Fill {
            input,
            output,
            values,
        }) => cmd_fill(&input, &output, &values),
        Some(Commands::Inspect { input, json }) => cmd_inspect(&input, json),
        Some(Commands::List { templates }) => {
            cmd_list(&templates);
            Ok(())
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: docfill <COMMAND>".yellow());
            println!("       docfill --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = StaticCredentials::from_file(&args.credentials)?;
    let mut session = Session::new();
    session.login(&credentials, &args.user, &args.password)?;

    let mut selection = Selection::new();
    for kind in args.documents {
        selection = selection.with_document(kind);
    }
    for procedure in args.procedures {
        selection = selection.with_procedure(procedure);
    }

    for medication in &args.medications {
        session.add_medication(medication);
    }

    let leave_days = match args.days {
        Some(days) => days,
        None if selection.needs_leave() => 1,
        None => 0,
    };

    let form = PatientForm {
        name: args.name,
        rg: args.rg,
        cpf: args.cpf,
        phone: args.phone,
        address: args.address,
        full_amount: args.full_amount,
        discount: args.discount,
        payment: args.payment,
        medications: session.medications().to_vec(),
        leave_days,
        cid: args.cid,
    };
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Filling templates...");
    let generator = Generator::new(TemplateCatalog::new(&args.templates));
    let report = generator.generate(&form, &selection, date);
    spinner.finish_and_clear();
    let report = report?;

    fs::create_dir_all(&args.output)?;

    let pb = ProgressBar::new(report.documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    for doc in &report.documents {
        pb.set_message(doc.file_name.clone());
        fs::write(args.output.join(&doc.file_name), &doc.bytes)?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !report.documents.is_empty() {
        println!("{}", "Generated:".green().bold());
        let last = report.documents.len() - 1;
        for (i, doc) in report.documents.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            let note = if doc.stats.has_fallbacks() {
                " (formatting simplified)".yellow().to_string()
            } else {
                String::new()
            };
            println!("  {} {}{}", branch.dimmed(), doc.file_name, note);
        }
    }

    for missing in &report.missing {
        println!(
            "{} {} ({})",
            "Template not found:".yellow().bold(),
            missing.label,
            missing.path.display()
        );
    }

    if report.documents.is_empty() {
        println!("{}", "No documents were generated".yellow());
    }

    session.logout();
    Ok(())
}

fn cmd_fill(input: &Path, output: &Path, values: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut map = PlaceholderMap::new();
    for value in values {
        let (key, value) = PlaceholderMap::parse_assignment(value)?;
        map.insert(key, value);
    }

    let stats = Docfill::new()
        .with_placeholders(map)
        .open(input)?
        .save(output)?;

    println!(
        "{} {} ({} replacements)",
        "Saved to".green(),
        output.display(),
        stats.total_replacements()
    );
    if stats.has_fallbacks() {
        println!(
            "{} {} paragraphs had split markers and lost run formatting",
            "Warning:".yellow().bold(),
            stats.fallback_replacements
        );
    }
    Ok(())
}

fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_file(input)?;
    let text = doc.plain_text();
    let markers = find_markers(&text);

    let paragraphs = doc.paragraphs().count();
    let tables = doc.tables().count();
    let words = text.split_whitespace().count();

    if json {
        let value = serde_json::json!({
            "file": input.display().to_string(),
            "paragraphs": paragraphs,
            "tables": tables,
            "words": words,
            "characters": text.chars().count(),
            "markers": markers,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Template Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Characters".bold(), text.chars().count());

    println!();
    println!("{}", "Markers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    if markers.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for marker in &markers {
        println!("  {}", marker);
    }

    Ok(())
}

fn cmd_list(templates: &Path) {
    let catalog = TemplateCatalog::new(templates);
    let status = |path: &Path| {
        if path.exists() {
            "ok".green()
        } else {
            "missing".red()
        }
    };

    println!("{}", "Documents".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for kind in DocumentKind::ALL {
        match catalog.template_path(kind) {
            Some(path) => println!(
                "  {:<24} {:<40} {}",
                kind.key(),
                kind.label(),
                status(&path)
            ),
            None => println!(
                "  {:<24} {:<40} {}",
                kind.key(),
                kind.label(),
                "per procedure".dimmed()
            ),
        }
    }

    println!();
    println!("{}", "Procedures".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for procedure in Procedure::ALL {
        let mut line = format!("  {:<24} {:<28}", procedure.suffix(), procedure.name());
        for kind in [DocumentKind::ConsentTerms, DocumentKind::Aftercare] {
            if let Some(path) = catalog.procedure_template_path(kind, procedure) {
                line.push_str(&format!(
                    " {}:{}",
                    kind.procedure_prefix().unwrap_or_default(),
                    status(&path)
                ));
            }
        }
        println!("{}", line);
    }
}

fn cmd_version() {
    println!("{} {}", "docfill".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Patient document generator for DOCX templates");
    println!();
    println!("License: MIT");
}
