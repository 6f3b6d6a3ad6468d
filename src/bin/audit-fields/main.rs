//! audit-fields reads Linux Audit log lines and writes the fields
//! extracted from each line as JSON lines.

use getopts::Options;
use std::env;
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::os::unix::fs::PermissionsExt;

use audit_fields::assemble::Assembler;
use audit_fields::config::{Config, Input, Output};
use audit_fields::logger;
use audit_fields::record::AuditRecord;
use audit_fields::userdb::UserDB;

#[derive(Default)]
struct Stats {
    lines: u64,
    records: u64,
    headerless: u64,
}

struct RecordWriter {
    prefix: Option<String>,
    output: BufWriter<Box<dyn Write>>,
}

impl RecordWriter {
    fn log(&mut self, record: &AuditRecord) -> Result<(), Box<dyn Error>> {
        if let Some(prefix) = &self.prefix {
            self.output.write_all(prefix.as_bytes())?;
        }
        serde_json::to_writer(&mut self.output, record)?;
        self.output.write_all(b"\n")?;
        self.output.flush()?;
        Ok(())
    }

    fn new(def: &Output) -> Result<Self, Box<dyn Error>> {
        let output: Box<dyn Write> = match &def.file {
            p if p.as_os_str() == "-" => Box::new(io::stdout()),
            p => Box::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(p)
                    .map_err(|e| format!("open {}: {}", p.to_string_lossy(), e))?,
            ),
        };
        Ok(RecordWriter {
            prefix: def.line_prefix.clone(),
            output: BufWriter::new(output),
        })
    }
}

fn run_app() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    let mut opts = Options::new();
    opts.optopt("c", "config", "Configuration file", "FILE");
    opts.optopt("i", "input", "Read audit log from file instead of stdin", "FILE");
    opts.optflag("d", "dry-run", "Only parse configuration and exit");
    opts.optflag("h", "help", "Print short help text and exit");
    opts.optflag("v", "version", "Print version and exit");

    let progname = args.first().map_or("audit-fields", String::as_str);

    let matches = opts.parse(args.iter().skip(1))?;
    if matches.opt_present("h") {
        println!("{}", opts.usage(progname));
        return Ok(());
    }

    if matches.opt_present("v") {
        println!("{}", audit_fields::VERSION);
        return Ok(());
    }

    let mut config: Config = match matches.opt_str("c") {
        Some(f_name) => {
            if fs::metadata(&f_name)
                .map_err(|e| format!("stat {}: {}", &f_name, &e))?
                .permissions()
                .mode()
                & 0o002
                != 0
            {
                return Err(format!("Config file {} must not be world-writable", f_name).into());
            }
            let lines = fs::read(&f_name).map_err(|e| format!("read {}: {}", &f_name, &e))?;
            toml::from_str(
                &String::from_utf8(lines)
                    .map_err(|_| format!("parse: {}: contains invalid UTF-8 sequences", &f_name))?,
            )
            .map_err(|e| format!("parse {}: {}", f_name, e))?
        }
        None => Config::default(),
    };

    if let Some(f_name) = matches.opt_str("i") {
        config.input = Input::File(f_name.into());
    }

    let table = config
        .make_field_table()
        .map_err(|e| format!("field table: {}", e))?;

    if matches.opt_present("d") {
        println!("audit-fields {}: Config ok.", audit_fields::VERSION);
        return Ok(());
    }

    let raw_input: Box<dyn Read> = match &config.input {
        Input::Stdin => Box::new(io::stdin()),
        Input::File(path) => Box::new(
            fs::File::open(path).map_err(|e| format!("open {}: {}", path.to_string_lossy(), e))?,
        ),
    };
    let mut input = BufReader::with_capacity(1 << 20, raw_input);

    let mut output =
        RecordWriter::new(&config.output).map_err(|e| format!("can't create output: {}", e))?;

    let users = if config.resolve_users {
        Some(UserDB)
    } else {
        None
    };
    let assembler = Assembler::new(table, users);

    let logger = logger::Logger::new(config.log_level, config.syslog);
    if config.syslog && !logger.has_syslog() {
        eprintln!("{}: syslog not available, logging to stderr only", progname);
    }
    logger
        .install()
        .map_err(|e| format!("can't set up logging: {}", e))?;

    log::info!("Started {} running version {}", progname, audit_fields::VERSION);
    log::info!("Using config {}", &config);

    let mut line: Vec<u8> = Vec::new();
    let mut stats = Stats::default();

    loop {
        line.clear();
        if input
            .read_until(b'\n', &mut line)
            .map_err(|e| format!("read from {}: {}", &config.input, e))?
            == 0
        {
            break;
        }
        stats.lines += 1;

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\n', '\r']);
        let record = assembler.assemble(text);

        if !record.has_header() {
            stats.headerless += 1;
            if config.skip_headerless {
                continue;
            }
        }
        output
            .log(&record)
            .map_err(|e| format!("write output: {}", e))?;
        stats.records += 1;
    }

    log::info!(
        "Stopped {} processed {} lines {} records, {} without audit header",
        progname,
        &stats.lines,
        &stats.records,
        &stats.headerless,
    );

    Ok(())
}

/// Before the logger has been installed, errors go straight to stderr.
fn report(message: &str) {
    if log::max_level() == log::LevelFilter::Off {
        eprintln!("audit-fields: {}", message);
    } else {
        log::error!("{}", message);
        log::logger().flush();
    }
}

pub fn main() {
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "(unknown error)"
        };
        let location = match panic_info.location() {
            Some(l) => format!("{}:{},{}", l.file(), l.line(), l.column()),
            None => "(unknown)".to_string(),
        };
        report(&format!("fatal error '{}' at {}", &message, &location));
        std::process::abort();
    }));

    match run_app() {
        Ok(_) => (),
        Err(e) => {
            report(&e.to_string());
            std::process::abort();
        }
    };
}
