use std::{
    io::{self, BufRead},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use log::error;
use rtquery_table::{LoaderConfig, QueryEngine, QueryError};

#[derive(Parser)]
#[command(version, about = "Query a routing table dump", long_about = None)]
struct Cli {
    /// Routing table dump to load, e.g. query.dump
    dump: PathBuf,

    /// Addresses or prefixes to look up, read from stdin when none is given
    queries: Vec<String>,

    /// Exact-prefix lookup instead of listing all covering prefixes
    #[arg(short, long, default_value_t = false)]
    exact: bool,

    /// Drop malformed dump records instead of refusing to load
    #[arg(long, default_value_t = false)]
    skip_malformed: bool,

    /// Print the number of loaded prefixes per address family
    #[arg(long, default_value_t = false)]
    stats: bool,

    /// Run the demo queries against the dump
    #[arg(long, default_value_t = false)]
    demo: bool,
}

fn answer(engine: &QueryEngine, query: &str, exact: bool) -> Result<String, QueryError> {
    if exact {
        Ok(engine.find(query)?.unwrap_or_default())
    } else {
        engine.find_all(query)
    }
}

/// The text printed for one query. Every error is a query the engine could
/// not parse, the engine itself is known to be ready.
fn render(engine: &QueryEngine, query: &str, exact: bool) -> String {
    answer(engine, query, exact).unwrap_or_else(|e| {
        error!("{}: {}", query, e);
        String::from("Parse error.")
    })
}

fn print_answer(engine: &QueryEngine, query: &str, exact: bool) {
    println!("{}", render(engine, query, exact));
}

fn run_demo(engine: &QueryEngine) {
    let steps = [
        ("Find", "192.168.42.42/32", true),
        ("FindAll", "192.168.42.42", false),
        ("FindAll", "192.168.42.42/32", false),
        ("Find", "192.168.42.42", true),
    ];
    for (name, query, exact) in steps {
        println!("{} {}:", name, query);
        print_answer(engine, query, exact);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = LoaderConfig::default().skip_malformed(cli.skip_malformed);
    let mut engine = QueryEngine::init_with(&cli.dump, &config);
    if let Some(e) = engine.load_error() {
        eprintln!("{}", e);
        return ExitCode::from(2);
    }

    if cli.stats {
        if let Ok(table) = engine.table() {
            println!("IPv4 prefixes: {}", table.len_v4());
            println!("IPv6 prefixes: {}", table.len_v6());
        }
    }

    if cli.demo {
        run_demo(&engine);
    } else if cli.queries.is_empty() {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => print_answer(&engine, line.trim(), cli.exact),
                Err(e) => {
                    error!("reading stdin: {}", e);
                    break;
                }
            }
        }
    } else {
        for query in cli.queries.iter() {
            print_answer(&engine, query, cli.exact);
        }
    }

    engine.dispose();
    ExitCode::SUCCESS
}
