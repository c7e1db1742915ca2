/// tabledit command runner
///
/// Reads editing commands one per line from a file (first argument) or from
/// stdin and applies them to a single in-memory table. A failing command is
/// reported on stderr and the script continues.
///
/// Commands:
///   addcol NAME...        delcol NAME...
///   addrow [COUNT]        insrow IDX...      duprow IDX...      delrow IDX...
///   set ROW COL VALUE     get ROW COL        clear ROW COL
///   mvrow FROM TO         mvcol FROM TO
///   undo                  redo
///   print                 csv
///   save PATH             load PATH
///
/// Blank lines and lines starting with `#` are ignored.

use log::{info, warn};
use std::io::{self, BufRead, BufReader};
use tabledit::{Table, TableConfig, TableSnapshot};

fn parse_index(token: &str) -> Result<i64, String> {
    token
        .parse()
        .map_err(|_| format!("'{}' is not an integer index", token))
}

fn parse_indices(tokens: &[&str]) -> Result<Vec<i64>, String> {
    if tokens.is_empty() {
        return Err("expected at least one index".to_string());
    }
    tokens.iter().map(|t| parse_index(t)).collect()
}

fn expect_args<'a>(args: &'a [&'a str], count: usize, usage: &str) -> Result<&'a [&'a str], String> {
    if args.len() < count {
        return Err(format!("usage: {}", usage));
    }
    Ok(args)
}

/// Execute one command. Returns text to print, if any.
fn run_command(table: &mut Table, line: &str) -> Result<Option<String>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = tokens.split_first() else {
        return Ok(None);
    };

    match command {
        "addcol" => {
            let names = expect_args(args, 1, "addcol NAME...")?;
            table.add_cols(names);
        }
        "delcol" => {
            let names = expect_args(args, 1, "delcol NAME...")?;
            table.delete_cols(names).map_err(|e| e.to_string())?;
        }
        "addrow" => {
            let count = match args.first() {
                Some(token) => token
                    .parse()
                    .map_err(|_| format!("'{}' is not a row count", token))?,
                None => 1,
            };
            table.add_rows(count);
        }
        "insrow" => table
            .insert_rows(&parse_indices(args)?)
            .map_err(|e| e.to_string())?,
        "duprow" => table
            .duplicate_rows(&parse_indices(args)?)
            .map_err(|e| e.to_string())?,
        "delrow" => table
            .delete_rows(&parse_indices(args)?)
            .map_err(|e| e.to_string())?,
        "set" => {
            let args = expect_args(args, 2, "set ROW COL VALUE")?;
            let row = parse_index(args[0])?;
            // The value is the rest of the line, so it may contain spaces
            let value = args[2..].join(" ");
            table.set(row, args[1], &value).map_err(|e| e.to_string())?;
        }
        "clear" => {
            let args = expect_args(args, 2, "clear ROW COL")?;
            let row = parse_index(args[0])?;
            table
                .clear_cells(&[(row, args[1])])
                .map_err(|e| e.to_string())?;
        }
        "get" => {
            let args = expect_args(args, 2, "get ROW COL")?;
            let row = parse_index(args[0])?;
            let value = table.get(row, args[1]).map_err(|e| e.to_string())?;
            return Ok(Some(value.to_string()));
        }
        "mvrow" | "mvcol" => {
            let args = expect_args(args, 2, "mvrow|mvcol FROM TO")?;
            let from = parse_index(args[0])?;
            let to = parse_index(args[1])?;
            let result = if command == "mvrow" {
                table.move_row(from, to)
            } else {
                table.move_col(from, to)
            };
            result.map_err(|e| e.to_string())?;
        }
        "undo" => {
            if !table.undo() {
                return Ok(Some("nothing to undo".to_string()));
            }
        }
        "redo" => {
            if !table.redo() {
                return Ok(Some("nothing to redo".to_string()));
            }
        }
        "print" => return Ok(Some(table.to_string())),
        "csv" => return Ok(Some(table.to_csv().trim_end().to_string())),
        "save" => {
            let args = expect_args(args, 1, "save PATH")?;
            let json = table.snapshot().to_json_pretty().map_err(|e| e.to_string())?;
            std::fs::write(args[0], json).map_err(|e| format!("{}: {}", args[0], e))?;
            table.mark_saved();
            info!("saved {} rows to {}", table.row_count(), args[0]);
        }
        "load" => {
            let args = expect_args(args, 1, "load PATH")?;
            let json = std::fs::read_to_string(args[0]).map_err(|e| format!("{}: {}", args[0], e))?;
            let snapshot = TableSnapshot::from_json(&json).map_err(|e| e.to_string())?;
            table.load_snapshot(snapshot).map_err(|e| e.to_string())?;
            info!("loaded {} rows from {}", table.row_count(), args[0]);
        }
        other => return Err(format!("unknown command '{}'", other)),
    }
    Ok(None)
}

fn history_limit_from_env() -> Option<usize> {
    let raw = std::env::var("TABLEDIT_HISTORY_LIMIT").ok()?;
    match raw.parse() {
        Ok(limit) => Some(limit),
        Err(_) => {
            warn!("ignoring TABLEDIT_HISTORY_LIMIT={}: not a number", raw);
            None
        }
    }
}

fn main() -> io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = TableConfig {
        history_limit: history_limit_from_env(),
    };
    let mut table = Table::with_config(config);

    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => {
            info!("running script {}", path);
            Box::new(BufReader::new(std::fs::File::open(path)?))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut failures = 0;
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match run_command(&mut table, line) {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(message) => {
                failures += 1;
                eprintln!("error: line {}: {}", number + 1, message);
            }
        }
    }

    if failures > 0 {
        warn!("{} command(s) failed", failures);
        std::process::exit(1);
    }
    Ok(())
}
