mod cli;

use std::{error::Error, process, time::Instant};

use clap::Parser;
use exprcheck::{device_keywords, Catalog, ParseOutput, ValidatorConfig};

use cli::{CatalogOptions, Cli, Command};

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let now = Instant::now();
    let failed = match run(&cli.command) {
        Ok(failed) => failed,
        Err(why) => {
            eprintln!("{why}");
            process::exit(2);
        }
    };
    log::info!("finished in {:.2?}", now.elapsed());

    if failed {
        process::exit(1);
    }
}

/// Prints the requested stage output as JSON and reports whether it carries an error.
fn run(command: &Command) -> Result<bool, Box<dyn Error>> {
    match command {
        Command::Lex { expr, lex } => {
            let out = exprcheck::lex_expression(expr, &lex.lexer_config()?);
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(out.error.is_some())
        }
        Command::Parse { expr, lex } => {
            let lexed = exprcheck::lex_expression(expr, &lex.lexer_config()?);
            let parsed = exprcheck::parse_tokens(&lexed.tokens, &lex.parser_config());
            let out = ParseOutput {
                ast: parsed.ast,
                error: lexed.error.or(parsed.error),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(out.error.is_some())
        }
        Command::Check { expr, lex, catalog } => {
            let validator = validator_config(catalog)?;
            let report = exprcheck::check(
                expr,
                &lex.lexer_config()?,
                &lex.parser_config(),
                &validator,
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(!report.is_valid)
        }
    }
}

fn validator_config(opts: &CatalogOptions) -> Result<ValidatorConfig, Box<dyn Error>> {
    let catalog = match &opts.catalog {
        Some(path) => {
            if !path.exists() {
                return Err(format!("File {path:?} does not exist").into());
            }
            Catalog::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Catalog::default(),
    };

    let mut keywords = if opts.device_presets {
        device_keywords()
    } else {
        vec![]
    };
    keywords.extend(catalog.keywords);

    Ok(ValidatorConfig {
        not_check_ident: opts.no_check_ident,
        preset_keywords: keywords,
        preset_functions: catalog.functions,
        ..ValidatorConfig::default()
    })
}
