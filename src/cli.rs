use exprcheck::{LexerConfig, ParserConfig, DEFAULT_BOUNDARY_SYMBOL};

#[derive(clap::Parser, Debug)]
#[clap(about, long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct LexOptions {
    /// Accept CJK characters in identifiers
    #[arg(long)]
    pub allow_chinese: bool,

    /// Accept empty string literals and blank expressions
    #[arg(long)]
    pub allow_empty_string: bool,

    /// Character that delimits embedded variables
    #[arg(long, default_value_t = DEFAULT_BOUNDARY_SYMBOL)]
    pub boundary: char,

    /// Pattern the inside of a delimited variable must match
    #[arg(long)]
    pub ident_pattern: Option<String>,
}

impl LexOptions {
    pub fn lexer_config(&self) -> Result<LexerConfig, regex::Error> {
        let config = LexerConfig {
            allow_chinese_as_ident: self.allow_chinese,
            allow_empty_string: self.allow_empty_string,
            ident_boundary_symbol: self.boundary,
            ..LexerConfig::default()
        };
        match &self.ident_pattern {
            Some(pattern) => config.with_ident_pattern(pattern),
            None => Ok(config),
        }
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            ident_boundary_symbol: self.boundary,
            ..ParserConfig::default()
        }
    }
}

#[derive(clap::Args, Debug)]
pub(crate) struct CatalogOptions {
    /// JSON file with preset keywords and functions
    #[arg(short, long)]
    pub catalog: Option<std::path::PathBuf>,

    /// Treat every identifier as numeric
    #[arg(long)]
    pub no_check_ident: bool,

    /// Add the device keywords IOT_DATA and IOT_DATA_TIME
    #[arg(long)]
    pub device_presets: bool,
}

#[derive(clap::Subcommand, Debug)]
pub(crate) enum Command {
    /// Print the tokens of an expression
    Lex {
        expr: String,

        #[command(flatten)]
        lex: LexOptions,
    },

    /// Print the syntax tree of an expression
    Parse {
        expr: String,

        #[command(flatten)]
        lex: LexOptions,
    },

    /// Lex, parse and validate an expression
    Check {
        expr: String,

        #[command(flatten)]
        lex: LexOptions,

        #[command(flatten)]
        catalog: CatalogOptions,
    },
}
