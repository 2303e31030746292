use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use thiserror::Error;

use crate::cursor::ArgsIterator;
use crate::opt::{Match, OptionSpec};

pub const HELP: &str = "\
serve [PATH] [OPTIONS]

Arguments:
  PATH                Specify the server path (default: '.')

Options:
  -h, --help          Show this help message and exit
  -p, --port PORT     Set the server port (default: 8080)
  -t, --threads NUM   Set the number of threads (default: 2)
  -w, --workers NUM   Set the number of workers (default: 1)
";

const PORT: OptionSpec = OptionSpec::new("p", "port");
const THREADS: OptionSpec = OptionSpec::new("t", "threads");
const WORKERS: OptionSpec = OptionSpec::new("w", "workers");

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("unknown option")]
    UnknownOption,
    #[error("missing value")]
    MissingValue,
    #[error("short options do not accept '=' values")]
    InvalidShortArgument,
    #[error("invalid number: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("empty argument vector")]
    MissingProgramName,
}

impl ArgsError {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgsError::UnknownOption => "UnknownOption",
            ArgsError::MissingValue => "MissingValue",
            ArgsError::InvalidShortArgument => "InvalidShortArgument",
            ArgsError::MissingProgramName => "MissingProgramName",
            ArgsError::InvalidNumber(e) => match e.kind() {
                IntErrorKind::Empty => "Empty",
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => "Overflow",
                _ => "InvalidCharacter",
            },
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Args<'a> {
    pub path: &'a str,
    pub port: u16,
    pub threads: i32,
    pub workers: i32,
    pub help: bool,
}

impl Default for Args<'_> {
    fn default() -> Self {
        Self {
            path: ".",
            port: 8080,
            threads: 2,
            workers: 1,
            help: false,
        }
    }
}

impl<'a> Args<'a> {
    /// Scans the whole argument vector, program name included.
    ///
    /// Stops at the first error, leaving the offending token in
    /// `it.current()`. Stops early, successfully, on `-h`/`--help`.
    pub fn parse<S: AsRef<str>>(it: &mut ArgsIterator<'a, S>) -> Result<Self, ArgsError> {
        if !it.skip_one() {
            return Err(ArgsError::MissingProgramName);
        }

        let mut args = Args::default();

        while let Some(token) = it.next() {
            if !token.starts_with('-') {
                args.path = token;
                continue;
            }

            if token == "-h" || token == "--help" {
                args.help = true;
                return Ok(args);
            }

            if let Some(port) = option_value(&PORT, token, it)? {
                args.port = port;
            } else if let Some(threads) = option_value(&THREADS, token, it)? {
                args.threads = threads;
            } else if let Some(workers) = option_value(&WORKERS, token, it)? {
                args.workers = workers;
            } else {
                return Err(ArgsError::UnknownOption);
            }
        }

        Ok(args)
    }
}

/// Parses the value of `opt` if `token` names it, pulling the next token
/// from `it` when the value is not attached.
fn option_value<'a, T, S>(
    opt: &OptionSpec,
    token: &'a str,
    it: &mut ArgsIterator<'a, S>,
) -> Result<Option<T>, ArgsError>
where
    T: FromStr<Err = ParseIntError>,
    S: AsRef<str>,
{
    let raw = match opt.matches(token) {
        Match::None => return Ok(None),
        Match::Short => {
            if token.contains('=') {
                return Err(ArgsError::InvalidShortArgument);
            }
            match opt.short_tail(token) {
                "" => it.take_next()?,
                tail => tail,
            }
        }
        Match::Long => match token.split_once('=') {
            Some((_, value)) => value,
            None => it.take_next()?,
        },
    };

    Ok(Some(raw.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<'a>(argv: &'a [&'a str]) -> Result<Args<'a>, ArgsError> {
        Args::parse(&mut ArgsIterator::new(argv))
    }

    #[test]
    fn defaults() {
        let args = parse(&["prog"]).unwrap();

        assert_eq!(
            args,
            Args {
                path: ".",
                port: 8080,
                threads: 2,
                workers: 1,
                help: false,
            }
        );
    }

    #[test]
    fn mixed_forms_with_help_last() {
        let args = parse(&[
            "prog",
            "/custom/path",
            "--threads",
            "10",
            "--workers=20",
            "-p8000",
            "--help",
        ])
        .unwrap();

        assert_eq!(
            args,
            Args {
                path: "/custom/path",
                port: 8000,
                threads: 10,
                workers: 20,
                help: true,
            }
        );
    }

    #[test]
    fn options_before_path() {
        let args = parse(&[
            "prog",
            "--workers=15",
            "/another/path",
            "-t",
            "8",
            "-p",
            "9000",
        ])
        .unwrap();

        assert_eq!(
            args,
            Args {
                path: "/another/path",
                port: 9000,
                threads: 8,
                workers: 15,
                help: false,
            }
        );
    }

    #[test]
    fn last_path_wins() {
        let args = parse(&["prog", "a", "-w", "3", "b", "c"]).unwrap();
        assert_eq!(args.path, "c");
        assert_eq!(args.workers, 3);
    }

    #[test]
    fn help_stops_scanning() {
        let args = parse(&["prog", "-t", "4", "-h", "--bogus", "-p", "nope"]).unwrap();

        assert!(args.help);
        assert_eq!(args.threads, 4);
        assert_eq!(args.port, 8080);
    }

    #[test]
    fn help_must_be_exact() {
        assert!(matches!(parse(&["prog", "--help=1"]), Err(ArgsError::UnknownOption)));
        assert!(matches!(parse(&["prog", "-hx"]), Err(ArgsError::UnknownOption)));
    }

    #[test]
    fn missing_value() {
        assert!(matches!(parse(&["prog", "--threads"]), Err(ArgsError::MissingValue)));
        assert!(matches!(parse(&["prog", "-p"]), Err(ArgsError::MissingValue)));
    }

    #[test]
    fn unknown_option() {
        let argv = ["prog", "/srv", "--unknown-option", "-p", "1"];
        let mut it = ArgsIterator::new(&argv);

        assert!(matches!(Args::parse(&mut it), Err(ArgsError::UnknownOption)));
        assert_eq!(it.current(), "--unknown-option");
    }

    #[test]
    fn invalid_number() {
        let argv = ["prog", "--threads", "not_a_number"];
        let mut it = ArgsIterator::new(&argv);
        let err = Args::parse(&mut it).unwrap_err();

        match &err {
            ArgsError::InvalidNumber(e) => assert_eq!(e.kind(), &IntErrorKind::InvalidDigit),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind_name(), "InvalidCharacter");
        assert_eq!(it.current(), "not_a_number");
    }

    #[test]
    fn port_out_of_range() {
        let err = parse(&["prog", "--port=70000"]).unwrap_err();
        assert_eq!(err.kind_name(), "Overflow");

        let err = parse(&["prog", "-p", "-1"]).unwrap_err();
        assert!(matches!(err, ArgsError::InvalidNumber(_)));
    }

    #[test]
    fn negative_threads_parse() {
        let args = parse(&["prog", "--threads=-3"]).unwrap();
        assert_eq!(args.threads, -3);
    }

    #[test]
    fn short_option_rejects_equals() {
        assert!(matches!(parse(&["prog", "-p=8000"]), Err(ArgsError::InvalidShortArgument)));
    }

    #[test]
    fn empty_attached_long_value() {
        let err = parse(&["prog", "--port="]).unwrap_err();
        assert_eq!(err.kind_name(), "Empty");
    }

    #[test]
    fn long_prefix_is_accepted() {
        // `--portextra` is taken as `--port`, its value read from the next token.
        let args = parse(&["prog", "--portextra", "9001"]).unwrap();
        assert_eq!(args.port, 9001);

        let args = parse(&["prog", "--workersxyz=7"]).unwrap();
        assert_eq!(args.workers, 7);
    }

    #[test]
    fn option_order_does_not_matter() {
        let a = parse(&["prog", "-t2", "--port", "81", "-w", "5", "/x"]).unwrap();
        let b = parse(&["prog", "/x", "-w", "5", "-t2", "--port", "81"]).unwrap();
        let c = parse(&["prog", "--port=81", "/x", "--workers", "5", "--threads=2"]).unwrap();

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn reparse_is_stable() {
        let argv = ["prog", "/srv", "-p", "3000", "--threads=4"];
        assert_eq!(parse(&argv).unwrap(), parse(&argv).unwrap());
    }

    #[test]
    fn empty_argv() {
        let argv: [&str; 0] = [];
        assert!(matches!(parse(&argv), Err(ArgsError::MissingProgramName)));
    }

    #[test]
    fn owned_strings() {
        let argv: Vec<String> = ["prog", "site", "-w2"].iter().map(|s| s.to_string()).collect();
        let args = Args::parse(&mut ArgsIterator::new(&argv[..])).unwrap();

        assert_eq!(args.path, "site");
        assert_eq!(args.workers, 2);
    }
}
