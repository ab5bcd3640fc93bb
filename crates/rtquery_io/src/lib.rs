//! This module provides parsing of routing-table dumps: the textual "show route" style output
//! of a routing daemon, one record per announced prefix.
mod default;
mod error;

use std::{fs, path::Path};

use rtquery_core::Record;

pub use crate::{
    default::{DefaultDumpLoader, LoaderConfig},
    error::LoadError,
};

/// DumpLoader turns the text of a routing-table dump into [Record]s.
///
/// ***The trait and the format are producer-specific.***
pub trait DumpLoader {
    // Required method
    fn load(&self, content: &str) -> Result<Vec<Record>, LoadError>;

    // Provided method

    /// Read the whole dump file, then parse it with [DumpLoader::load].
    fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Record>, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&content)
    }
}

/// Basics for io
pub mod basic {
    /// Basic helper functions for parsing
    pub mod parser {
        use nom::branch::alt;
        use nom::bytes::complete::{tag, take_while1};
        use nom::character::complete::{char, digit1, space0, space1};
        use nom::combinator::{eof, opt, rest};
        use nom::error::ParseError;
        use nom::sequence::{pair, preceded, terminated, tuple};
        use nom::IResult;

        fn is_address_char(chr: char) -> bool {
            chr.is_ascii_hexdigit() || chr == ':' || chr == '.'
        }

        /// r"[0-9a-fA-F:\.]+", validated later by the address parser.
        pub fn parse_address<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            take_while1(is_address_char)(input)
        }

        /// r"/[0-9]+"
        pub fn parse_prefix_len<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            preceded(char('/'), digit1)(input)
        }

        /// "<address>[/<len>]"
        pub fn parse_cidr<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, (&'a str, Option<&'a str>), E> {
            pair(parse_address, opt(parse_prefix_len))(input)
        }

        /// r"\s*#.*"
        pub fn parse_comment<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            preceded(pair(space0, tag("#")), rest)(input)
        }

        /// "<address>[/<len>] <attributes>" where the attributes may be empty.
        #[allow(clippy::type_complexity)]
        pub fn parse_record_head<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, ((&'a str, Option<&'a str>), &'a str), E> {
            let (rest_, (cidr, _, attributes)) =
                tuple((parse_cidr, alt((space1, eof)), rest))(input)?;
            Ok((rest_, (cidr, attributes.trim_end())))
        }

        /// A line made of whitespace only.
        pub fn parse_blank<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, &'a str, E> {
            terminated(space0, eof)(input)
        }
    }
}

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{DefaultDumpLoader, DumpLoader, LoadError, LoaderConfig};
}
